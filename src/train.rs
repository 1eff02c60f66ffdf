use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::path::Path;

use log::*;

use crate::config::TrainConfig;
use crate::enti::{FIN_EVENT, STOCK};
use crate::tokens::Tokenizer;
use crate::tuned::{Example, TunedLexicon};
use crate::Result;

/// `(text, {"entities": [(start, end, label)]})` with end exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainExample(pub String, pub Annotations);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub entities: Vec<(usize, usize, String)>,
}

fn example(text: &str, entities: &[(usize, usize, &str)]) -> TrainExample {
    TrainExample(
        text.to_string(),
        Annotations {
            entities: entities
                .iter()
                .map(|(s, e, l)| (*s, *e, l.to_string()))
                .collect(),
        },
    )
}

pub fn builtin_data() -> Vec<TrainExample> {
    vec![
        example(
            "US stock market valuations at historic highs seen before great depression, dot-com crash.",
            &[(0, 2, "GPE"), (57, 73, FIN_EVENT), (75, 88, FIN_EVENT)],
        ),
        example(
            "The US stock market valuation has hit historic highs, with metrics like market-cap-to-GDP exceeding the Great Depression of 1929 and the dot-com crash in 2000.",
            &[(4, 6, "GPE"), (104, 128, FIN_EVENT), (137, 158, FIN_EVENT)],
        ),
        example(
            "For context, in 1999, the CAPE hit about 44 before the crash.",
            &[(16, 20, "DATE"), (51, 60, FIN_EVENT)],
        ),
        example(
            "Tech giants like MSFT and IBM also saw gains.",
            &[(17, 21, STOCK), (26, 29, STOCK)],
        ),
    ]
}

/// Training examples from a JSON file of `[text, {"entities": [...]}]` pairs.
pub fn load_data(path: &Path) -> Result<Vec<TrainExample>> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

/// Losses summed per epoch, keyed by component like the training log shows.
pub type Losses = BTreeMap<String, f64>;

pub struct Trainer {
    model: TunedLexicon,
    examples: Vec<Example>,
    rng: StdRng,
    drop: f64,
}

impl Trainer {
    pub fn new(model: TunedLexicon, data: &[TrainExample], config: &TrainConfig) -> Self {
        let tokenizer = Tokenizer::new();
        let examples = data
            .iter()
            .map(|TrainExample(text, ann)| Example::from_annotations(text, &ann.entities, &tokenizer))
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            model,
            examples,
            rng,
            drop: config.drop,
        }
    }

    pub fn epoch(&mut self) -> Losses {
        self.examples.shuffle(&mut self.rng);
        let mut losses = Losses::new();
        for example in &self.examples {
            let loss = self.model.update(example, self.drop, &mut self.rng);
            *losses.entry("ner".to_string()).or_insert(0.0) += loss;
        }
        self.model.finish_epoch();
        losses
    }

    pub fn run(&mut self, iterations: usize) -> Vec<Losses> {
        let mut history = Vec::with_capacity(iterations);
        for iteration in 0..iterations {
            info!("--- Iteration {} of {} ---", iteration + 1, iterations);
            let losses = self.epoch();
            info!("Losses: {:?}", losses);
            history.push(losses);
        }
        history
    }

    pub fn model(&self) -> &TunedLexicon {
        &self.model
    }

    pub fn into_model(self) -> TunedLexicon {
        self.model
    }
}

/// Fresh model with the custom labels registered, trained and saved.
pub fn train(base: &str, data: &[TrainExample], config: &TrainConfig) -> Result<TunedLexicon> {
    let mut model = TunedLexicon::new(&config.output, base);
    model.add_label(FIN_EVENT);
    model.add_label(STOCK);

    info!("Starting Training...");
    let mut trainer = Trainer::new(model, data, config);
    trainer.run(config.iterations);

    let model = trainer.into_model();
    info!("Training complete. Saving final model to ./{}", config.output);
    model.to_disk(Path::new(&config.output))?;
    Ok(model)
}
