use clap::Parser;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::*;

use finner::analysis::Analyzer;
use finner::config::{BaseModel, Config, SentimentBackend, DEFAULT_CONFIG};
use finner::enti::{BertRecognizer, Recognizer};
use finner::legend::LabelTables;
use finner::pipeline::Pipeline;
use finner::render::HtmlRenderer;
use finner::ruler::EntityRuler;
use finner::senti::{BertScorer, Scorer, VaderScorer};
use finner::tuned::TunedLexicon;
use finner::{init_logging, server, Error};

#[derive(Parser, Debug)]
#[command(name = "finner", version, about = "Financial entity tagging and sentiment service")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    #[arg(long, help = "Override the listen address")]
    bind: Option<String>,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    init_logging(config.debug);

    info!("Loading models...");
    // rust-bert downloads with a blocking client, so models load before tokio starts
    let recognizer = build_recognizer(&config)?;
    let scorer: Arc<dyn Scorer> = match config.sentiment {
        SentimentBackend::Vader => Arc::new(VaderScorer::new()),
        SentimentBackend::Bert => Arc::new(BertScorer::new(config.device())?),
    };
    let analyzer = Arc::new(Analyzer::new(
        recognizer,
        scorer,
        Arc::new(HtmlRenderer),
        LabelTables::new(),
    ));
    info!("Model and pipeline ready.");

    let bind = cli.bind.unwrap_or_else(|| config.bind.clone());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server::serve(analyzer, &bind))
}

fn build_recognizer(config: &Config) -> Result<Arc<dyn Recognizer>, Error> {
    let mut ruler = EntityRuler::new(config.overwrite_ents);
    ruler.add_patterns(&config.patterns)?;
    debug!("Ruler has {} patterns", ruler.len());

    let mut pipeline = Pipeline::new(ruler);
    if config.base_model == BaseModel::Bert {
        pipeline = pipeline.add_stage("bert", Box::new(BertRecognizer::new(config.device())?));
    }
    if let Some(model_dir) = &config.model_dir {
        let tuned = TunedLexicon::from_disk(Path::new(model_dir))?;
        info!(
            "Loaded tuned model {} ({} phrases, labels {:?})",
            tuned.meta().name,
            tuned.phrases(),
            tuned.labels()
        );
        pipeline = pipeline.add_stage("tuned", Box::new(tuned));
    } else {
        warn!("No tuned model configured, custom labels come from rules only");
    }
    info!("Pipeline: {:?} + ruler", pipeline.stage_names());
    Ok(Arc::new(pipeline))
}
