use rand::Rng;
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::*;

use crate::enti::{EntitySpan, Recognizer};
use crate::text::CharIndex;
use crate::tokens::{Token, Tokenizer};
use crate::Result;

const META_FILE: &str = "meta.json";
const LEXICON_FILE: &str = "lexicon.json";

/// A text with its gold entities, already checked against token boundaries.
#[derive(Debug, Clone)]
pub struct Example {
    pub text: String,
    pub gold: Vec<EntitySpan>,
}

impl Example {
    /// Annotations that start or end inside a token are skipped with a warning.
    pub fn from_annotations(text: &str, entities: &[(usize, usize, String)], tokenizer: &Tokenizer) -> Self {
        let tokens = tokenizer.tokenize(text);
        let index = CharIndex::new(text);
        let mut gold = vec![];
        for (start, end, label) in entities {
            let starts = tokens.iter().any(|t| t.start == *start);
            let ends = tokens.iter().any(|t| t.end == *end);
            if starts && ends && start < end {
                gold.push(EntitySpan::at(&index, *start, *end, label));
            } else {
                warn!(
                    "Misaligned {} entity ({}, {}) in {:?} ignored",
                    label, start, end, text
                );
            }
        }
        Self {
            text: text.to_string(),
            gold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub name: String,
    pub base: String,
    pub labels: Vec<String>,
    pub epochs: usize,
}

/// Phrase to label weights learned from annotated examples.
///
/// Phrases are whole token sequences joined by single spaces. At prediction
/// time the longest known phrase starting at each token wins.
#[derive(Debug)]
pub struct TunedLexicon {
    tokenizer: Tokenizer,
    meta: ModelMeta,
    weights: BTreeMap<String, BTreeMap<String, f64>>,
    max_len: usize,
}

impl TunedLexicon {
    pub fn new(name: &str, base: &str) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            meta: ModelMeta {
                name: name.to_string(),
                base: base.to_string(),
                labels: vec![],
                epochs: 0,
            },
            weights: BTreeMap::new(),
            max_len: 0,
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn labels(&self) -> &[String] {
        &self.meta.labels
    }

    pub fn phrases(&self) -> usize {
        self.weights.len()
    }

    pub fn add_label(&mut self, label: &str) {
        if !self.meta.labels.iter().any(|l| l == label) {
            debug!("Tuned: new label {}", label);
            self.meta.labels.push(label.to_string());
        }
    }

    pub fn finish_epoch(&mut self) {
        self.meta.epochs += 1;
    }

    pub fn predict(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = self.tokenizer.tokenize(text);
        let index = CharIndex::new(text);
        let mut found = vec![];
        let mut i = 0;
        while i < tokens.len() {
            let longest = self.max_len.min(tokens.len() - i);
            let hit = (1..=longest).rev().find_map(|n| {
                let window = &tokens[i..i + n];
                self.best_label(&phrase(window)).map(|label| (n, label))
            });
            if let Some((n, label)) = hit {
                found.push(EntitySpan::at(&index, tokens[i].start, tokens[i + n - 1].end, label));
                i += n;
            } else {
                i += 1;
            }
        }
        found
    }

    fn best_label(&self, phrase: &str) -> Option<&str> {
        let mut best: Option<(&str, f64)> = None;
        for (label, weight) in self.weights.get(phrase)? {
            // Ties keep the alphabetically first label
            if *weight > 0.0 && best.map_or(true, |(_, w)| *weight > w) {
                best = Some((label.as_str(), *weight));
            }
        }
        best.map(|(label, _)| label)
    }

    /// One learning step on one example, returning the loss before the step.
    ///
    /// The loss counts missed gold spans plus spurious predictions. Gold spans
    /// are each skipped with probability `drop`.
    pub fn update<R: Rng>(&mut self, example: &Example, drop: f64, rng: &mut R) -> f64 {
        let predicted = self.predict(&example.text);
        let missed: Vec<&EntitySpan> = example
            .gold
            .iter()
            .filter(|g| !predicted.contains(g))
            .collect();
        let spurious: Vec<&EntitySpan> = predicted
            .iter()
            .filter(|p| !example.gold.contains(p))
            .collect();
        let loss = (missed.len() + spurious.len()) as f64;

        for gold in &example.gold {
            if drop > 0.0 && rng.gen::<f64>() < drop {
                continue;
            }
            self.add_label(&gold.label);
            self.nudge(&gold.text, &gold.label, 1.0);
        }
        for wrong in spurious {
            self.nudge(&wrong.text, &wrong.label, -1.0);
        }
        loss
    }

    fn nudge(&mut self, surface: &str, label: &str, delta: f64) {
        let tokens = self.tokenizer.tokenize(surface);
        if tokens.is_empty() {
            return;
        }
        self.max_len = self.max_len.max(tokens.len());
        *self
            .weights
            .entry(phrase(&tokens))
            .or_default()
            .entry(label.to_string())
            .or_insert(0.0) += delta;
    }

    pub fn to_disk(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(META_FILE), serde_json::to_string_pretty(&self.meta)?)?;
        fs::write(dir.join(LEXICON_FILE), serde_json::to_string_pretty(&self.weights)?)?;
        info!("Saved {} phrases to {}", self.weights.len(), dir.display());
        Ok(())
    }

    pub fn from_disk(dir: &Path) -> Result<Self> {
        let meta: ModelMeta = serde_json::from_str(&fs::read_to_string(dir.join(META_FILE))?)?;
        let weights: BTreeMap<String, BTreeMap<String, f64>> =
            serde_json::from_str(&fs::read_to_string(dir.join(LEXICON_FILE))?)?;
        let tokenizer = Tokenizer::new();
        let max_len = weights
            .keys()
            .map(|k| tokenizer.tokenize(k).len())
            .max()
            .unwrap_or(0);
        debug!("Loaded {} ({} phrases, {} epochs)", meta.name, weights.len(), meta.epochs);
        Ok(Self {
            tokenizer,
            meta,
            weights,
            max_len,
        })
    }
}

impl Recognizer for TunedLexicon {
    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>> {
        Ok(self.predict(text))
    }
}

fn phrase(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ")
}
