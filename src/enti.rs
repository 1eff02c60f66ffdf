use rust_bert::pipelines::ner::{Entity, NERModel};
use rust_bert::pipelines::token_classification::TokenClassificationConfig;
use serde::{Deserialize, Serialize};
use tch::Device;

use std::sync::Mutex;

use log::*;

use crate::text::{char_slice, CharIndex};
use crate::{Error, Result};

pub const STOCK: &str = "STOCK";
pub const FIN_EVENT: &str = "FIN_EVENT";

/// A labelled substring of the analysed text. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub label: String,
}

impl EntitySpan {
    pub fn new(source: &str, start: usize, end: usize, label: &str) -> Self {
        Self {
            start,
            end,
            text: char_slice(source, start, end).to_string(),
            label: label.to_string(),
        }
    }

    /// Like `new`, slicing through a prebuilt index of the source.
    pub fn at(index: &CharIndex, start: usize, end: usize, label: &str) -> Self {
        Self {
            start,
            end,
            text: index.slice(start, end).to_string(),
            label: label.to_string(),
        }
    }

    pub fn overlaps(&self, other: &EntitySpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Anything that can find entities in normalised text.
pub trait Recognizer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Pretrained transformer NER with its CoNLL labels mapped to ours.
pub struct BertRecognizer {
    model: Mutex<NERModel>,
}

impl BertRecognizer {
    pub fn new(device: Device) -> Result<Self> {
        debug!("Loading ner model on {:?}", device);
        let entity_model = NERModel::new(TokenClassificationConfig {
            device,
            ..Default::default()
        })?;

        Ok(Self {
            model: Mutex::new(entity_model),
        })
    }
}

impl Recognizer for BertRecognizer {
    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>> {
        if text.is_empty() {
            return Ok(vec![]);
        }
        trace!("Locking model: ner");
        let model = self.model.lock().map_err(|_| Error::ModelUnavailable)?;
        trace!("Locked model: ner");
        let entities = model
            .predict_full_entities(&[text])
            .pop()
            .ok_or(Error::NoPrediction)?;
        let index = CharIndex::new(text);
        Ok(entities.iter().map(|e| from_bert(&index, e)).collect())
    }
}

fn from_bert(index: &CharIndex, entity: &Entity) -> EntitySpan {
    EntitySpan::at(
        index,
        entity.offset.begin as usize,
        entity.offset.end as usize,
        conll_label(&entity.label),
    )
}

/// CoNLL-2003 tags to the OntoNotes style names the legend knows.
pub fn conll_label(label: &str) -> &str {
    match label.trim_start_matches("B-").trim_start_matches("I-") {
        "PER" => "PERSON",
        "LOC" => "GPE",
        "ORG" => "ORG",
        "MISC" => "MISC",
        other => other,
    }
}
