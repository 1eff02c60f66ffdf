use log::*;

use crate::enti::{EntitySpan, Recognizer};
use crate::ruler::EntityRuler;
use crate::Result;

/// Base model, then the fine tuned layer, then the rules.
///
/// Later stages win where spans overlap.
pub struct Pipeline {
    stages: Vec<(&'static str, Box<dyn Recognizer>)>,
    ruler: EntityRuler,
}

impl Pipeline {
    pub fn new(ruler: EntityRuler) -> Self {
        Self {
            stages: vec![],
            ruler,
        }
    }

    pub fn add_stage(mut self, name: &'static str, recognizer: Box<dyn Recognizer>) -> Self {
        self.stages.push((name, recognizer));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }
}

impl Recognizer for Pipeline {
    fn analyze(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let mut entities: Vec<EntitySpan> = vec![];
        for (name, stage) in &self.stages {
            let found = stage.analyze(text)?;
            trace!("  {} found {} entities", name, found.len());
            entities = overlay(entities, found);
        }
        Ok(self.ruler.apply(text, entities))
    }
}

/// Put `top` over `bottom`, dropping bottom spans that collide.
pub fn overlay(bottom: Vec<EntitySpan>, top: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let mut merged: Vec<EntitySpan> = bottom
        .into_iter()
        .filter(|b| !top.iter().any(|t| t.overlaps(b)))
        .collect();
    merged.extend(top);
    merged.sort_by_key(|e| e.start);
    merged
}
