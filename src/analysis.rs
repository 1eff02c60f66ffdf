use serde::Serialize;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::*;

use crate::correct::correct;
use crate::enti::{EntitySpan, Recognizer};
use crate::legend::{LabelTables, LegendEntry};
use crate::render::Render;
use crate::senti::{Scorer, Sentiment, SentimentLabel};
use crate::text::preprocess;
use crate::Result;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub html: String,
    pub legend: BTreeMap<String, LegendEntry>,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

/// Everything needed to answer one request. Built once, shared by all.
pub struct Analyzer {
    recognizer: Arc<dyn Recognizer>,
    scorer: Arc<dyn Scorer>,
    renderer: Arc<dyn Render>,
    tables: LabelTables,
}

impl Analyzer {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        scorer: Arc<dyn Scorer>,
        renderer: Arc<dyn Render>,
        tables: LabelTables,
    ) -> Self {
        Self {
            recognizer,
            scorer,
            renderer,
            tables,
        }
    }

    /// Entities after the STOCK correction, for already normalised text.
    pub fn entities(&self, cleaned: &str) -> Result<Vec<EntitySpan>> {
        let raw = self.recognizer.analyze(cleaned)?;
        let raw_count = raw.len();
        let corrected = correct(raw);
        if corrected.len() != raw_count {
            debug!("Dropped {} STOCK predictions", raw_count - corrected.len());
        }
        Ok(corrected)
    }

    pub fn analyze(&self, raw_text: &str) -> Result<AnalysisResponse> {
        let cleaned = preprocess(raw_text);
        let entities = self.entities(&cleaned)?;
        let html = self
            .renderer
            .render(&cleaned, &entities, self.tables.colors());

        let sentiment = Sentiment::from_compound(self.scorer.score(&cleaned)?.compound);
        trace!("  Sentiment {} ({})", sentiment.label, sentiment.compound);

        Ok(AnalysisResponse {
            html,
            legend: self.tables.legend(&entities),
            sentiment_score: sentiment.compound,
            sentiment_label: sentiment.label,
        })
    }
}
