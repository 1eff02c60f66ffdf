use rust_bert::pipelines::sentiment::{
    Sentiment as BertSentiment, SentimentConfig, SentimentModel, SentimentPolarity,
};
use serde::{Deserialize, Serialize};
use tch::Device;
use vader_sentiment::SentimentIntensityAnalyzer;

use std::sync::Mutex;

use log::*;

use crate::{Error, Result};

const POSITIVE_AT: f64 = 0.05;
const NEGATIVE_AT: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        write!(f, "{}", name)
    }
}

/// Scores from a sentiment backend. Only `compound` is used downstream.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polarity {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub compound: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    pub fn from_compound(compound: f64) -> Self {
        Self {
            compound,
            label: classify(compound),
        }
    }
}

/// Thresholds are closed on both sides: exactly 0.05 is Positive.
pub fn classify(score: f64) -> SentimentLabel {
    if score >= POSITIVE_AT {
        SentimentLabel::Positive
    } else if score <= NEGATIVE_AT {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Polarity>;
}

pub struct VaderScorer {
    analyzer: SentimentIntensityAnalyzer<'static>,
}

impl VaderScorer {
    pub fn new() -> Self {
        Self {
            analyzer: SentimentIntensityAnalyzer::new(),
        }
    }
}

impl Default for VaderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for VaderScorer {
    fn score(&self, text: &str) -> Result<Polarity> {
        if text.trim().is_empty() {
            return Ok(Polarity {
                neutral: 1.0,
                ..Default::default()
            });
        }
        let scores = self.analyzer.polarity_scores(text);
        let get = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        Ok(Polarity {
            compound: get("compound"),
            positive: get("pos"),
            negative: get("neg"),
            neutral: get("neu"),
        })
    }
}

/// Binary transformer sentiment stretched onto [-1, 1].
pub struct BertScorer {
    model: Mutex<SentimentModel>,
}

impl BertScorer {
    pub fn new(device: Device) -> Result<Self> {
        debug!("Loading sentiment model on {:?}", device);
        let sentiment_model = SentimentModel::new(SentimentConfig {
            device,
            ..Default::default()
        })?;

        Ok(Self {
            model: Mutex::new(sentiment_model),
        })
    }
}

impl Scorer for BertScorer {
    fn score(&self, text: &str) -> Result<Polarity> {
        if text.is_empty() {
            return Ok(Polarity {
                neutral: 1.0,
                ..Default::default()
            });
        }
        trace!("Locking model: sentiment");
        let model = self.model.lock().map_err(|_| Error::ModelUnavailable)?;
        trace!("Locked model: sentiment");
        let sentiment = model.predict(&[text]).pop().ok_or(Error::NoPrediction)?;
        Ok(from_bert(&sentiment))
    }
}

fn from_bert(sentiment: &BertSentiment) -> Polarity {
    let positive = match sentiment.polarity {
        SentimentPolarity::Positive => sentiment.score,
        SentimentPolarity::Negative => 1.0 - sentiment.score,
    };
    Polarity {
        compound: 2.0 * positive - 1.0,
        positive,
        negative: 1.0 - positive,
        neutral: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_closed() {
        assert_eq!(classify(0.05), SentimentLabel::Positive);
        assert_eq!(classify(-0.05), SentimentLabel::Negative);
        assert_eq!(classify(0.0), SentimentLabel::Neutral);
        for eps in &[1e-9, 1e-4, 0.01, 0.0499] {
            assert_eq!(classify(0.05 - eps), SentimentLabel::Neutral);
            assert_eq!(classify(-0.05 + eps), SentimentLabel::Neutral);
        }
    }

    #[test]
    fn unclamped_scores_still_classify() {
        assert_eq!(classify(3.0), SentimentLabel::Positive);
        assert_eq!(classify(-7.5), SentimentLabel::Negative);
        assert_eq!(classify(f64::NAN), SentimentLabel::Neutral);
    }

    #[test]
    fn label_serializes_as_word() {
        assert_eq!(serde_json::to_string(&SentimentLabel::Positive).unwrap(), "\"Positive\"");
        assert_eq!(SentimentLabel::Neutral.to_string(), "Neutral");
    }

    #[test]
    fn bert_probability_maps_to_compound() {
        let pos = from_bert(&BertSentiment {
            polarity: SentimentPolarity::Positive,
            score: 0.9,
        });
        assert!((pos.compound - 0.8).abs() < 1e-9);
        let neg = from_bert(&BertSentiment {
            polarity: SentimentPolarity::Negative,
            score: 0.75,
        });
        assert!((neg.compound + 0.5).abs() < 1e-9);
    }

    #[test]
    fn vader_reads_polarity() {
        let scorer = VaderScorer::new();
        assert!(scorer.score("Tech giants also saw great gains!").unwrap().compound > 0.05);
        assert!(scorer.score("The crash was a terrible disaster.").unwrap().compound < -0.05);
        assert_eq!(classify(scorer.score("").unwrap().compound), SentimentLabel::Neutral);
    }
}
