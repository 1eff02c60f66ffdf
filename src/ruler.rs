use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use validator::Validate;
use validator_derive::Validate;

use log::*;

use crate::enti::{EntitySpan, STOCK};
use crate::text::{is_upper, CharIndex};
use crate::tokens::{Token, Tokenizer};
use crate::{Error, Result};

/// One token of a pattern. Every attribute that is set must match.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TokenSpec {
    #[serde(rename = "TEXT", default)]
    pub text: Option<String>,
    #[serde(rename = "LOWER", default)]
    pub lower: Option<String>,
    #[serde(rename = "IS_UPPER", default)]
    pub is_upper: Option<bool>,
    #[serde(rename = "IS_DIGIT", default)]
    pub is_digit: Option<bool>,
}

impl TokenSpec {
    fn matches(&self, token: &Token) -> bool {
        if let Some(text) = &self.text {
            if &token.text != text {
                return false;
            }
        }
        if let Some(lower) = &self.lower {
            if &token.text.to_lowercase() != lower {
                return false;
            }
        }
        if let Some(upper) = self.is_upper {
            if is_upper(&token.text) != upper {
                return false;
            }
        }
        if let Some(digit) = self.is_digit {
            let all_digits = !token.text.is_empty() && token.text.chars().all(|c| c.is_ascii_digit());
            if all_digits != digit {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct PatternRule {
    #[validate(length(min = 1))]
    pub label: String,

    #[validate(length(min = 1))]
    pub pattern: Vec<TokenSpec>,
}

/// `$` followed by an all-uppercase token is a ticker.
pub fn default_patterns() -> Vec<PatternRule> {
    vec![PatternRule {
        label: STOCK.to_string(),
        pattern: vec![
            TokenSpec {
                text: Some("$".to_string()),
                ..Default::default()
            },
            TokenSpec {
                is_upper: Some(true),
                ..Default::default()
            },
        ],
    }]
}

/// Rule based entity labelling run after the statistical models.
pub struct EntityRuler {
    tokenizer: Tokenizer,
    patterns: Vec<PatternRule>,
    overwrite_ents: bool,
}

impl EntityRuler {
    pub fn new(overwrite_ents: bool) -> Self {
        Self {
            tokenizer: Tokenizer::new(),
            patterns: vec![],
            overwrite_ents,
        }
    }

    pub fn add_patterns(&mut self, patterns: &[PatternRule]) -> Result<()> {
        for rule in patterns {
            if rule.label.is_empty() || rule.pattern.is_empty() {
                return Err(Error::InvalidPattern(rule.label.clone()));
            }
            debug!("Ruler: adding {} pattern of {} tokens", rule.label, rule.pattern.len());
            self.patterns.push(rule.clone());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern hits without overlaps. Longer hits win, then earlier ones.
    pub fn matches(&self, text: &str) -> Vec<EntitySpan> {
        let tokens = self.tokenizer.tokenize(text);
        // (first token, token count, rule)
        let mut candidates: Vec<(usize, usize, &PatternRule)> = vec![];
        for i in 0..tokens.len() {
            for rule in &self.patterns {
                if matches_at(&rule.pattern, &tokens[i..]) {
                    candidates.push((i, rule.pattern.len(), rule));
                }
            }
        }
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut taken = vec![false; tokens.len()];
        let mut chosen = vec![];
        for (i, n, rule) in candidates {
            if taken[i..i + n].iter().any(|t| *t) {
                continue;
            }
            taken[i..i + n].iter_mut().for_each(|t| *t = true);
            chosen.push((i, n, rule));
        }
        chosen.sort_by_key(|(i, _, _)| *i);

        let index = CharIndex::new(text);
        chosen
            .into_iter()
            .map(|(i, n, rule)| EntitySpan::at(&index, tokens[i].start, tokens[i + n - 1].end, &rule.label))
            .collect()
    }

    /// Merge rule hits into `existing`, sorted by start offset.
    pub fn apply(&self, text: &str, existing: Vec<EntitySpan>) -> Vec<EntitySpan> {
        let ruled = self.matches(text);
        let mut merged: Vec<EntitySpan> = if self.overwrite_ents {
            let mut kept: Vec<EntitySpan> = existing
                .into_iter()
                .filter(|e| !ruled.iter().any(|r| r.overlaps(e)))
                .collect();
            kept.extend(ruled);
            kept
        } else {
            let kept: Vec<EntitySpan> = ruled
                .into_iter()
                .filter(|r| !existing.iter().any(|e| e.overlaps(r)))
                .collect();
            existing.into_iter().chain(kept).collect()
        };
        merged.sort_by_key(|e| e.start);
        merged
    }
}

fn matches_at(pattern: &[TokenSpec], tokens: &[Token]) -> bool {
    pattern.len() <= tokens.len() && pattern.iter().zip(tokens).all(|(spec, tok)| spec.matches(tok))
}
