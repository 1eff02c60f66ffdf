use serde::Serialize;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::enti::{EntitySpan, FIN_EVENT, STOCK};

pub const DEFAULT_COLOR: &str = "#ddd";

const LABEL_COLORS: &[(&str, &str)] = &[
    ("PERSON", "#aa9cfc"),
    ("ORG", "#7aecec"),
    ("GPE", "#feca74"),
    ("DATE", "#bce784"),
    (FIN_EVENT, "#ff9999"),
    (STOCK, "#ffb3c1"),
    ("CARDINAL", "#e4e7d2"),
    ("MONEY", "#e4e7d2"),
    ("PERCENT", "#e4e7d2"),
];

const CUSTOM_DESCRIPTIONS: &[(&str, &str)] = &[
    (STOCK, "A stock market ticker symbol."),
    (
        FIN_EVENT,
        "A significant financial or market event, like a crash or bubble.",
    ),
];

// General purpose explanations of the usual named entity labels.
const GLOSSARY: &[(&str, &str)] = &[
    ("PERSON", "People, including fictional"),
    ("PER", "Named person or family."),
    ("NORP", "Nationalities or religious or political groups"),
    ("FAC", "Buildings, airports, highways, bridges, etc."),
    ("ORG", "Companies, agencies, institutions, etc."),
    ("GPE", "Countries, cities, states"),
    ("LOC", "Non-GPE locations, mountain ranges, bodies of water"),
    ("PRODUCT", "Objects, vehicles, foods, etc. (not services)"),
    ("EVENT", "Named hurricanes, battles, wars, sports events, etc."),
    ("WORK_OF_ART", "Titles of books, songs, etc."),
    ("LAW", "Named documents made into laws."),
    ("LANGUAGE", "Any named language"),
    ("DATE", "Absolute or relative dates or periods"),
    ("TIME", "Times smaller than a day"),
    ("PERCENT", "Percentage, including \"%\""),
    ("MONEY", "Monetary values, including unit"),
    ("QUANTITY", "Measurements, as of weight or distance"),
    ("ORDINAL", "\"first\", \"second\", etc."),
    ("CARDINAL", "Numerals that do not fall under another type"),
    (
        "MISC",
        "Miscellaneous entities, e.g. events, nationalities, products or works of art",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub description: Option<String>,
    pub color: String,
}

/// Label colours and descriptions, built once and shared read only.
#[derive(Debug, Clone)]
pub struct LabelTables {
    colors: HashMap<String, String>,
    custom: HashMap<String, String>,
    glossary: HashMap<String, String>,
}

fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl LabelTables {
    pub fn new() -> Self {
        Self {
            colors: to_map(LABEL_COLORS),
            custom: to_map(CUSTOM_DESCRIPTIONS),
            glossary: to_map(GLOSSARY),
        }
    }

    pub fn colors(&self) -> &HashMap<String, String> {
        &self.colors
    }

    pub fn color(&self, label: &str) -> &str {
        self.colors
            .get(label)
            .map(String::as_str)
            .unwrap_or(DEFAULT_COLOR)
    }

    /// The glossary text for a label, if it is a well known one.
    pub fn explain(&self, label: &str) -> Option<&str> {
        self.glossary.get(label).map(String::as_str)
    }

    /// Custom descriptions beat the glossary.
    pub fn describe(&self, label: &str) -> Option<&str> {
        self.custom
            .get(label)
            .map(String::as_str)
            .or_else(|| self.explain(label))
    }

    /// One entry per distinct label, keyed and ordered by label name.
    pub fn legend(&self, entities: &[EntitySpan]) -> BTreeMap<String, LegendEntry> {
        let labels: BTreeSet<&str> = entities.iter().map(|e| e.label.as_str()).collect();
        labels
            .into_iter()
            .map(|label| {
                (
                    label.to_string(),
                    LegendEntry {
                        description: self.describe(label).map(str::to_string),
                        color: self.color(label).to_string(),
                    },
                )
            })
            .collect()
    }
}

impl Default for LabelTables {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, label: &str) -> EntitySpan {
        EntitySpan {
            start: 0,
            end: text.len(),
            text: text.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn stock_uses_custom_description() {
        let tables = LabelTables::new();
        assert_eq!(tables.describe(STOCK), Some("A stock market ticker symbol."));
        assert_eq!(
            tables.describe(FIN_EVENT),
            Some("A significant financial or market event, like a crash or bubble.")
        );
    }

    #[test]
    fn falls_back_to_glossary_then_nothing() {
        let tables = LabelTables::new();
        assert_eq!(tables.describe("GPE"), Some("Countries, cities, states"));
        assert_eq!(tables.describe("CRYPTO"), None);
    }

    #[test]
    fn unknown_colour_is_grey() {
        let tables = LabelTables::new();
        assert_eq!(tables.color("ORG"), "#7aecec");
        assert_eq!(tables.color("NORP"), DEFAULT_COLOR);
    }

    #[test]
    fn legend_is_sorted_and_distinct() {
        let tables = LabelTables::new();
        let legend = tables.legend(&[
            span("MSFT", STOCK),
            span("US", "GPE"),
            span("IBM", STOCK),
            span("1999", "DATE"),
            span("Widget", "GADGET"),
        ]);
        let keys: Vec<&str> = legend.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["DATE", "GADGET", "GPE", "STOCK"]);
        assert_eq!(
            legend["STOCK"],
            LegendEntry {
                description: Some("A stock market ticker symbol.".to_string()),
                color: "#ffb3c1".to_string(),
            }
        );
        assert_eq!(legend["GADGET"].description, None);
        assert_eq!(legend["GADGET"].color, "#ddd");
    }

    #[test]
    fn empty_legend() {
        assert!(LabelTables::new().legend(&[]).is_empty());
    }
}
