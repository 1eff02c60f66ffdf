use std::collections::HashMap;

use crate::enti::EntitySpan;
use crate::legend::DEFAULT_COLOR;
use crate::text::CharIndex;

pub trait Render: Send + Sync {
    fn render(&self, text: &str, entities: &[EntitySpan], colors: &HashMap<String, String>) -> String;
}

/// Inline entity highlighting in the style of displaCy's "ent" view.
pub struct HtmlRenderer;

const WRAPPER: &str = r#"<div class="entities" style="line-height: 2.5; direction: ltr">"#;
const MARK_STYLE: &str = "padding: 0.45em 0.6em; margin: 0 0.25em; line-height: 1; border-radius: 0.35em;";
const LABEL_STYLE: &str = "font-size: 0.8em; font-weight: bold; line-height: 1; border-radius: 0.35em; vertical-align: middle; margin-left: 0.5rem";

impl Render for HtmlRenderer {
    fn render(&self, text: &str, entities: &[EntitySpan], colors: &HashMap<String, String>) -> String {
        let mut sorted: Vec<&EntitySpan> = entities.iter().collect();
        sorted.sort_by_key(|e| (e.start, e.end));

        let index = CharIndex::new(text);
        let total = index.len();
        let mut out = String::from(WRAPPER);
        let mut cursor = 0;
        for entity in sorted {
            // Overlapping or out of range spans cannot be marked inline
            if entity.start < cursor || entity.end > total || entity.start >= entity.end {
                continue;
            }
            out.push_str(&escape(index.slice(cursor, entity.start)));
            let color = colors
                .get(&entity.label)
                .map(String::as_str)
                .unwrap_or(DEFAULT_COLOR);
            out.push_str(&format!(
                "<mark class=\"entity\" style=\"background: {}; {}\">{}<span style=\"{}\">{}</span></mark>",
                escape(color),
                MARK_STYLE,
                escape(index.slice(entity.start, entity.end)),
                LABEL_STYLE,
                escape(&entity.label),
            ));
            cursor = entity.end;
        }
        out.push_str(&escape(index.slice(cursor, total)));
        out.push_str("</div>");
        out
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
