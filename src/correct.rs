use crate::enti::{EntitySpan, STOCK};
use crate::text::is_upper;

/// Drop STOCK predictions that do not look like a ticker.
///
/// A STOCK span survives only if it is all uppercase or starts with `$`.
/// Spans with any other label are passed through untouched and order is kept.
pub fn correct(entities: Vec<EntitySpan>) -> Vec<EntitySpan> {
    entities.into_iter().filter(keep).collect()
}

fn keep(entity: &EntitySpan) -> bool {
    if entity.label == STOCK {
        is_upper(&entity.text) || entity.text.starts_with('$')
    } else {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, label: &str) -> EntitySpan {
        EntitySpan {
            start: 0,
            end: text.chars().count(),
            text: text.to_string(),
            label: label.to_string(),
        }
    }

    fn pairs(entities: &[EntitySpan]) -> Vec<(&str, &str)> {
        entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect()
    }

    #[test]
    fn keeps_tickers_and_drops_prose() {
        let input = vec![
            span("MSFT", STOCK),
            span("Nvidia", STOCK),
            span("$AAPL", STOCK),
        ];
        let output = correct(input);
        assert_eq!(pairs(&output), vec![("MSFT", "STOCK"), ("$AAPL", "STOCK")]);
    }

    #[test]
    fn dollar_prefix_alone_is_enough() {
        let output = correct(vec![span("$Nvidia", STOCK)]);
        assert_eq!(pairs(&output), vec![("$Nvidia", "STOCK")]);
    }

    #[test]
    fn single_letter_ticker() {
        assert_eq!(correct(vec![span("F", STOCK)]).len(), 1);
    }

    #[test]
    fn other_labels_untouched_and_ordered() {
        let input = vec![
            span("Nvidia", "ORG"),
            span("apple", STOCK),
            span("dot-com crash", "FIN_EVENT"),
            span("IBM", STOCK),
            span("lowercase person", "PERSON"),
        ];
        let output = correct(input.clone());
        assert_eq!(
            output,
            vec![
                input[0].clone(),
                input[2].clone(),
                input[3].clone(),
                input[4].clone()
            ]
        );
    }

    #[test]
    fn empty_in_empty_out() {
        assert!(correct(vec![]).is_empty());
    }
}
