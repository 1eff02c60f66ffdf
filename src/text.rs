/// Collapse every run of whitespace to a single space and trim both ends.
///
/// Both the recognizer and the scorer see this text so their offsets agree.
pub fn preprocess(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Slice `text` by character offsets, `end` exclusive.
///
/// Walks the text once per call; use `CharIndex` when slicing repeatedly.
pub fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |idx: usize| {
        text.char_indices()
            .nth(idx)
            .map(|(b, _)| b)
            .unwrap_or_else(|| text.len())
    };
    let (start, end) = (byte_at(start), byte_at(end));
    if start >= end {
        ""
    } else {
        &text[start..end]
    }
}

/// Byte offset of every char, built once so char slicing is constant time.
#[derive(Debug)]
pub struct CharIndex<'a> {
    text: &'a str,
    bytes: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut bytes: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        bytes.push(text.len());
        Self { text, bytes }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of chars in the text.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offsets past the end are clamped to it.
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let last = self.len();
        let (start, end) = (self.bytes[start.min(last)], self.bytes[end.min(last)]);
        if start >= end {
            ""
        } else {
            &self.text[start..end]
        }
    }
}

/// Same meaning as `str.isupper`: at least one cased character, all of them uppercase.
pub fn is_upper(input: &str) -> bool {
    let mut cased = false;
    for c in input.chars() {
        if c.is_uppercase() {
            cased = true;
        } else if c.is_lowercase() {
            return false;
        } else if c.to_uppercase().ne(std::iter::once(c)) {
            // Titlecase letters such as 'ǅ' are cased but not upper
            return false;
        }
    }
    cased
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_all_whitespace() {
        assert_eq!(preprocess("  Tech\tgiants\n\nlike   MSFT  "), "Tech giants like MSFT");
        assert_eq!(preprocess(""), "");
        assert_eq!(preprocess(" \n\t "), "");
    }

    #[test]
    fn preprocess_is_idempotent() {
        for input in &["a  b", "\n x\t\ty \r\n", "", "already clean", " é  ü "] {
            let once = preprocess(input);
            assert_eq!(preprocess(&once), once);
        }
    }

    #[test]
    fn slices_by_chars_not_bytes() {
        let text = "€10 for $AAPL";
        assert_eq!(char_slice(text, 0, 3), "€10");
        assert_eq!(char_slice(text, 8, 13), "$AAPL");
        assert_eq!(char_slice(text, 8, 100), "$AAPL");
        assert_eq!(char_slice(text, 5, 5), "");
    }

    #[test]
    fn upper_matches_python() {
        assert!(is_upper("MSFT"));
        assert!(is_upper("A"));
        assert!(is_upper("$AAPL"));
        assert!(is_upper("BRK.B"));
        assert!(!is_upper("Nvidia"));
        assert!(!is_upper("$Nvidia"));
        assert!(!is_upper("1999"));
        assert!(!is_upper(""));
    }

    #[test]
    fn titlecase_is_not_upper() {
        assert!(!is_upper("Aǅ"));
        assert!(!is_upper("ǅ"));
        assert!(is_upper("Ǆ"));
    }

    #[test]
    fn index_slices_like_char_slice() {
        let text = "€10 for $AAPL";
        let index = CharIndex::new(text);
        assert_eq!(index.len(), 13);
        for (start, end) in &[(0, 3), (8, 13), (8, 100), (5, 5), (12, 3), (40, 50)] {
            assert_eq!(index.slice(*start, *end), char_slice(text, *start, *end));
        }
        assert!(CharIndex::new("").is_empty());
    }
}
