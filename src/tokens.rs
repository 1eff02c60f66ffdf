use regex::Regex;

const PREFIXES: &[char] = &['$', '£', '€', '¥', '(', '[', '{', '"', '\'', '“', '‘'];
const SUFFIXES: &[char] = &[
    '.', ',', '!', '?', ';', ':', ')', ']', '}', '"', '\'', '”', '’', '%',
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Character offset of the first char.
    pub start: usize,
    /// Character offset one past the last char.
    pub end: usize,
}

#[derive(Debug)]
pub struct Tokenizer {
    chunks: Regex,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self {
            // Infallible: the pattern is a literal
            chunks: Regex::new(r"\S+").unwrap(),
        }
    }

    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let mut tokens = vec![];
        // Char offset of `last_byte`, advanced chunk by chunk
        let (mut last_byte, mut chunk_start) = (0, 0);
        for chunk in self.chunks.find_iter(input) {
            chunk_start += input[last_byte..chunk.start()].chars().count();
            last_byte = chunk.start();
            let chars: Vec<char> = chunk.as_str().chars().collect();
            let (mut lo, mut hi) = (0, chars.len());

            let mut prefix = vec![];
            while hi - lo > 1 && PREFIXES.contains(&chars[lo]) {
                prefix.push(lo);
                lo += 1;
            }
            let mut suffix = vec![];
            while hi - lo > 1 && SUFFIXES.contains(&chars[hi - 1]) {
                hi -= 1;
                suffix.push(hi);
            }

            let mut push = |from: usize, to: usize| {
                tokens.push(Token {
                    text: chars[from..to].iter().collect(),
                    start: chunk_start + from,
                    end: chunk_start + to,
                });
            };
            for p in prefix {
                push(p, p + 1);
            }
            push(lo, hi);
            for s in suffix.into_iter().rev() {
                push(s, s + 1);
            }
        }
        tokens
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> Vec<String> {
        Tokenizer::new()
            .tokenize(input)
            .into_iter()
            .map(|t| t.text)
            .collect()
    }

    #[test]
    fn splits_currency_and_punctuation() {
        assert_eq!(words("Buy $AAPL now."), vec!["Buy", "$", "AAPL", "now", "."]);
        assert_eq!(words("(MSFT, IBM)"), vec!["(", "MSFT", ",", "IBM", ")"]);
        assert_eq!(words("up 5%!"), vec!["up", "5", "%", "!"]);
    }

    #[test]
    fn lone_symbols_stay_whole() {
        assert_eq!(words("$ ."), vec!["$", "."]);
    }

    #[test]
    fn offsets_are_characters() {
        let tokens = Tokenizer::new().tokenize("€5 for $NVDA.");
        let spans: Vec<(usize, usize)> = tokens.iter().map(|t| (t.start, t.end)).collect();
        assert_eq!(spans, vec![(0, 1), (1, 2), (3, 6), (7, 8), (8, 12), (12, 13)]);
    }

    #[test]
    fn long_input_offsets_stay_in_chars() {
        let input = "€5 for $NVDA. ".repeat(8000);
        let input = input.trim_end();
        let tokens = Tokenizer::new().tokenize(input);
        assert_eq!(tokens.len(), 6 * 8000);
        let last = &tokens[tokens.len() - 1];
        assert_eq!(last.text, ".");
        assert_eq!(last.end, input.chars().count());
        let ticker = &tokens[tokens.len() - 2];
        assert_eq!((ticker.start, ticker.end), (last.start - 4, last.start));
    }

    #[test]
    fn empty_input() {
        assert!(words("").is_empty());
    }
}
