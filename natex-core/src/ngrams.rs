//! Tokenized view of an utterance, handed to macros
//!
//! An utterance is split into lower-cased word tokens; every contiguous run
//! of up to `max_n` tokens is an n-gram. Macros use this to test for phrases
//! without scanning the raw text themselves.

use std::collections::HashSet;

/// Default upper bound on n-gram length
pub const DEFAULT_MAX_N: usize = 6;

/// The n-grams of one utterance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ngrams {
    text: String,
    tokens: Vec<String>,
    grams: HashSet<String>,
    max_n: usize,
}

impl Ngrams {
    /// Build the n-grams of `text` up to [`DEFAULT_MAX_N`] tokens long
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_max_n(text, DEFAULT_MAX_N)
    }

    /// Build the n-grams of `text` up to `max_n` tokens long
    pub fn with_max_n(text: impl Into<String>, max_n: usize) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        let mut grams = HashSet::new();
        for n in 1..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.insert(window.join(" "));
            }
        }
        Ngrams {
            text,
            tokens,
            grams,
            max_n,
        }
    }

    /// The original utterance
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lower-cased word tokens, in order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Longest n-gram length collected
    pub fn max_n(&self) -> usize {
        self.max_n
    }

    /// Whether `phrase` occurs as a contiguous run of tokens
    pub fn contains(&self, phrase: &str) -> bool {
        let phrase = tokenize(phrase).join(" ");
        !phrase.is_empty() && self.grams.contains(&phrase)
    }

    /// All n-grams of exactly `n` tokens, in utterance order
    pub fn of_length(&self, n: usize) -> impl Iterator<Item = String> + '_ {
        let windows = if n == 0 { None } else { Some(self.tokens.windows(n)) };
        windows.into_iter().flatten().map(|window| window.join(" "))
    }

    /// Iterate over every collected n-gram, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.grams.iter().map(String::as_str)
    }

    /// Number of distinct n-grams
    pub fn len(&self) -> usize {
        self.grams.len()
    }

    /// Check if there are no n-grams at all
    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_lowercased_words() {
        let ngrams = Ngrams::new("Hello, there! I'm fine.");
        assert_eq!(ngrams.tokens(), &["hello", "there", "i'm", "fine"]);
        assert_eq!(ngrams.text(), "Hello, there! I'm fine.");
    }

    #[test]
    fn test_contains_phrases() {
        let ngrams = Ngrams::new("I have a black cat");
        assert!(ngrams.contains("cat"));
        assert!(ngrams.contains("black cat"));
        assert!(ngrams.contains("Black  Cat"));
        assert!(!ngrams.contains("have cat"));
        assert!(!ngrams.contains(""));
    }

    #[test]
    fn test_max_n_limits_phrase_length() {
        let ngrams = Ngrams::with_max_n("a b c", 2);
        assert!(ngrams.contains("a b"));
        assert!(!ngrams.contains("a b c"));
        assert_eq!(ngrams.len(), 5);
    }

    #[test]
    fn test_of_length() {
        let ngrams = Ngrams::new("a b c");
        let bigrams: Vec<_> = ngrams.of_length(2).collect();
        assert_eq!(bigrams, vec!["a b", "b c"]);
        assert_eq!(ngrams.of_length(0).count(), 0);
        assert_eq!(ngrams.of_length(4).count(), 0);
    }

    #[test]
    fn test_empty() {
        let ngrams = Ngrams::default();
        assert!(ngrams.is_empty());
        assert_eq!(ngrams.iter().count(), 0);
    }
}
