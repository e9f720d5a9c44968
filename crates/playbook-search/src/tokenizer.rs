//! Text tokenization.
//!
//! Tokenizer behaviour is a value, not module state: the route matcher and
//! the full-text index each carry their own [`TokenizerConfig`].

use std::collections::HashSet;

/// Stop words dropped from route phrases and task queries
pub const ROUTE_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "how", "what", "when", "where", "why", "which", "this", "that",
    "from", "into", "use", "using",
];

/// Tokenizer settings.
#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    /// Tokens shorter than this many characters are dropped
    pub min_chars: usize,
    /// Lowercase words dropped from the output
    pub stop_words: HashSet<String>,
    /// Treat `_` as part of a word, so `snake_case` stays one token
    pub keep_underscores: bool,
}

impl TokenizerConfig {
    /// Settings for route phrases: tokens longer than 2 characters, stop words removed.
    pub fn routing() -> Self {
        Self {
            min_chars: 3,
            stop_words: ROUTE_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            keep_underscores: true,
        }
    }

    /// Settings for full-text search: every non-empty token is kept and
    /// `_` separates words like any other punctuation.
    pub fn full_text() -> Self {
        Self {
            min_chars: 1,
            stop_words: HashSet::new(),
            keep_underscores: false,
        }
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(|w| w.into().to_lowercase()).collect();
        self
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self::full_text()
    }
}

/// Splits text into lowercase alphanumeric tokens.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn routing() -> Self {
        Self::new(TokenizerConfig::routing())
    }

    pub fn full_text() -> Self {
        Self::new(TokenizerConfig::full_text())
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize `text`, keeping duplicates and input order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || (self.config.keep_underscores && c == '_')))
            .filter(|s| s.chars().count() >= self.config.min_chars.max(1))
            .filter(|s| !self.config.stop_words.contains(*s))
            .map(String::from)
            .collect()
    }
}
