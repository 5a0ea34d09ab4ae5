//! Title tokenization and collation keys.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// A word of an item title, keyed for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Collation key of the word.
    pub key: String,
    /// Zero-based word position in the title; 0 is the first word.
    pub index: u32,
}

/// Locale-insensitive comparison key for a piece of text.
///
/// Lowercases, applies compatibility decomposition and drops combining marks,
/// so "Émail", "email" and "EMAIL" share a key. Prefix relationships between
/// keys are what the index matches on.
pub fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a title into positional tokens.
///
/// Words are separated by whitespace. Words whose key is empty (for example a
/// stray combining mark) produce no token but still consume a position.
pub fn tokenize(title: &str) -> Vec<Token> {
    title
        .to_lowercase()
        .split_whitespace()
        .enumerate()
        .filter_map(|(index, word)| {
            let key = collation_key(word);
            if key.is_empty() {
                None
            } else {
                Some(Token {
                    key,
                    index: index as u32,
                })
            }
        })
        .collect()
}
