//! Token index for prefix search over item titles.
//!
//! This module provides:
//! - Title tokenization with locale-insensitive collation keys
//! - An in-memory inverted index with atomic snapshot rebuilds
//! - Prefix queries that report the best (earliest) matching word per item

mod token_index;
mod tokenizer;

pub use token_index::{IndexMatch, RebuildStats, TokenIndex};
pub use tokenizer::{collation_key, tokenize, Token};
