//! # playbook-search
//!
//! Ranking for the playbook engine.
//!
//! ## Features
//! - In-memory inverted index with per-field boosts and BM25+ relevance
//! - Prefix expansion over the sorted term dictionary
//! - Fuzzy matching with a bounded edit distance
//! - Keyword route matcher over the task routing table
//!
//! Tokenizers are plain values ([`TokenizerConfig`]) handed to each index.

pub mod error;
pub mod fuzzy;
pub mod index;
pub mod route_matcher;
pub mod tokenizer;

pub use error::SearchError;
pub use index::{
    Field, FullTextIndex, SearchHit, SearchOptions, StoredFields, DEFAULT_LIMIT, MAX_LIMIT,
};
pub use route_matcher::{confidence, RouteMatch, RouteMatcher, DEFAULT_ROUTE_LIMIT};
pub use tokenizer::{Tokenizer, TokenizerConfig, ROUTE_STOP_WORDS};
