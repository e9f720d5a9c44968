//! Search error types.

use thiserror::Error;

/// Errors that can occur while building or querying an index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Query was empty after trimming
    #[error("Search query is required")]
    EmptyQuery,

    /// Two documents share a relative path
    #[error("Duplicate document id: {0}")]
    DuplicateDocument(String),

    /// Unexpected failure inside the index
    #[error("Search failed: {0}")]
    Internal(String),
}
