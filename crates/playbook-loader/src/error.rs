//! Loader error types.

use thiserror::Error;

/// Errors that can occur while ingesting a single source file.
///
/// None of these abort a corpus load: the offending file is skipped and the
/// error is kept in the load report.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File could not be read (missing, permissions, invalid UTF-8)
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Frontmatter block could not be decoded
    #[error("Invalid frontmatter in {path}: {message}")]
    Frontmatter { path: String, message: String },

    /// Directory traversal failed for an entry
    #[error("Failed to scan {path}: {message}")]
    Walk { path: String, message: String },
}
