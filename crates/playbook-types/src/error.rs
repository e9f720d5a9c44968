//! Error types shared across the playbook crates.

use thiserror::Error;

/// Base error type for configuration and shared types.
#[derive(Debug, Error)]
pub enum PlaybookError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
