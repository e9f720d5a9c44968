//! Service error types.

use thiserror::Error;

use playbook_search::SearchError;

/// Errors returned by the query operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Empty or missing required input
    #[error("{0}")]
    Validation(String),

    /// Unknown playbook path
    #[error("{0}")]
    NotFound(String),

    /// Requested path would escape the corpus root
    #[error("{0}")]
    Security(String),

    /// Unexpected failure while building or querying
    #[error("{0}")]
    System(String),
}

impl ServiceError {
    /// Stable tag for the protocol layer.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Security(_) => "security_error",
            ServiceError::System(_) => "system_error",
        }
    }
}

impl From<SearchError> for ServiceError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyQuery => ServiceError::Validation(err.to_string()),
            other => ServiceError::System(other.to_string()),
        }
    }
}
