use crate::model::TransactionState;
use crate::types::Level;
use crate::validate::ValidationReport;
use thiserror::Error;

/// Backend-layer error type.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Crate result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Backend or transport error wrapper.
    #[error("backend error: {0}")]
    Backend(#[source] BackendError),
    /// Invalid identifier input.
    #[error("invalid id: {0}")]
    InvalidId(String),
    /// Caller level is insufficient for the requested operation.
    #[error("operation requires {required} level but caller is {level}")]
    NotAuthorized { required: Level, level: Level },
    /// Login failed; the session level is unchanged.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// One or more form fields failed client-side validation; the backend
    /// call was never issued.
    #[error("validation failed: {0}")]
    Validation(ValidationReport),
    /// The transaction's lifecycle state does not allow the requested action.
    #[error("transaction is {state}; action not available")]
    UnavailableAction { state: TransactionState },
}

impl From<BackendError> for Error {
    fn from(error: BackendError) -> Self {
        Self::Backend(error)
    }
}
