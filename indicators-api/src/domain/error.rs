use progress_core::EvaluationError;
use thiserror::Error;

/// Errors raised by the tracking services.
#[derive(Debug, Error)]
pub enum TrackingError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("{0} not found")]
    NotFound(String),
    #[error("no area assigned")]
    NoAreaAssigned,
    #[error("not allowed to access this {0}")]
    Forbidden(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl TrackingError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Errors raised while storing or handing out evidence files.
#[derive(Debug, Error)]
pub enum EvidenceError {
    #[error("evidence not found")]
    NotFound,
    #[error("invalid evidence path")]
    InvalidPath,
    #[error("not allowed to access this evidence")]
    Forbidden,
    #[error("evidence payload exceeds limit")]
    PayloadTooLarge,
    #[error("evidence file is empty")]
    EmptyPayload,
    #[error("no area assigned")]
    NoAreaAssigned,
    #[error("evidence upload failed: {0}")]
    Upload(String),
    #[error("evidence signing failed: {0}")]
    Signing(String),
}
