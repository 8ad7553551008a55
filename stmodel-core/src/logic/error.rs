//! Core error taxonomy

use thiserror::Error;

use super::features::layout::LayoutMismatchError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Model or transforms not installed yet
    #[error("model not loaded")]
    NotReady,

    /// Caller contract violation (sequence shape, ordering, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Numeric failure during the forward pass
    #[error("inference failed: {0}")]
    Inference(String),

    #[error("artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),
}

impl CoreError {
    pub fn is_not_ready(&self) -> bool {
        matches!(self, CoreError::NotReady)
    }

    pub(crate) fn artifact(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        CoreError::Artifact {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
