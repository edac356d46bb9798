//! Engine error taxonomy
//!
//! Single-record operations surface these directly; bulk operations fold them
//! into the `failed` list of a [`BulkResult`](super::bulk::BulkResult).

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("lead {0} is locked")]
    LeadLocked(Uuid),

    #[error("lead {0} is already converted")]
    AlreadyConverted(Uuid),

    #[error("no deduplication criteria selected")]
    NoCriteriaSelected,

    #[error("storage error: {0}")]
    Storage(String),
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code, also used as the bulk failure reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::LeadLocked(_) => "LEAD_LOCKED",
            Self::AlreadyConverted(_) => "ALREADY_CONVERTED",
            Self::NoCriteriaSelected => "NO_CRITERIA_SELECTED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
