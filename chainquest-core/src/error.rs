use std::convert::Infallible;

use thiserror::Error;

use crate::events::IngressError;
use crate::rules::RuleError;
use crate::store::StoreError;

/// Errors returned by the progression engine.
///
/// Nothing is retried internally; the caller decides how to report each
/// class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The input is malformed or contradicts current state.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The event id was already applied. Nothing was changed.
    #[error("event already applied: {0}")]
    Duplicate(String),

    /// The request is valid but the subject's state does not allow it.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Store(StoreError),
}

impl EngineError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEvent(id) => Self::Duplicate(id),
            StoreError::TournamentClosed(id) => {
                Self::Conflict(format!("tournament {id} is already completed"))
            }
            other => Self::Store(other),
        }
    }
}

impl From<IngressError> for EngineError {
    fn from(e: IngressError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<Infallible> for EngineError {
    fn from(e: Infallible) -> Self {
        match e {}
    }
}
