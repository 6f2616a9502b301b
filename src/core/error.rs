//! Engine error types.
//!
//! Stale, duplicate and out-of-turn intents are not errors: they come back
//! as `Transition::Ignored`. Only failures the caller can act on (retry a
//! write, fix the start input) surface here.

use thiserror::Error;

use crate::cards::DealError;

/// Shared store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store rejected write: {0}")]
    Rejected(String),

    #[error("store write timed out")]
    Timeout,

    #[error("invalid store path `{0}`")]
    InvalidPath(String),
}

/// Errors surfaced by orchestrator intents.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Synchronization failure. Safe to retry from the latest snapshot.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot start match: {0}")]
    Deal(#[from] DealError),

    #[error("unknown deck `{0}`")]
    UnknownDeck(String),

    #[error("malformed match record: {0}")]
    Decode(#[from] serde_json::Error),
}

impl EngineError {
    /// Whether the invoking human should be offered a retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Store(_))
    }
}
