//! Error types for the reveal engine and coordinator.

use thiserror::Error;

/// Errors surfaced by the reveal engine and its persisted state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RevealError {
    /// A layout pass ran with fewer than the two required panels.
    #[error("Reveal layout requires a main and a secondary panel, found {found}")]
    MissingPanels { found: usize },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RevealError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for reveal operations.
pub type RevealResult<T> = Result<T, RevealError>;
