//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No models configured for consensus")]
    NoModels,

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid priority: {0}")]
    InvalidPriority(String),
}
