//! Model invoker port
//!
//! Defines how the consensus engine asks a single model a question. The
//! engine never depends on process-spawning details.

use async_trait::async_trait;
use autopilot_domain::Model;
use thiserror::Error;

/// Errors from invoking one model.
///
/// These are isolated per model: the round records them on the model's vote
/// and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Failed to launch {model}: {reason}")]
    Spawn { model: String, reason: String },

    #[error("{model} timed out after {secs}s")]
    Timeout { model: String, secs: u64 },

    #[error("{model} exited with status {code}: {stderr}")]
    NonZeroExit {
        model: String,
        code: i32,
        stderr: String,
    },

    #[error("{model} returned an empty response")]
    EmptyOutput { model: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// Invoker for a single model
///
/// Implementations (adapters) live in the infrastructure layer. Dropping the
/// returned future must terminate any underlying process.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send `prompt` to `model` and return its raw text response
    async fn invoke(&self, model: &Model, prompt: &str) -> Result<String, InvokeError>;

    /// Whether the model can be invoked at all on this host
    fn is_available(&self, _model: &Model) -> bool {
        true
    }
}
