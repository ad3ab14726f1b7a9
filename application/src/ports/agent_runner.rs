//! Agent runner port
//!
//! The agent session is the external collaborator that actually performs a
//! task. The scheduler only sees the resulting [`Session`].

use async_trait::async_trait;
use autopilot_domain::{Session, Task};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Failed to launch agent: {0}")]
    Spawn(String),

    #[error("Agent IO error: {0}")]
    Io(String),
}

/// Runs one agent session for one attempt of a task
#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Drive a session to completion.
    ///
    /// Returns a terminal [`Session`]: `Completed`, or `Failed` with an error
    /// for a non-zero exit or a timeout. `Err` is reserved for failures to
    /// start the session at all.
    async fn run(&self, task: &Task, prompt: &str) -> Result<Session, AgentError>;
}
