//! Domain layer for quorum-autopilot
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Task**: a unit of work admitted from the issue tracker, executed by an
//!   agent session and retried up to a bounded number of attempts
//! - **Webhook boundary**: signature, freshness, and replay checks that every
//!   inbound trigger passes before it becomes a Task
//! - **Quorum Consensus**: independent model verdicts aggregated under an
//!   approval threshold, used as the plan gate and the review gate

pub mod core;
pub mod prompt;
pub mod quorum;
pub mod task;
pub mod webhook;

// Re-export commonly used types
pub use core::{
    clock::{Clock, ManualClock, SystemClock},
    error::DomainError,
    model::{Model, ModelFamily},
    validation::{ConfigIssue, Severity},
};
pub use prompt::PromptTemplate;
pub use quorum::{
    ApprovalThreshold, ConsensusMode, ConsensusReport, ConsensusVerdict, ModelVerdict, Verdict,
    parse_verdict,
};
pub use task::{
    Priority, Session, SessionStatus, Task, TaskId, TaskRequest, TaskStatus, TranscriptEntry,
    TranscriptRole,
};
pub use webhook::{WebhookError, WebhookPayload, WebhookVerifier};
