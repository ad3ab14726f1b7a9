//! Application layer for quorum-autopilot
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ConsensusSettings, SchedulerConfig};
pub use ports::{
    agent_runner::{AgentError, AgentRunner},
    config_source::{ConsensusConfigSource, StaticConfigSource},
    issue_tracker::{IssueTracker, NoIssueTracker},
    model_invoker::{InvokeError, ModelInvoker},
    progress::{ConsensusProgress, NoProgress},
    task_event_log::{NoTaskEventLog, TaskEvent, TaskEventLog},
};
pub use use_cases::execute_task::{ExecuteTaskUseCase, TaskError};
pub use use_cases::ingest_webhook::{IngestError, IngestOutcome, IngestWebhookUseCase};
pub use use_cases::run_consensus::{ConsensusError, RunConsensusInput, RunConsensusUseCase};
pub use use_cases::scheduler::{
    Admission, AttemptExecutor, SchedulerError, SchedulerHandle, SchedulerLoop,
};
