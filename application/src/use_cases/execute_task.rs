//! Execute Task use case.
//!
//! Runs one attempt of a task through the gated pipeline:
//!
//! ```text
//! plan gate ──approved──▶ agent session ──completed──▶ review gate ──approved──▶ Ok
//!     │                        │                            │
//!     └─ rejected / split / inconclusive / failed ──────────┴──▶ TaskError
//! ```
//!
//! This use case never decides about retries; the scheduling loop does that
//! from the returned [`TaskError`].

use crate::ports::agent_runner::AgentRunner;
use crate::ports::config_source::ConsensusConfigSource;
use crate::ports::issue_tracker::IssueTracker;
use crate::ports::model_invoker::ModelInvoker;
use crate::ports::task_event_log::{TaskEvent, TaskEventLog};
use crate::use_cases::run_consensus::{ConsensusError, RunConsensusInput, RunConsensusUseCase};
use crate::use_cases::scheduler::AttemptExecutor;
use async_trait::async_trait;
use autopilot_domain::{
    ConsensusMode, ConsensusReport, ConsensusVerdict, PromptTemplate, SessionStatus, Task,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Why an attempt did not complete
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskError {
    /// The agent session failed or could not start (retryable)
    #[error("Task execution failed: {0}")]
    TaskExecutionError(String),

    /// A gate returned REJECTED or SPLIT (retryable)
    #[error("{mode} consensus returned {verdict}")]
    ConsensusRejected {
        mode: ConsensusMode,
        verdict: ConsensusVerdict,
    },

    /// Fewer than two valid votes; handled like a rejection (retryable)
    #[error("{mode} consensus inconclusive: {rationale}")]
    ConsensusInconclusive {
        mode: ConsensusMode,
        rationale: String,
    },

    /// Terminal: every attempt was used
    #[error("Exhausted {attempts} attempts; last error: {last_error}")]
    TaskExhausted { attempts: u32, last_error: String },
}

impl TaskError {
    fn from_gate(report: &ConsensusReport) -> Self {
        match report.verdict() {
            ConsensusVerdict::Inconclusive => TaskError::ConsensusInconclusive {
                mode: report.mode(),
                rationale: report.rationale(),
            },
            verdict => TaskError::ConsensusRejected {
                mode: report.mode(),
                verdict,
            },
        }
    }
}

/// Use case for executing one attempt of a task.
pub struct ExecuteTaskUseCase<I: ModelInvoker + 'static> {
    consensus: RunConsensusUseCase<I>,
    agent: Arc<dyn AgentRunner>,
    tracker: Arc<dyn IssueTracker>,
    config: Arc<dyn ConsensusConfigSource>,
    event_log: Arc<dyn TaskEventLog>,
}

impl<I: ModelInvoker + 'static> ExecuteTaskUseCase<I> {
    pub fn new(
        invoker: Arc<I>,
        agent: Arc<dyn AgentRunner>,
        tracker: Arc<dyn IssueTracker>,
        config: Arc<dyn ConsensusConfigSource>,
        event_log: Arc<dyn TaskEventLog>,
    ) -> Self {
        Self {
            consensus: RunConsensusUseCase::new(invoker),
            agent,
            tracker,
            config,
            event_log,
        }
    }

    /// Run one attempt: plan gate, agent session, review gate.
    pub async fn run_attempt(&self, task: &Task) -> Result<(), TaskError> {
        let plan = self
            .gate(task, ConsensusMode::Plan, PromptTemplate::plan_question(task))
            .await?;

        let prompt = PromptTemplate::agent_prompt(task, plan.as_ref());
        let session = self
            .agent
            .run(task, &prompt)
            .await
            .map_err(|e| TaskError::TaskExecutionError(e.to_string()))?;

        info!(
            "Task {} attempt {}: session {:?} with {} tool calls",
            task.id, task.attempt, session.status, session.tool_call_count
        );
        self.event_log.record(TaskEvent::new(
            "session_finished",
            json!({
                "task_id": task.id.as_str(),
                "attempt": task.attempt,
                "status": format!("{:?}", session.status).to_lowercase(),
                "tool_calls": session.tool_call_count,
                "error": session.error,
            }),
        ));

        if session.status != SessionStatus::Completed {
            let reason = session
                .error
                .clone()
                .unwrap_or_else(|| "agent session did not complete".to_string());
            return Err(TaskError::TaskExecutionError(reason));
        }

        self.gate(
            task,
            ConsensusMode::Review,
            PromptTemplate::review_question(task, &session),
        )
        .await?;
        Ok(())
    }

    /// Run a gate if it is active; `Ok(None)` means it was skipped.
    async fn gate(
        &self,
        task: &Task,
        mode: ConsensusMode,
        question: String,
    ) -> Result<Option<ConsensusReport>, TaskError> {
        let settings = self.config.consensus_settings();
        if !settings.gate_active(mode) {
            info!("Task {}: {} skipped", task.id, mode.display_name());
            return Ok(None);
        }

        let input = RunConsensusInput::new(mode, question, &settings);
        let report = match self.consensus.execute(input).await {
            Ok(report) => report,
            Err(ConsensusError::NoModels) => {
                warn!("Task {}: no consensus models, gate approves", task.id);
                return Ok(None);
            }
        };

        self.event_log.record(TaskEvent::new(
            "consensus_finished",
            json!({
                "task_id": task.id.as_str(),
                "attempt": task.attempt,
                "mode": mode.as_str(),
                "verdict": report.verdict().label(),
                "approval_percent": report.approval_percent(),
                "valid_votes": report.tally().valid_count,
            }),
        ));
        self.tracker.publish_report(task, &report).await;

        if report.is_approved() {
            Ok(Some(report))
        } else {
            warn!(
                "Task {} attempt {}: {} {} ({})",
                task.id,
                task.attempt,
                mode.display_name(),
                report.verdict(),
                report.rationale()
            );
            Err(TaskError::from_gate(&report))
        }
    }
}

#[async_trait]
impl<I: ModelInvoker + 'static> AttemptExecutor for ExecuteTaskUseCase<I> {
    async fn execute(&self, task: Task) -> Result<(), TaskError> {
        self.run_attempt(&task).await
    }
}
