//! The single scheduling loop.
//!
//! Event-driven: every admission, attempt completion and retry timer posts a
//! [`Command`], and eligibility is re-evaluated after each one.

use super::AttemptExecutor;
use super::board::{AttemptOutcome, TaskBoard};
use super::handle::{Command, SchedulerError, SchedulerHandle};
use crate::config::SchedulerConfig;
use crate::ports::issue_tracker::{IssueTracker, NoIssueTracker};
use crate::ports::task_event_log::{NoTaskEventLog, TaskEvent, TaskEventLog};
use crate::use_cases::execute_task::TaskError;
use autopilot_domain::{Clock, Task};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const COMMAND_BUFFER: usize = 256;

pub struct SchedulerLoop {
    board: TaskBoard,
    config: SchedulerConfig,
    rx: mpsc::Receiver<Command>,
    /// Posted to by attempt and retry-timer tasks. Weak, so the loop ends
    /// once every [`SchedulerHandle`] is gone.
    tx: mpsc::WeakSender<Command>,
    executor: Arc<dyn AttemptExecutor>,
    tracker: Arc<dyn IssueTracker>,
    event_log: Arc<dyn TaskEventLog>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
    draining: bool,
    shutdown_waiters: Vec<oneshot::Sender<()>>,
}

impl SchedulerLoop {
    pub fn new(
        config: SchedulerConfig,
        executor: Arc<dyn AttemptExecutor>,
        clock: Arc<dyn Clock>,
        cancel: CancellationToken,
    ) -> (Self, SchedulerHandle) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let weak = tx.downgrade();
        let handle = SchedulerHandle::new(tx);
        let scheduler = Self {
            board: TaskBoard::new(config.clone()),
            config,
            rx,
            tx: weak,
            executor,
            tracker: Arc::new(NoIssueTracker),
            event_log: Arc::new(NoTaskEventLog),
            clock,
            cancel,
            draining: false,
            shutdown_waiters: Vec::new(),
        };
        (scheduler, handle)
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn IssueTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    pub fn with_event_log(mut self, event_log: Arc<dyn TaskEventLog>) -> Self {
        self.event_log = event_log;
        self
    }

    /// Run the loop on its own task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(mut self) {
        info!(
            "Scheduler started (max_concurrent={}, max_queue_size={}, max_attempts={}, retry_delay={:?})",
            self.config.max_concurrent,
            self.config.max_queue_size,
            self.config.max_attempts,
            self.config.retry_delay
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled(), if !self.draining => self.begin_drain(),
                command = self.rx.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
            }

            if self.draining {
                if self.board.running_count() == 0 {
                    break;
                }
            } else {
                self.dispatch();
            }
        }

        for done in self.shutdown_waiters.drain(..) {
            let _ = done.send(());
        }
        info!("Scheduler stopped");
    }

    fn handle(&mut self, command: Command) {
        let now = self.clock.now_millis();
        match command {
            Command::Enqueue { request, reply } => {
                let result = if self.draining {
                    Err(SchedulerError::Stopped)
                } else {
                    self.board.admit(request, now)
                };
                match &result {
                    Ok(admission) if admission.deduplicated => {
                        debug!(
                            "Issue {} already active as task {}",
                            admission.task.issue_id, admission.task.id
                        );
                    }
                    Ok(admission) => {
                        info!(
                            "Task {} admitted for issue {} ({})",
                            admission.task.id, admission.task.issue_id, admission.task.priority
                        );
                        self.record("task_admitted", &admission.task, json!({}));
                    }
                    Err(e) => warn!("Admission refused: {}", e),
                }
                let _ = reply.send(result);
            }
            Command::Status { id, reply } => {
                let _ = reply.send(self.board.get(&id).cloned());
            }
            Command::List { reply } => {
                let _ = reply.send(self.board.list());
            }
            Command::AttemptFinished { id, result } => match self.board.finish(&id, result, now) {
                Some(outcome) => self.on_attempt_finished(&id, outcome),
                None => warn!("Attempt finished for unknown task {}", id),
            },
            Command::RetryDue { id } => {
                if self.board.retry_due(&id) {
                    debug!("Task {} eligible again", id);
                }
            }
            Command::Shutdown { done } => {
                self.shutdown_waiters.push(done);
                self.begin_drain();
            }
        }
    }

    fn on_attempt_finished(&mut self, id: &autopilot_domain::TaskId, outcome: AttemptOutcome) {
        let Some(task) = self.board.get(id).cloned() else {
            return;
        };

        match outcome {
            AttemptOutcome::Completed => {
                info!("Task {} completed on attempt {}", task.id, task.attempt);
                self.record("task_completed", &task, json!({}));
                let tracker = Arc::clone(&self.tracker);
                tokio::spawn(async move { tracker.task_completed(&task).await });
            }
            AttemptOutcome::RetryScheduled { attempt, error } => {
                warn!(
                    "Task {} attempt {}/{} failed: {}; retrying in {:?}",
                    task.id, attempt, task.max_attempts, error, self.config.retry_delay
                );
                self.record(
                    "retry_scheduled",
                    &task,
                    json!({ "error": error.to_string(), "delay_ms": self.config.retry_delay.as_millis() as u64 }),
                );
                let tx = self.tx.clone();
                let delay = self.config.retry_delay;
                let id = task.id.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(tx) = tx.upgrade() {
                        let _ = tx.send(Command::RetryDue { id }).await;
                    }
                });
            }
            AttemptOutcome::Failed { reason } => {
                error!("Task {} failed: {}", task.id, reason);
                self.record("task_failed", &task, json!({ "reason": reason }));
                let tracker = Arc::clone(&self.tracker);
                tokio::spawn(async move { tracker.task_failed(&task, &reason).await });
            }
        }
    }

    /// Start as many eligible tasks as there are free slots
    fn dispatch(&mut self) {
        while let Some(task) = self.board.start_next(self.clock.now_millis()) {
            info!(
                "Task {} started attempt {}/{}",
                task.id, task.attempt, task.max_attempts
            );
            self.record("task_started", &task, json!({}));

            let executor = Arc::clone(&self.executor);
            let tx = self.tx.clone();
            let id = task.id.clone();
            tokio::spawn(async move {
                // a panicking attempt still has to report back
                let attempt = tokio::spawn(async move { executor.execute(task).await });
                let result = match attempt.await {
                    Ok(result) => result,
                    Err(e) => Err(TaskError::TaskExecutionError(format!(
                        "attempt aborted: {}",
                        e
                    ))),
                };
                if let Some(tx) = tx.upgrade() {
                    let _ = tx.send(Command::AttemptFinished { id, result }).await;
                }
            });
        }
    }

    fn begin_drain(&mut self) {
        if !self.draining {
            info!(
                "Scheduler draining; waiting for {} running attempts",
                self.board.running_count()
            );
            self.draining = true;
        }
    }

    fn record(&self, event_type: &'static str, task: &Task, extra: serde_json::Value) {
        let mut payload = json!({
            "task_id": task.id.as_str(),
            "issue_id": task.issue_id,
            "status": task.status.as_str(),
            "attempt": task.attempt,
        });
        if let (Some(map), serde_json::Value::Object(extra)) = (payload.as_object_mut(), extra) {
            map.extend(extra);
        }
        self.event_log.record(TaskEvent::new(event_type, payload));
    }
}
