//! Scheduler handle: the only way callers reach the scheduling loop.

use crate::use_cases::execute_task::TaskError;
use autopilot_domain::{Task, TaskId, TaskRequest};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Admission-control errors; distinct from task failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Task queue is full")]
    QueueFull,

    #[error("Scheduler has stopped")]
    Stopped,

    #[error("Invalid task: {0}")]
    InvalidTask(String),
}

/// Result of an enqueue call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Admission {
    pub task: Task,
    /// True when an active task for the same issue was returned instead
    pub deduplicated: bool,
}

/// Messages processed by the scheduling loop
#[derive(Debug)]
pub(crate) enum Command {
    Enqueue {
        request: TaskRequest,
        reply: oneshot::Sender<Result<Admission, SchedulerError>>,
    },
    Status {
        id: TaskId,
        reply: oneshot::Sender<Option<Task>>,
    },
    List {
        reply: oneshot::Sender<Vec<Task>>,
    },
    AttemptFinished {
        id: TaskId,
        result: Result<(), TaskError>,
    },
    RetryDue {
        id: TaskId,
    },
    /// Stop admitting, let running attempts report, then exit
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running scheduler
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
}

impl SchedulerHandle {
    pub(crate) fn new(tx: mpsc::Sender<Command>) -> Self {
        Self { tx }
    }

    /// Admit a task; idempotent per issue while the issue's task is active.
    pub async fn enqueue(&self, request: TaskRequest) -> Result<Admission, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Enqueue { request, reply }).await?;
        rx.await.map_err(|_| SchedulerError::Stopped)?
    }

    pub async fn status(&self, id: &TaskId) -> Result<Option<Task>, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Status {
            id: id.clone(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| SchedulerError::Stopped)
    }

    pub async fn list(&self) -> Result<Vec<Task>, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::List { reply }).await?;
        rx.await.map_err(|_| SchedulerError::Stopped)
    }

    /// Drain and stop; resolves once running attempts have reported.
    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let (done, rx) = oneshot::channel();
        self.send(Command::Shutdown { done }).await?;
        rx.await.map_err(|_| SchedulerError::Stopped)
    }

    async fn send(&self, command: Command) -> Result<(), SchedulerError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SchedulerError::Stopped)
    }
}
