//! Task domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Unique identifier for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a new random TaskId.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for TaskId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scheduling priority of a task.
///
/// Ordering follows urgency: `Low < Normal < High < Urgent`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Map the issue tracker's numeric scale onto a priority.
    ///
    /// `1` urgent, `2` high, `3` normal, `4` low; `0` (no priority) and
    /// anything unknown fall back to normal.
    pub fn from_tracker_level(level: i64) -> Self {
        match level {
            1 => Priority::Urgent,
            2 => Priority::High,
            4 => Priority::Low,
            _ => Priority::Normal,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" | "medium" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(DomainError::InvalidPriority(other.to_string())),
        }
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Waiting to be admitted (initially or between retries)
    #[default]
    Pending,
    /// An attempt is in flight
    Running,
    /// Finished successfully
    Completed,
    /// Retries exhausted
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Pending or running tasks count against the queue size.
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admission request for a new task.
///
/// Submitted by the webhook path or by an operator through the task API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    pub issue_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl TaskRequest {
    pub fn new(issue_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            issue_id: issue_id.into(),
            title: title.into(),
            description: String::new(),
            tags: Vec::new(),
            priority: Priority::Normal,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.issue_id.trim().is_empty() {
            return Err(DomainError::InvalidTask("issueId is empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidTask("title is empty".to_string()));
        }
        Ok(())
    }
}

/// A unit of externally triggered work.
///
/// Only the scheduler mutates a task; tasks are never deleted, only marked
/// terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub issue_id: String,
    pub title: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub priority: Priority,
    pub status: TaskStatus,
    /// Number of attempts started so far
    pub attempt: u32,
    pub max_attempts: u32,
    /// Human-readable reason, set only once the task has failed terminally
    pub error: Option<String>,
    /// Epoch milliseconds
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    pub fn from_request(request: TaskRequest, max_attempts: u32, now_millis: i64) -> Self {
        Self {
            id: TaskId::generate(),
            issue_id: request.issue_id,
            title: request.title,
            description: request.description,
            tags: request.tags.into_iter().collect(),
            priority: request.priority,
            status: TaskStatus::Pending,
            attempt: 0,
            max_attempts: max_attempts.max(1),
            error: None,
            created_at: now_millis,
            updated_at: now_millis,
        }
    }

    /// `pending -> running`; starts a new attempt.
    pub fn mark_running(&mut self, now_millis: i64) {
        self.status = TaskStatus::Running;
        self.attempt += 1;
        self.updated_at = now_millis;
    }

    /// `running -> pending` ahead of a retry.
    pub fn mark_retry_pending(&mut self, now_millis: i64) {
        self.status = TaskStatus::Pending;
        self.updated_at = now_millis;
    }

    pub fn mark_completed(&mut self, now_millis: i64) {
        self.status = TaskStatus::Completed;
        self.error = None;
        self.updated_at = now_millis;
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>, now_millis: i64) {
        self.status = TaskStatus::Failed;
        self.error = Some(reason.into());
        self.updated_at = now_millis;
    }

    /// Whether another attempt may follow the one that just ended.
    pub fn can_retry(&self) -> bool {
        self.attempt < self.max_attempts
    }
}
