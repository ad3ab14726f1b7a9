//! Issue tracker port
//!
//! Outward reporting of consensus reports and task outcomes. Reporting is
//! fire-and-forget: a tracker failure never changes a task's state.

use async_trait::async_trait;
use autopilot_domain::{ConsensusReport, Task};

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Publish a rendered consensus report on the task's issue
    async fn publish_report(&self, task: &Task, report: &ConsensusReport);

    async fn task_completed(&self, task: &Task);

    /// Terminal failure after retries were exhausted
    async fn task_failed(&self, task: &Task, reason: &str);
}

/// No-op tracker for tests and the one-shot CLI
pub struct NoIssueTracker;

#[async_trait]
impl IssueTracker for NoIssueTracker {
    async fn publish_report(&self, _task: &Task, _report: &ConsensusReport) {}
    async fn task_completed(&self, _task: &Task) {}
    async fn task_failed(&self, _task: &Task, _reason: &str) {}
}
