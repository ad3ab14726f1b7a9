//! Issue tracker adapters
//!
//! Ticket CRUD lives outside this service. [`LoggingIssueTracker`] reports
//! through `tracing`, and can also drop each consensus report as markdown
//! into a directory for a tracker integration to pick up.

use async_trait::async_trait;
use autopilot_application::IssueTracker;
use autopilot_domain::{ConsensusReport, Task};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
pub struct LoggingIssueTracker {
    report_dir: Option<PathBuf>,
}

impl LoggingIssueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write each report to `<dir>/<issue>-<attempt>-<mode>.md`
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    fn report_path(&self, task: &Task, report: &ConsensusReport) -> Option<PathBuf> {
        let dir = self.report_dir.as_ref()?;
        let issue: String = task
            .issue_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        Some(dir.join(format!(
            "{}-{}-{}.md",
            issue,
            task.attempt,
            report.mode().as_str()
        )))
    }
}

#[async_trait]
impl IssueTracker for LoggingIssueTracker {
    async fn publish_report(&self, task: &Task, report: &ConsensusReport) {
        info!(
            "[{}] {} for task {}: {}",
            task.issue_id,
            report.mode().display_name(),
            task.id,
            report.verdict()
        );
        debug!("{}", report.summary());

        let Some(path) = self.report_path(task, report) else {
            return;
        };
        if let Some(parent) = path.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            warn!("Could not create report directory {}: {}", parent.display(), e);
            return;
        }
        if let Err(e) = tokio::fs::write(&path, report.summary()).await {
            warn!("Could not write report {}: {}", path.display(), e);
        }
    }

    async fn task_completed(&self, task: &Task) {
        info!(
            "[{}] Task {} completed after {} attempt(s)",
            task.issue_id, task.id, task.attempt
        );
    }

    async fn task_failed(&self, task: &Task, reason: &str) {
        error!("[{}] Task {} failed: {}", task.issue_id, task.id, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopilot_domain::{
        ApprovalThreshold, ConsensusMode, ModelVerdict, TaskRequest, Verdict,
    };

    fn report() -> ConsensusReport {
        ConsensusReport::new(
            ConsensusMode::Review,
            "Review ISS-9",
            vec![
                ModelVerdict::new("claude", Verdict::Approve),
                ModelVerdict::new("codex", Verdict::Approve),
            ],
            ApprovalThreshold::Majority,
        )
    }

    #[tokio::test]
    async fn test_report_written_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = LoggingIssueTracker::new().with_report_dir(dir.path());
        let mut task = Task::from_request(TaskRequest::new("ISS/9", "t"), 3, 0);
        task.mark_running(0);

        tracker.publish_report(&task, &report()).await;

        let written = std::fs::read_to_string(dir.path().join("ISS_9-1-review.md")).unwrap();
        assert!(written.contains("## Review Consensus: APPROVED"));
    }

    #[tokio::test]
    async fn test_without_dir_only_logs() {
        let tracker = LoggingIssueTracker::new();
        let task = Task::from_request(TaskRequest::new("ISS-9", "t"), 3, 0);
        tracker.publish_report(&task, &report()).await;
        tracker.task_failed(&task, "Exhausted 3 attempts").await;
        assert!(tracker.report_path(&task, &report()).is_none());
    }
}
