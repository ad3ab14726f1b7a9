//! Task queue and scheduler
//!
//! One [`SchedulerLoop`] owns all task state; callers talk to it through a
//! cloneable [`SchedulerHandle`].
//!
//! ```text
//!  SchedulerHandle ──Enqueue/Status/List/Shutdown──▶ ┌──────────────┐
//!                                                    │ SchedulerLoop│──start_next──▶ AttemptExecutor (≤ max_concurrent)
//!  attempt task ─────────AttemptFinished───────────▶ │  TaskBoard   │
//!  retry timer ──────────RetryDue──────────────────▶ └──────────────┘
//! ```

mod board;
mod event_loop;
mod handle;

use crate::use_cases::execute_task::TaskError;
use async_trait::async_trait;
use autopilot_domain::Task;

pub use board::{AttemptOutcome, TaskBoard};
pub use event_loop::SchedulerLoop;
pub use handle::{Admission, SchedulerError, SchedulerHandle};

/// Runs a single attempt of a task
///
/// The loop passes a snapshot of the task already marked `running`, with
/// `attempt` counting this attempt.
#[async_trait]
pub trait AttemptExecutor: Send + Sync {
    async fn execute(&self, task: Task) -> Result<(), TaskError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::ports::issue_tracker::IssueTracker;
    use crate::ports::task_event_log::{TaskEvent, TaskEventLog};
    use autopilot_domain::{
        ConsensusReport, ManualClock, Priority, TaskId, TaskRequest, TaskStatus,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::sync::Semaphore;
    use tokio::time::Instant;
    use tokio_util::sync::CancellationToken;

    // ==================== Test Mocks ====================

    /// Attempts for gated issues block until released; scripted issues fail
    /// a fixed number of times.
    struct GatedExecutor {
        gates: HashMap<String, Arc<Semaphore>>,
        failures: Mutex<HashMap<String, u32>>,
        started: Mutex<Vec<(String, u32, Instant)>>,
    }

    impl GatedExecutor {
        fn new() -> Self {
            Self {
                gates: HashMap::new(),
                failures: Mutex::new(HashMap::new()),
                started: Mutex::new(Vec::new()),
            }
        }

        fn gate(mut self, issue: &str) -> Self {
            self.gates
                .insert(issue.to_string(), Arc::new(Semaphore::new(0)));
            self
        }

        fn failing(self, issue: &str, times: u32) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert(issue.to_string(), times);
            self
        }

        fn release(&self, issue: &str) {
            self.gates[issue].add_permits(1);
        }

        fn started(&self) -> Vec<(String, u32)> {
            self.started
                .lock()
                .unwrap()
                .iter()
                .map(|(issue, attempt, _)| (issue.clone(), *attempt))
                .collect()
        }
    }

    #[async_trait]
    impl AttemptExecutor for GatedExecutor {
        async fn execute(&self, task: Task) -> Result<(), TaskError> {
            self.started
                .lock()
                .unwrap()
                .push((task.issue_id.clone(), task.attempt, Instant::now()));
            if let Some(gate) = self.gates.get(&task.issue_id) {
                gate.acquire().await.unwrap().forget();
            }
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(&task.issue_id) {
                Some(n) if *n > 0 => {
                    *n -= 1;
                    Err(TaskError::TaskExecutionError("scripted failure".to_string()))
                }
                _ => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingLog {
        events: Mutex<Vec<&'static str>>,
    }

    impl TaskEventLog for RecordingLog {
        fn record(&self, event: TaskEvent) {
            self.events.lock().unwrap().push(event.event_type);
        }
    }

    #[derive(Default)]
    struct RecordingTracker {
        failed: Mutex<Vec<(String, String)>>,
        completed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IssueTracker for RecordingTracker {
        async fn publish_report(&self, _task: &Task, _report: &ConsensusReport) {}

        async fn task_completed(&self, task: &Task) {
            self.completed.lock().unwrap().push(task.issue_id.clone());
        }

        async fn task_failed(&self, task: &Task, reason: &str) {
            self.failed
                .lock()
                .unwrap()
                .push((task.issue_id.clone(), reason.to_string()));
        }
    }

    struct Harness {
        handle: SchedulerHandle,
        executor: Arc<GatedExecutor>,
        log: Arc<RecordingLog>,
        tracker: Arc<RecordingTracker>,
        cancel: CancellationToken,
        join: tokio::task::JoinHandle<()>,
    }

    fn start(config: SchedulerConfig, executor: GatedExecutor) -> Harness {
        let executor = Arc::new(executor);
        let log = Arc::new(RecordingLog::default());
        let tracker = Arc::new(RecordingTracker::default());
        let cancel = CancellationToken::new();
        let (scheduler, handle) = SchedulerLoop::new(
            config,
            Arc::clone(&executor) as Arc<dyn AttemptExecutor>,
            Arc::new(ManualClock::new(0)),
            cancel.clone(),
        );
        let join = scheduler
            .with_event_log(Arc::clone(&log) as Arc<dyn TaskEventLog>)
            .with_tracker(Arc::clone(&tracker) as Arc<dyn IssueTracker>)
            .spawn();
        Harness {
            handle,
            executor,
            log,
            tracker,
            cancel,
            join,
        }
    }

    fn request(issue: &str) -> TaskRequest {
        TaskRequest::new(issue, format!("Work on {}", issue))
    }

    async fn status(handle: &SchedulerHandle, id: &TaskId) -> TaskStatus {
        handle.status(id).await.unwrap().unwrap().status
    }

    /// Poll (in virtual time) until the task reaches `expected`
    async fn wait_for(handle: &SchedulerHandle, id: &TaskId, expected: TaskStatus) -> Task {
        for _ in 0..10_000 {
            let task = handle.status(id).await.unwrap().unwrap();
            if task.status == expected {
                return task;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("task {} never reached {:?}", id, expected);
    }

    // ==================== Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_two_slots_three_tasks() {
        let h = start(
            SchedulerConfig::default().with_max_concurrent(2),
            GatedExecutor::new().gate("A").gate("B").gate("C"),
        );

        let a = h.handle.enqueue(request("A")).await.unwrap().task.id;
        let b = h.handle.enqueue(request("B")).await.unwrap().task.id;
        let c = h.handle.enqueue(request("C")).await.unwrap().task.id;

        assert_eq!(status(&h.handle, &a).await, TaskStatus::Running);
        assert_eq!(status(&h.handle, &b).await, TaskStatus::Running);
        assert_eq!(status(&h.handle, &c).await, TaskStatus::Pending);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(status(&h.handle, &c).await, TaskStatus::Pending);

        h.executor.release("A");
        wait_for(&h.handle, &a, TaskStatus::Completed).await;
        assert_eq!(status(&h.handle, &c).await, TaskStatus::Running);
        assert_eq!(status(&h.handle, &b).await, TaskStatus::Running);

        assert_eq!(
            h.executor.started(),
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 1),
                ("C".to_string(), 1)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_every_attempt_exactly_three_cycles() {
        let h = start(
            SchedulerConfig::default()
                .with_max_attempts(3)
                .with_retry_delay(Duration::from_secs(30)),
            GatedExecutor::new().failing("A", u32::MAX),
        );

        let id = h.handle.enqueue(request("A")).await.unwrap().task.id;
        let task = wait_for(&h.handle, &id, TaskStatus::Failed).await;

        assert_eq!(task.attempt, 3);
        assert!(task.error.as_deref().unwrap().contains("Exhausted 3 attempts"));
        assert_eq!(
            *h.log.events.lock().unwrap(),
            vec![
                "task_admitted",
                "task_started",
                "retry_scheduled",
                "task_started",
                "retry_scheduled",
                "task_started",
                "task_failed"
            ]
        );

        // no further attempts are started after the terminal failure
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(h.executor.started().len(), 3);

        let failed = h.tracker.failed.lock().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, "A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_waits_fixed_delay() {
        let h = start(
            SchedulerConfig::default().with_retry_delay(Duration::from_secs(30)),
            GatedExecutor::new().failing("A", 1),
        );

        let id = h.handle.enqueue(request("A")).await.unwrap().task.id;
        let task = wait_for(&h.handle, &id, TaskStatus::Completed).await;
        assert_eq!(task.attempt, 2);
        assert!(task.error.is_none());

        let started = h.executor.started.lock().unwrap();
        let gap = started[1].2 - started[0].2;
        assert!(gap >= Duration::from_secs(30));
        assert!(gap < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_hidden_while_retrying() {
        let h = start(
            SchedulerConfig::default().with_retry_delay(Duration::from_secs(30)),
            GatedExecutor::new().failing("A", 1),
        );

        let id = h.handle.enqueue(request("A")).await.unwrap().task.id;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let task = h.handle.status(&id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.attempt, 1);
        assert!(task.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_issue_is_noop() {
        let h = start(
            SchedulerConfig::default().with_max_concurrent(1),
            GatedExecutor::new().gate("A").gate("B"),
        );

        h.handle.enqueue(request("A")).await.unwrap();
        let first = h.handle.enqueue(request("B")).await.unwrap();
        let again = h.handle.enqueue(request("B")).await.unwrap();

        assert!(!first.deduplicated);
        assert!(again.deduplicated);
        assert_eq!(again.task.id, first.task.id);
        assert_eq!(h.handle.list().await.unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_full_is_admission_error() {
        let h = start(
            SchedulerConfig::default().with_max_queue_size(1),
            GatedExecutor::new().gate("A"),
        );

        h.handle.enqueue(request("A")).await.unwrap();
        let err = h.handle.enqueue(request("B")).await.unwrap_err();
        assert_eq!(err, SchedulerError::QueueFull);
        assert_eq!(h.handle.list().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_priority_dispatch_order() {
        let h = start(
            SchedulerConfig::default().with_max_concurrent(1),
            GatedExecutor::new().gate("blocker"),
        );

        let blocker = h.handle.enqueue(request("blocker")).await.unwrap().task.id;
        h.handle
            .enqueue(request("low").with_priority(Priority::Low))
            .await
            .unwrap();
        h.handle.enqueue(request("normal")).await.unwrap();
        let last = h
            .handle
            .enqueue(request("urgent").with_priority(Priority::Urgent))
            .await
            .unwrap()
            .task
            .id;

        h.executor.release("blocker");
        wait_for(&h.handle, &blocker, TaskStatus::Completed).await;
        wait_for(&h.handle, &last, TaskStatus::Completed).await;
        let low = h.handle.list().await.unwrap()[1].id.clone();
        wait_for(&h.handle, &low, TaskStatus::Completed).await;

        let order: Vec<String> = h.executor.started().into_iter().map(|(i, _)| i).collect();
        assert_eq!(order, vec!["blocker", "urgent", "normal", "low"]);
        assert_eq!(h.tracker.completed.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drains_running_attempts() {
        let h = start(SchedulerConfig::default(), GatedExecutor::new().gate("A"));
        let id = h.handle.enqueue(request("A")).await.unwrap().task.id;

        let handle = h.handle.clone();
        let shutdown = tokio::spawn(async move { handle.shutdown().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let err = h.handle.enqueue(request("B")).await.unwrap_err();
        assert_eq!(err, SchedulerError::Stopped);
        assert_eq!(status(&h.handle, &id).await, TaskStatus::Running);
        assert!(!shutdown.is_finished());

        h.executor.release("A");
        shutdown.await.unwrap().unwrap();
        h.join.await.unwrap();
        assert_eq!(
            h.handle.list().await.unwrap_err(),
            SchedulerError::Stopped
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_idle_loop() {
        let h = start(SchedulerConfig::default(), GatedExecutor::new());
        h.cancel.cancel();
        h.join.await.unwrap();
        assert_eq!(
            h.handle.enqueue(request("A")).await.unwrap_err(),
            SchedulerError::Stopped
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_ends_when_every_handle_is_dropped() {
        let h = start(SchedulerConfig::default(), GatedExecutor::new());
        let id = h.handle.enqueue(request("A")).await.unwrap().task.id;
        wait_for(&h.handle, &id, TaskStatus::Completed).await;

        drop(h.handle);
        tokio::time::timeout(Duration::from_secs(5), h.join)
            .await
            .expect("loop kept running without handles")
            .unwrap();
        assert!(!h.cancel.is_cancelled());
    }
}
