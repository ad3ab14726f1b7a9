//! Task board: the state owned by the scheduling loop.
//!
//! Every Task mutation happens here, and only the loop holds a `TaskBoard`.
//! The running set is updated in the same call as the status transition, so
//! admission control cannot drift from the actual task states.

use super::handle::{Admission, SchedulerError};
use crate::config::SchedulerConfig;
use crate::use_cases::execute_task::TaskError;
use autopilot_domain::{Priority, Task, TaskId, TaskRequest, TaskStatus};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

/// What happened to a task when its attempt reported back
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Completed,
    /// Back to pending; re-admitted after the retry delay
    RetryScheduled { attempt: u32, error: TaskError },
    /// Terminal
    Failed { reason: String },
}

#[derive(Debug)]
pub struct TaskBoard {
    config: SchedulerConfig,
    tasks: HashMap<TaskId, Task>,
    /// Admission order, for listing
    admitted: Vec<TaskId>,
    /// Eligible pending tasks: urgent first, FIFO within a tier
    ready: BTreeMap<(Reverse<Priority>, u64), TaskId>,
    /// Pending tasks still inside their retry delay
    waiting: HashSet<TaskId>,
    running: HashSet<TaskId>,
    /// Pending or running task per issue
    active_by_issue: HashMap<String, TaskId>,
    seq: u64,
}

impl TaskBoard {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            tasks: HashMap::new(),
            admitted: Vec::new(),
            ready: BTreeMap::new(),
            waiting: HashSet::new(),
            running: HashSet::new(),
            active_by_issue: HashMap::new(),
            seq: 0,
        }
    }

    /// Admit a request.
    ///
    /// A request for an issue that already has a pending or running task is
    /// a no-op returning that task. Otherwise the request is refused with
    /// [`SchedulerError::QueueFull`] if it would push pending + running past
    /// `max_queue_size`.
    pub fn admit(&mut self, request: TaskRequest, now: i64) -> Result<Admission, SchedulerError> {
        request
            .validate()
            .map_err(|e| SchedulerError::InvalidTask(e.to_string()))?;

        if let Some(id) = self.active_by_issue.get(&request.issue_id)
            && let Some(existing) = self.tasks.get(id)
        {
            return Ok(Admission {
                task: existing.clone(),
                deduplicated: true,
            });
        }

        if self.active_count() + 1 > self.config.max_queue_size {
            return Err(SchedulerError::QueueFull);
        }

        let task = Task::from_request(request, self.config.max_attempts, now);
        let id = task.id.clone();
        self.active_by_issue
            .insert(task.issue_id.clone(), id.clone());
        self.push_ready(&id, task.priority);
        self.admitted.push(id.clone());
        self.tasks.insert(id, task.clone());

        Ok(Admission {
            task,
            deduplicated: false,
        })
    }

    /// Move the highest-priority eligible task to `running`, if a slot is free.
    pub fn start_next(&mut self, now: i64) -> Option<Task> {
        if self.running.len() >= self.config.max_concurrent {
            return None;
        }
        let (_, id) = self.ready.pop_first()?;
        let task = self.tasks.get_mut(&id)?;
        task.mark_running(now);
        self.running.insert(id);
        Some(task.clone())
    }

    /// Record the end of a running attempt.
    pub fn finish(
        &mut self,
        id: &TaskId,
        result: Result<(), TaskError>,
        now: i64,
    ) -> Option<AttemptOutcome> {
        if !self.running.remove(id) {
            return None;
        }
        let task = self.tasks.get_mut(id)?;

        let outcome = match result {
            Ok(()) => {
                task.mark_completed(now);
                AttemptOutcome::Completed
            }
            Err(error) if task.can_retry() => {
                task.mark_retry_pending(now);
                self.waiting.insert(id.clone());
                return Some(AttemptOutcome::RetryScheduled {
                    attempt: task.attempt,
                    error,
                });
            }
            Err(error) => {
                let reason = TaskError::TaskExhausted {
                    attempts: task.attempt,
                    last_error: error.to_string(),
                }
                .to_string();
                task.mark_failed(reason.clone(), now);
                AttemptOutcome::Failed { reason }
            }
        };

        let issue_id = task.issue_id.clone();
        self.active_by_issue.remove(&issue_id);
        Some(outcome)
    }

    /// A retry delay elapsed: the task becomes eligible again, queued behind
    /// tasks of its tier that are already waiting.
    pub fn retry_due(&mut self, id: &TaskId) -> bool {
        if !self.waiting.remove(id) {
            return false;
        }
        let Some(priority) = self.tasks.get(id).map(|t| t.priority) else {
            return false;
        };
        self.push_ready(id, priority);
        true
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Every task in admission order
    pub fn list(&self) -> Vec<Task> {
        self.admitted
            .iter()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect()
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    /// Pending (eligible or waiting) plus running
    pub fn active_count(&self) -> usize {
        self.ready.len() + self.waiting.len() + self.running.len()
    }

    pub fn status_of(&self, id: &TaskId) -> Option<TaskStatus> {
        self.tasks.get(id).map(|t| t.status)
    }

    fn push_ready(&mut self, id: &TaskId, priority: Priority) {
        self.seq += 1;
        self.ready.insert((Reverse(priority), self.seq), id.clone());
    }
}
