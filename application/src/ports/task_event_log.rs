//! Port for structured task lifecycle logging.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures lifecycle
//! events in a machine-readable format (JSONL).

use chrono::{DateTime, Utc};
use serde_json::Value;

/// A structured lifecycle event.
pub struct TaskEvent {
    /// Event type identifier (e.g., "task_admitted", "retry_scheduled").
    pub event_type: &'static str,
    pub at: DateTime<Utc>,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TaskEvent {
    /// Create a new event stamped with the current UTC time.
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            at: Utc::now(),
            payload,
        }
    }
}

/// Port for recording lifecycle events.
///
/// `record` is synchronous and infallible so logging never disrupts
/// scheduling; failures are dropped by the implementation.
pub trait TaskEventLog: Send + Sync {
    fn record(&self, event: TaskEvent);
}

/// No-op implementation for tests and when no event log is configured.
pub struct NoTaskEventLog;

impl TaskEventLog for NoTaskEventLog {
    fn record(&self, _event: TaskEvent) {}
}
