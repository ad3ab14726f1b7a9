//! Logging infrastructure: machine-readable task lifecycle events.
//!
//! Provides [`JsonlTaskEventLog`], a JSONL file writer that implements
//! the [`TaskEventLog`](autopilot_application::TaskEventLog) port.

mod jsonl_event_log;

pub use jsonl_event_log::JsonlTaskEventLog;
