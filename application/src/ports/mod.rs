//! Port definitions
//!
//! Ports are interfaces that define how the application layer interacts
//! with external systems. Implementations (adapters) live in the
//! infrastructure layer.

pub mod agent_runner;
pub mod config_source;
pub mod issue_tracker;
pub mod model_invoker;
pub mod progress;
pub mod task_event_log;
