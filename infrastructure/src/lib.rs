//! Infrastructure layer for quorum-autopilot
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod process;
pub mod tracker;

// Re-export commonly used types
pub use config::{CachedConfigSource, ConfigError, ConfigLoader, FileConfig};
pub use logging::JsonlTaskEventLog;
pub use process::{AgentCommand, CliModelInvoker, CommandAgentRunner};
pub use tracker::LoggingIssueTracker;
