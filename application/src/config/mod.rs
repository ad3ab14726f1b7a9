//! Application-level configuration.
//!
//! - [`SchedulerConfig`] : admission, concurrency and retry limits
//! - [`ConsensusSettings`] : plan/review gate models, threshold and timeout

pub mod consensus_settings;
pub mod scheduler_config;

pub use consensus_settings::ConsensusSettings;
pub use scheduler_config::SchedulerConfig;
