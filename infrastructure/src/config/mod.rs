//! Configuration loading for quorum-autopilot
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AUTOPILOT_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./autopilot.toml`
//! 4. Global: `$XDG_CONFIG_HOME/quorum-autopilot/config.toml`
//! 5. Default values

mod cached_source;
mod file_config;
mod loader;

pub use cached_source::CachedConfigSource;
pub use file_config::{
    FileAgentConfig, FileConfig, FileConsensusConfig, FileLoggingConfig, FileSchedulerConfig,
    FileServerConfig, FileWebhookConfig, ModelList,
};
pub use loader::{ConfigError, ConfigLoader};
