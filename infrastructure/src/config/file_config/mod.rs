//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Values that can be wrong in a recoverable way are kept as strings and
//! parsed with `parse_*` helpers that return the fallback plus the issues
//! found, so a bad non-critical value never stops startup.

mod agent;
mod consensus;
mod scheduler;
mod server;
mod webhook;

pub use agent::FileAgentConfig;
pub use consensus::{FileConsensusConfig, ModelList};
pub use scheduler::FileSchedulerConfig;
pub use server::FileServerConfig;
pub use webhook::FileWebhookConfig;

use autopilot_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default reload interval for the consensus settings cache
pub const DEFAULT_CONFIG_TTL_MS: u64 = 30_000;

/// Logging settings (`[logging]` section)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL task event log; no event log when unset
    pub event_log: Option<PathBuf>,
    /// Directory for markdown copies of published consensus reports
    pub report_dir: Option<PathBuf>,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: FileServerConfig,
    pub scheduler: FileSchedulerConfig,
    pub webhook: FileWebhookConfig,
    pub consensus: FileConsensusConfig,
    pub agent: FileAgentConfig,
    pub logging: FileLoggingConfig,
    /// How long consensus settings are served before being reloaded
    pub config_ttl_ms: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            server: FileServerConfig::default(),
            scheduler: FileSchedulerConfig::default(),
            webhook: FileWebhookConfig::default(),
            consensus: FileConsensusConfig::default(),
            agent: FileAgentConfig::default(),
            logging: FileLoggingConfig::default(),
            config_ttl_ms: DEFAULT_CONFIG_TTL_MS,
        }
    }
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.server.parse_listen().1);
        issues.extend(self.scheduler.validate());
        issues.extend(self.webhook.validate());
        issues.extend(self.consensus.to_settings().1);
        issues.extend(self.agent.validate());
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopilot_domain::{ApprovalThreshold, Model};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
config_ttl_ms = 5000

[server]
listen = "0.0.0.0:9000"

[scheduler]
max_concurrent = 4
max_queue_size = 10
max_attempts = 5
retry_delay_ms = 1000

[webhook]
secret = "whsec_abc"
max_age_ms = 120000

[consensus]
models = ["claude", "gpt-5-codex"]
threshold = "supermajority"
timeout_ms = 60000
plan_gate = false

[consensus.commands]
gpt-5-codex = ["codex", "exec", "--model", "gpt-5-codex"]

[agent]
command = "claude"
args = ["-p", "--output-format", "stream-json", "--verbose"]

[logging]
event_log = "/tmp/autopilot/events.jsonl"
report_dir = "/tmp/autopilot/reports"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.config_ttl_ms, 5000);
        assert_eq!(config.scheduler.max_concurrent, 4);
        assert_eq!(config.webhook.secret.as_deref(), Some("whsec_abc"));

        let (settings, issues) = config.consensus.to_settings();
        assert!(issues.is_empty());
        assert_eq!(
            settings.models,
            vec![Model::Claude, Model::Custom("gpt-5-codex".to_string())]
        );
        assert_eq!(settings.threshold, ApprovalThreshold::Supermajority);
        assert!(!settings.plan_gate);
        assert!(settings.review_gate);
        assert_eq!(config.consensus.commands["gpt-5-codex"][0], "codex");
        assert_eq!(config.agent.args.len(), 4);
        assert!(config.logging.event_log.is_some());
        assert_eq!(
            config.logging.report_dir,
            Some(PathBuf::from("/tmp/autopilot/reports"))
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[scheduler]\nmax_concurrent = 8\n").unwrap();
        assert_eq!(config.scheduler.max_concurrent, 8);
        assert_eq!(config.scheduler.max_attempts, 3);
        assert_eq!(config.config_ttl_ms, DEFAULT_CONFIG_TTL_MS);
        assert!(config.consensus.enabled);
    }

    #[test]
    fn test_default_config_only_warns_about_webhook() {
        let issues = FileConfig::default().validate();
        assert!(issues.iter().all(|i| !i.is_error()));
        assert!(issues.iter().any(|i| i.message.contains("webhook.secret")));
    }
}
