//! Agent session configuration from TOML (`[agent]` section)

use autopilot_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_AGENT_TIMEOUT_MS: u64 = 30 * 60 * 1000;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// command = "claude"
/// args = ["-p", "--output-format", "stream-json", "--verbose"]
/// timeout_ms = 1800000
/// working_dir = "/srv/checkout"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Agent CLI executable
    pub command: String,
    pub args: Vec<String>,
    pub timeout_ms: u64,
    pub working_dir: Option<PathBuf>,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            args: vec![
                "-p".to_string(),
                "--output-format".to_string(),
                "stream-json".to_string(),
                "--verbose".to_string(),
            ],
            timeout_ms: DEFAULT_AGENT_TIMEOUT_MS,
            working_dir: None,
        }
    }
}

impl FileAgentConfig {
    pub fn timeout(&self) -> Duration {
        if self.timeout_ms == 0 {
            Duration::from_millis(DEFAULT_AGENT_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.timeout_ms)
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error("agent.command: cannot be empty"));
        }
        if self.timeout_ms == 0 {
            issues.push(ConfigIssue::warning(format!(
                "agent.timeout_ms: 0 is not allowed, using {}",
                DEFAULT_AGENT_TIMEOUT_MS
            )));
        }
        if let Some(dir) = &self.working_dir
            && !dir.is_dir()
        {
            issues.push(ConfigIssue::warning(format!(
                "agent.working_dir: {} is not a directory",
                dir.display()
            )));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_runs_claude_stream_json() {
        let config = FileAgentConfig::default();
        assert_eq!(config.command, "claude");
        assert!(config.args.contains(&"stream-json".to_string()));
        assert_eq!(config.timeout(), Duration::from_secs(1800));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_empty_command_is_error() {
        let config = FileAgentConfig {
            command: String::new(),
            ..Default::default()
        };
        assert!(config.validate().iter().any(|i| i.is_error()));
    }

    #[test]
    fn test_missing_working_dir_warns() {
        let config = FileAgentConfig {
            working_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 1);
    }
}
