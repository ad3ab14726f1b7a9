//! Scheduler configuration from TOML (`[scheduler]` section)

use autopilot_application::SchedulerConfig;
use autopilot_domain::ConfigIssue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// ```toml
/// [scheduler]
/// max_concurrent = 2
/// max_queue_size = 100
/// max_attempts = 3
/// retry_delay_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSchedulerConfig {
    pub max_concurrent: usize,
    pub max_queue_size: usize,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for FileSchedulerConfig {
    fn default() -> Self {
        let defaults = SchedulerConfig::default();
        Self {
            max_concurrent: defaults.max_concurrent,
            max_queue_size: defaults.max_queue_size,
            max_attempts: defaults.max_attempts,
            retry_delay_ms: defaults.retry_delay.as_millis() as u64,
        }
    }
}

impl FileSchedulerConfig {
    pub fn to_scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::default()
            .with_max_concurrent(self.max_concurrent)
            .with_max_queue_size(self.max_queue_size)
            .with_max_attempts(self.max_attempts)
            .with_retry_delay(Duration::from_millis(self.retry_delay_ms))
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_concurrent == 0 {
            issues.push(ConfigIssue::warning(
                "scheduler.max_concurrent: 0 is not allowed, using 1",
            ));
        }
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                "scheduler.max_attempts: 0 is not allowed, using 1",
            ));
        }
        if self.max_queue_size == 0 {
            issues.push(ConfigIssue::warning(
                "scheduler.max_queue_size: 0 rejects every task",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scheduler_config() {
        let config = FileSchedulerConfig::default().to_scheduler_config();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_zero_values_are_clamped_and_reported() {
        let file = FileSchedulerConfig {
            max_concurrent: 0,
            max_attempts: 0,
            ..Default::default()
        };
        let config = file.to_scheduler_config();
        assert_eq!(config.max_concurrent, 1);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(file.validate().len(), 2);
    }
}
