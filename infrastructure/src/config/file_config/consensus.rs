//! Consensus configuration from TOML (`[consensus]` section)

use autopilot_application::ConsensusSettings;
use autopilot_application::config::consensus_settings::DEFAULT_MODEL_TIMEOUT;
use autopilot_domain::{ApprovalThreshold, ConfigIssue, Model};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Model list as a TOML array or a comma-separated string.
///
/// The string form is what `AUTOPILOT_CONSENSUS__MODELS=claude,codex`
/// produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelList {
    List(Vec<String>),
    Csv(String),
}

impl Default for ModelList {
    fn default() -> Self {
        ModelList::List(
            Model::default_models()
                .iter()
                .map(|m| m.as_str().to_string())
                .collect(),
        )
    }
}

impl ModelList {
    fn names(&self) -> Vec<&str> {
        match self {
            ModelList::List(items) => items.iter().map(String::as_str).collect(),
            ModelList::Csv(s) => s.split(',').collect(),
        }
    }
}

/// Consensus gate configuration
///
/// # Example
///
/// ```toml
/// [consensus]
/// enabled = true
/// models = ["claude", "codex", "gemini"]   # or "claude,codex,gemini"
/// threshold = "majority"                   # supermajority, unanimous, "75%"
/// timeout_ms = 300000
/// plan_gate = true
/// review_gate = true
///
/// [consensus.commands]
/// my-model = ["my-cli", "--quiet"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    pub enabled: bool,
    pub models: ModelList,
    pub threshold: String,
    pub timeout_ms: u64,
    pub plan_gate: bool,
    pub review_gate: bool,
    /// Per-model command override: program followed by its arguments
    pub commands: BTreeMap<String, Vec<String>>,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            models: ModelList::default(),
            threshold: "majority".to_string(),
            timeout_ms: DEFAULT_MODEL_TIMEOUT.as_millis() as u64,
            plan_gate: true,
            review_gate: true,
            commands: BTreeMap::new(),
        }
    }
}

impl FileConsensusConfig {
    /// Parse the model list, reporting blank entries
    pub fn parse_models(&self) -> (Vec<Model>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut models = Vec::new();
        for name in self.models.names() {
            match name.parse::<Model>() {
                Ok(model) => {
                    if !models.contains(&model) {
                        models.push(model);
                    }
                }
                Err(_) => issues.push(ConfigIssue::warning(
                    "consensus.models: empty model name skipped",
                )),
            }
        }
        if self.enabled && models.is_empty() {
            issues.push(ConfigIssue::warning(
                "consensus.models: no models configured; gates approve without a vote",
            ));
        }
        (models, issues)
    }

    /// Parse the threshold, falling back to majority
    pub fn parse_threshold(&self) -> (ApprovalThreshold, Vec<ConfigIssue>) {
        match self.threshold.parse::<ApprovalThreshold>() {
            Ok(threshold) => (threshold, vec![]),
            Err(e) => (
                ApprovalThreshold::default(),
                vec![ConfigIssue::warning(format!(
                    "consensus.threshold: {}; falling back to majority",
                    e
                ))],
            ),
        }
    }

    pub fn to_settings(&self) -> (ConsensusSettings, Vec<ConfigIssue>) {
        let (models, mut issues) = self.parse_models();
        let (threshold, threshold_issues) = self.parse_threshold();
        issues.extend(threshold_issues);

        let timeout = if self.timeout_ms == 0 {
            issues.push(ConfigIssue::warning(format!(
                "consensus.timeout_ms: 0 is not allowed, using {}",
                DEFAULT_MODEL_TIMEOUT.as_millis()
            )));
            DEFAULT_MODEL_TIMEOUT
        } else {
            Duration::from_millis(self.timeout_ms)
        };

        for (model, command) in &self.commands {
            if command.first().is_none_or(|program| program.trim().is_empty()) {
                issues.push(ConfigIssue::warning(format!(
                    "consensus.commands.{}: empty command ignored",
                    model
                )));
            }
        }

        let settings = ConsensusSettings {
            enabled: self.enabled,
            models,
            threshold,
            timeout,
            plan_gate: self.plan_gate,
            review_gate: self.review_gate,
        };
        (settings, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consensus_settings() {
        let (settings, issues) = FileConsensusConfig::default().to_settings();
        assert!(issues.is_empty());
        assert_eq!(settings, ConsensusSettings::default());
    }

    #[test]
    fn test_comma_separated_models() {
        let config: FileConsensusConfig =
            toml::from_str(r#"models = "claude, gemini,,claude""#).unwrap();
        let (models, issues) = config.parse_models();
        assert_eq!(models, vec![Model::Claude, Model::Gemini]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_bad_threshold_falls_back() {
        let config = FileConsensusConfig {
            threshold: "most".to_string(),
            ..Default::default()
        };
        let (settings, issues) = config.to_settings();
        assert_eq!(settings.threshold, ApprovalThreshold::Majority);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("consensus.threshold"));
    }

    #[test]
    fn test_percentage_threshold() {
        let config = FileConsensusConfig {
            threshold: "75%".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.parse_threshold().0,
            ApprovalThreshold::Percentage(75)
        );
    }

    #[test]
    fn test_empty_model_list_warns_only_when_enabled() {
        let mut config = FileConsensusConfig {
            models: ModelList::List(vec![]),
            ..Default::default()
        };
        assert_eq!(config.parse_models().1.len(), 1);
        config.enabled = false;
        assert!(config.parse_models().1.is_empty());
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = FileConsensusConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        let (settings, issues) = config.to_settings();
        assert_eq!(settings.timeout, DEFAULT_MODEL_TIMEOUT);
        assert_eq!(issues.len(), 1);
    }
}
