//! Webhook configuration from TOML (`[webhook]` section)

use autopilot_domain::ConfigIssue;
use autopilot_domain::webhook::freshness::{DEFAULT_CLOCK_SKEW_MS, DEFAULT_MAX_AGE_MS};
use autopilot_domain::webhook::replay::DEFAULT_REPLAY_CACHE_SIZE;
use autopilot_domain::webhook::{FreshnessWindow, VerifierSettings};
use serde::{Deserialize, Serialize};

/// ```toml
/// [webhook]
/// secret = "whsec_..."        # or AUTOPILOT_WEBHOOK__SECRET
/// allow_unsigned = false      # development only, ignored when a secret is set
/// max_age_ms = 300000
/// clock_skew_ms = 60000
/// replay_cache_size = 10000
/// ```
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWebhookConfig {
    pub secret: Option<String>,
    pub allow_unsigned: bool,
    pub max_age_ms: i64,
    pub clock_skew_ms: i64,
    pub replay_cache_size: usize,
}

impl Default for FileWebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            allow_unsigned: false,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            clock_skew_ms: DEFAULT_CLOCK_SKEW_MS,
            replay_cache_size: DEFAULT_REPLAY_CACHE_SIZE,
        }
    }
}

// Keeps the secret out of --show-config and debug logs
impl std::fmt::Debug for FileWebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWebhookConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("allow_unsigned", &self.allow_unsigned)
            .field("max_age_ms", &self.max_age_ms)
            .field("clock_skew_ms", &self.clock_skew_ms)
            .field("replay_cache_size", &self.replay_cache_size)
            .finish()
    }
}

impl FileWebhookConfig {
    pub fn to_verifier_settings(&self) -> VerifierSettings {
        VerifierSettings {
            secret: self.secret.clone(),
            allow_unsigned: self.allow_unsigned,
            window: FreshnessWindow::new(self.max_age_ms, self.clock_skew_ms),
            replay_cache_size: self.replay_cache_size,
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        match self.secret.as_deref() {
            Some(secret) if secret.trim().is_empty() => {
                issues.push(ConfigIssue::error(
                    "webhook.secret: configured but empty; every delivery will be rejected",
                ));
            }
            Some(_) if self.allow_unsigned => {
                issues.push(ConfigIssue::warning(
                    "webhook.allow_unsigned: ignored because webhook.secret is set",
                ));
            }
            Some(_) => {}
            None if self.allow_unsigned => {
                issues.push(ConfigIssue::warning(
                    "webhook.allow_unsigned: unsigned deliveries are accepted (development mode)",
                ));
            }
            None => {
                issues.push(ConfigIssue::warning(
                    "webhook.secret: not set; POST /webhook will reject every delivery",
                ));
            }
        }
        if self.max_age_ms <= 0 {
            issues.push(ConfigIssue::warning(
                "webhook.max_age_ms: non-positive window rejects every timestamped delivery",
            ));
        }
        issues
    }
}
