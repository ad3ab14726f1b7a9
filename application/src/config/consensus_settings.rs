//! Consensus gate settings.

use autopilot_domain::{ApprovalThreshold, ConsensusMode, Model};
use std::time::Duration;

pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(300);

/// Settings for the plan and review gates.
///
/// A gate with consensus disabled, or with no models, approves without
/// asking anyone.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusSettings {
    pub enabled: bool,
    pub models: Vec<Model>,
    pub threshold: ApprovalThreshold,
    /// Independent timeout per model invocation
    pub timeout: Duration,
    pub plan_gate: bool,
    pub review_gate: bool,
}

impl Default for ConsensusSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            models: Model::default_models(),
            threshold: ApprovalThreshold::default(),
            timeout: DEFAULT_MODEL_TIMEOUT,
            plan_gate: true,
            review_gate: true,
        }
    }
}

impl ConsensusSettings {
    /// Settings with every gate switched off
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_models(mut self, models: Vec<Model>) -> Self {
        self.models = models;
        self
    }

    pub fn with_threshold(mut self, threshold: ApprovalThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a round should actually run for `mode`
    pub fn gate_active(&self, mode: ConsensusMode) -> bool {
        let gate = match mode {
            ConsensusMode::Plan => self.plan_gate,
            ConsensusMode::Review => self.review_gate,
        };
        self.enabled && gate && !self.models.is_empty()
    }
}
