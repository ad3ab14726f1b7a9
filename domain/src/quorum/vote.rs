//! Vote types for Quorum consensus
//!
//! This module defines the per-model verdict produced by one consensus round.

use super::consensus::ConsensusMode;
use serde::{Deserialize, Serialize};

/// A single model's verdict
///
/// `SuggestChanges` only appears in plan mode. It is a soft approval for
/// aggregation purposes but rendered distinctly in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approve,
    Reject,
    Abstain,
    SuggestChanges,
}

impl Verdict {
    /// Label used in rendered reports (grepped by downstream consumers)
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Approve => "APPROVE",
            Verdict::Reject => "REJECT",
            Verdict::Abstain => "ABSTAIN",
            Verdict::SuggestChanges => "SUGGEST_CHANGES",
        }
    }

    /// Neutral placeholder for a mode: what a vote defaults to when nothing
    /// explicit was found, and what an errored vote carries.
    pub fn placeholder(mode: ConsensusMode) -> Self {
        match mode {
            ConsensusMode::Plan => Verdict::SuggestChanges,
            ConsensusMode::Review => Verdict::Abstain,
        }
    }

    /// Whether the verdict counts on the approving side of the tally
    pub fn is_approval(&self) -> bool {
        matches!(self, Verdict::Approve | Verdict::SuggestChanges)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One model's response to a consensus question
///
/// # Example
///
/// ```
/// use autopilot_domain::quorum::{ModelVerdict, Verdict};
///
/// let vote = ModelVerdict::new("claude", Verdict::Approve).with_summary("Plan is sound.");
/// assert!(vote.counts_toward_quorum());
///
/// let failed = ModelVerdict::failed("codex", Verdict::Abstain, "timed out after 300s", 300_000);
/// assert!(!failed.counts_toward_quorum());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelVerdict {
    /// Model identifier (e.g., "claude", "codex")
    pub model: String,
    pub verdict: Verdict,
    /// First substantial paragraph of the response
    pub summary: String,
    /// The full response text
    pub feedback: String,
    /// Extracted issues / concerns (best-effort)
    pub concerns: Vec<String>,
    /// Extracted suggestions (best-effort)
    pub suggestions: Vec<String>,
    pub response_time_ms: u64,
    /// Present when the model could not be invoked; such votes are excluded
    /// from the tally
    pub error: Option<String>,
}

impl ModelVerdict {
    pub fn new(model: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            model: model.into(),
            verdict,
            summary: String::new(),
            feedback: String::new(),
            concerns: Vec::new(),
            suggestions: Vec::new(),
            response_time_ms: 0,
            error: None,
        }
    }

    /// A vote for a model that timed out or failed to launch
    pub fn failed(
        model: impl Into<String>,
        placeholder: Verdict,
        error: impl Into<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            error: Some(error.into()),
            response_time_ms,
            ..Self::new(model, placeholder)
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = ms;
        self
    }

    /// Valid votes are error-free and take a side.
    ///
    /// Abstentions and errored votes stay in the report but are left out of
    /// the denominator.
    pub fn counts_toward_quorum(&self) -> bool {
        self.error.is_none() && self.verdict != Verdict::Abstain
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
