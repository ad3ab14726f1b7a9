//! Quorum Consensus aggregation
//!
//! A [`ConsensusReport`] is derived from a round's votes and the configured
//! threshold. It has no setters: the verdict is always recomputed from the
//! votes, never assigned.

use super::report;
use super::rule::ApprovalThreshold;
use super::vote::{ModelVerdict, Verdict};
use serde::{Deserialize, Serialize};

/// Minimum number of valid votes for a conclusive round
pub const MIN_VALID_VOTES: usize = 2;

/// Which question a round answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusMode {
    /// Judge a proposed approach before execution
    Plan,
    /// Judge completed work after execution
    Review,
}

impl ConsensusMode {
    pub fn as_str(&self) -> &str {
        match self {
            ConsensusMode::Plan => "plan",
            ConsensusMode::Review => "review",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            ConsensusMode::Plan => "Plan Consensus",
            ConsensusMode::Review => "Review Consensus",
        }
    }
}

impl std::fmt::Display for ConsensusMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ConsensusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plan" => Ok(ConsensusMode::Plan),
            "review" => Ok(ConsensusMode::Review),
            other => Err(format!("unknown consensus mode: {} (plan|review)", other)),
        }
    }
}

/// Outcome of a consensus round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsensusVerdict {
    Approved,
    Rejected,
    /// Between the approval threshold and its rejection boundary
    Split,
    /// Fewer than [`MIN_VALID_VOTES`] valid votes
    Inconclusive,
}

impl ConsensusVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            ConsensusVerdict::Approved => "APPROVED",
            ConsensusVerdict::Rejected => "REJECTED",
            ConsensusVerdict::Split => "SPLIT",
            ConsensusVerdict::Inconclusive => "INCONCLUSIVE",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, ConsensusVerdict::Approved)
    }
}

impl std::fmt::Display for ConsensusVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tally of the valid votes in a round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub approve_count: usize,
    pub reject_count: usize,
    pub valid_count: usize,
    pub approval_percent: f64,
}

impl Tally {
    pub fn from_votes(votes: &[ModelVerdict]) -> Self {
        let valid: Vec<&ModelVerdict> = votes.iter().filter(|v| v.counts_toward_quorum()).collect();
        let approve_count = valid.iter().filter(|v| v.verdict.is_approval()).count();
        let valid_count = valid.len();
        let approval_percent = if valid_count == 0 {
            0.0
        } else {
            100.0 * approve_count as f64 / valid_count as f64
        };
        Self {
            approve_count,
            reject_count: valid_count - approve_count,
            valid_count,
            approval_percent,
        }
    }
}

/// Aggregate a tally under a threshold.
///
/// `< 2` valid votes is INCONCLUSIVE regardless of threshold. Otherwise
/// `approval >= threshold` is APPROVED, `approval < 100 - threshold` is
/// REJECTED, and everything else is SPLIT.
pub fn aggregate(tally: &Tally, threshold: ApprovalThreshold) -> ConsensusVerdict {
    if tally.valid_count < MIN_VALID_VOTES {
        return ConsensusVerdict::Inconclusive;
    }
    if tally.approval_percent >= f64::from(threshold.percent()) {
        ConsensusVerdict::Approved
    } else if tally.approval_percent < f64::from(threshold.rejection_boundary()) {
        ConsensusVerdict::Rejected
    } else {
        ConsensusVerdict::Split
    }
}

/// Result of one consensus round
///
/// # Example
///
/// ```
/// use autopilot_domain::quorum::{
///     ApprovalThreshold, ConsensusMode, ConsensusReport, ConsensusVerdict, ModelVerdict, Verdict,
/// };
///
/// let votes = vec![
///     ModelVerdict::new("claude", Verdict::Approve),
///     ModelVerdict::new("codex", Verdict::Approve),
///     ModelVerdict::new("gemini", Verdict::Reject),
/// ];
/// let report = ConsensusReport::new(
///     ConsensusMode::Review,
///     "Review the change",
///     votes,
///     ApprovalThreshold::Majority,
/// );
/// assert_eq!(report.verdict(), ConsensusVerdict::Approved);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusReport {
    mode: ConsensusMode,
    question: String,
    votes: Vec<ModelVerdict>,
    threshold: ApprovalThreshold,
    tally: Tally,
    verdict: ConsensusVerdict,
    summary: String,
}

impl ConsensusReport {
    pub fn new(
        mode: ConsensusMode,
        question: impl Into<String>,
        votes: Vec<ModelVerdict>,
        threshold: ApprovalThreshold,
    ) -> Self {
        let tally = Tally::from_votes(&votes);
        let verdict = aggregate(&tally, threshold);
        let mut report = Self {
            mode,
            question: question.into(),
            votes,
            threshold,
            tally,
            verdict,
            summary: String::new(),
        };
        report.summary = report::render_markdown(&report);
        report
    }

    pub fn mode(&self) -> ConsensusMode {
        self.mode
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn votes(&self) -> &[ModelVerdict] {
        &self.votes
    }

    pub fn threshold(&self) -> ApprovalThreshold {
        self.threshold
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn approval_percent(&self) -> f64 {
        self.tally.approval_percent
    }

    pub fn verdict(&self) -> ConsensusVerdict {
        self.verdict
    }

    pub fn is_approved(&self) -> bool {
        self.verdict.is_approved()
    }

    /// Rendered markdown report
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// One-line rationale for the verdict
    pub fn rationale(&self) -> String {
        let t = &self.tally;
        match self.verdict {
            ConsensusVerdict::Inconclusive => format!(
                "only {} valid vote(s) out of {}; at least {} required",
                t.valid_count,
                self.votes.len(),
                MIN_VALID_VOTES
            ),
            _ => format!(
                "{}/{} valid votes approve ({:.0}%), threshold {}",
                t.approve_count,
                t.valid_count,
                t.approval_percent,
                self.threshold.description()
            ),
        }
    }

    /// Concerns from every valid vote, prefixed with the model name
    pub fn all_concerns(&self) -> Vec<String> {
        self.votes
            .iter()
            .filter(|v| !v.is_error())
            .flat_map(|v| v.concerns.iter().map(move |c| format!("{}: {}", v.model, c)))
            .collect()
    }

    /// Suggestions from every valid vote, prefixed with the model name
    pub fn all_suggestions(&self) -> Vec<String> {
        self.votes
            .iter()
            .filter(|v| !v.is_error())
            .flat_map(|v| {
                v.suggestions
                    .iter()
                    .map(move |s| format!("{}: {}", v.model, s))
            })
            .collect()
    }

    /// Visual vote summary, e.g. `[●●○·]`
    ///
    /// `●` approving, `○` rejecting, `·` abstained or errored.
    pub fn vote_summary(&self) -> String {
        let mut summary = String::from("[");
        for vote in &self.votes {
            summary.push(if !vote.counts_toward_quorum() {
                '·'
            } else if vote.verdict.is_approval() {
                '●'
            } else {
                '○'
            });
        }
        summary.push(']');
        summary
    }
}
