//! Progress notification port
//!
//! Defines the interface for reporting progress during a consensus round.

use autopilot_domain::{ConsensusMode, ConsensusReport, Model, ModelVerdict};

/// Callback for progress updates during a consensus round
///
/// Implementations live in the presentation layer.
pub trait ConsensusProgress: Send + Sync {
    /// Called when a round starts
    fn on_round_start(&self, mode: ConsensusMode, models: &[Model]);

    /// Called as each model's vote arrives (in completion order)
    fn on_vote(&self, model: &Model, vote: &ModelVerdict);

    /// Called once every model has responded or timed out
    fn on_round_complete(&self, _report: &ConsensusReport) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ConsensusProgress for NoProgress {
    fn on_round_start(&self, _mode: ConsensusMode, _models: &[Model]) {}
    fn on_vote(&self, _model: &Model, _vote: &ModelVerdict) {}
}
