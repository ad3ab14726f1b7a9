//! Consensus configuration port
//!
//! The scheduler reads consensus settings per attempt, so an operator can
//! change the model list without restarting the service.

use crate::config::ConsensusSettings;
use std::sync::Arc;

/// Source of the current consensus settings
///
/// Each call returns a complete snapshot; callers never observe a
/// half-updated configuration.
pub trait ConsensusConfigSource: Send + Sync {
    fn consensus_settings(&self) -> Arc<ConsensusSettings>;
}

/// Fixed settings, for tests and the one-shot CLI
pub struct StaticConfigSource {
    settings: Arc<ConsensusSettings>,
}

impl StaticConfigSource {
    pub fn new(settings: ConsensusSettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl ConsensusConfigSource for StaticConfigSource {
    fn consensus_settings(&self) -> Arc<ConsensusSettings> {
        Arc::clone(&self.settings)
    }
}
