//! Consensus settings cache with a time-based TTL.
//!
//! Readers get an `Arc` snapshot. A reload builds the new settings outside
//! the lock and swaps the pointer under a short write lock, so a reader sees
//! either the old snapshot or the new one, never a mix.

use super::loader::{ConfigError, ConfigLoader};
use autopilot_application::{ConsensusConfigSource, ConsensusSettings};
use autopilot_domain::Clock;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

type Reload = Box<dyn Fn() -> Result<ConsensusSettings, ConfigError> + Send + Sync>;

struct Snapshot {
    settings: Arc<ConsensusSettings>,
    loaded_at: i64,
}

pub struct CachedConfigSource {
    reload: Reload,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Snapshot>,
}

impl CachedConfigSource {
    pub fn new(
        initial: ConsensusSettings,
        ttl_ms: u64,
        clock: Arc<dyn Clock>,
        reload: impl Fn() -> Result<ConsensusSettings, ConfigError> + Send + Sync + 'static,
    ) -> Self {
        let loaded_at = clock.now_millis();
        Self {
            reload: Box::new(reload),
            ttl_ms: i64::try_from(ttl_ms).unwrap_or(i64::MAX),
            clock,
            snapshot: RwLock::new(Snapshot {
                settings: Arc::new(initial),
                loaded_at,
            }),
        }
    }

    /// Cache that re-reads every config source through [`ConfigLoader`]
    pub fn from_sources(
        initial: ConsensusSettings,
        ttl_ms: u64,
        clock: Arc<dyn Clock>,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self::new(initial, ttl_ms, clock, move || {
            let config = ConfigLoader::load(config_path.as_deref())?;
            let (settings, issues) = config.consensus.to_settings();
            for issue in issues {
                debug!("Config reload: {}", issue);
            }
            Ok(settings)
        })
    }

    fn current(&self) -> (Arc<ConsensusSettings>, i64) {
        let snapshot = match self.snapshot.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        (Arc::clone(&snapshot.settings), snapshot.loaded_at)
    }
}

impl ConsensusConfigSource for CachedConfigSource {
    fn consensus_settings(&self) -> Arc<ConsensusSettings> {
        let now = self.clock.now_millis();
        let (settings, loaded_at) = self.current();
        if now.saturating_sub(loaded_at) < self.ttl_ms {
            return settings;
        }

        let fresh = match (self.reload)() {
            Ok(fresh) => Arc::new(fresh),
            Err(e) => {
                // keep serving the last good snapshot until the next TTL
                warn!("Config reload failed: {}", e);
                settings
            }
        };

        let mut snapshot = match self.snapshot.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        snapshot.settings = Arc::clone(&fresh);
        snapshot.loaded_at = now;
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autopilot_domain::{ApprovalThreshold, ManualClock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_source(
        clock: Arc<ManualClock>,
        calls: Arc<AtomicUsize>,
    ) -> CachedConfigSource {
        CachedConfigSource::new(ConsensusSettings::default(), 1_000, clock, move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(ConsensusSettings::default().with_threshold(ApprovalThreshold::Unanimous))
        })
    }

    #[test]
    fn test_serves_snapshot_within_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = counting_source(clock.clone(), calls.clone());

        clock.advance(999);
        assert_eq!(
            source.consensus_settings().threshold,
            ApprovalThreshold::Majority
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reloads_after_ttl() {
        let clock = Arc::new(ManualClock::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = counting_source(clock.clone(), calls.clone());

        clock.advance(1_000);
        assert_eq!(
            source.consensus_settings().threshold,
            ApprovalThreshold::Unanimous
        );
        // the reload restarts the TTL window
        source.consensus_settings();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_reload_keeps_last_snapshot() {
        let clock = Arc::new(ManualClock::new(0));
        let source = CachedConfigSource::new(
            ConsensusSettings::default(),
            10,
            clock.clone(),
            || Err(ConfigError::NotFound(PathBuf::from("gone.toml"))),
        );

        clock.advance(50);
        let settings = source.consensus_settings();
        assert_eq!(*settings, ConsensusSettings::default());
    }

    #[test]
    fn test_old_snapshot_survives_swap() {
        let clock = Arc::new(ManualClock::new(0));
        let calls = Arc::new(AtomicUsize::new(0));
        let source = counting_source(clock.clone(), calls);

        let before = source.consensus_settings();
        clock.advance(2_000);
        let after = source.consensus_settings();
        assert_eq!(before.threshold, ApprovalThreshold::Majority);
        assert_eq!(after.threshold, ApprovalThreshold::Unanimous);
    }
}
