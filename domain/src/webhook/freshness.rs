//! Timestamp freshness window for webhook deliveries.

use serde::{Deserialize, Serialize};

/// Oldest accepted delivery age (5 minutes)
pub const DEFAULT_MAX_AGE_MS: i64 = 5 * 60 * 1000;

/// Tolerated sender clock lead (60 seconds)
pub const DEFAULT_CLOCK_SKEW_MS: i64 = 60 * 1000;

/// Accepts timestamps within `[now - max_age, now + clock_skew]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessWindow {
    pub max_age_ms: i64,
    pub clock_skew_ms: i64,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            clock_skew_ms: DEFAULT_CLOCK_SKEW_MS,
        }
    }
}

impl FreshnessWindow {
    pub fn new(max_age_ms: i64, clock_skew_ms: i64) -> Self {
        Self {
            max_age_ms,
            clock_skew_ms,
        }
    }

    /// Check an embedded epoch-millisecond timestamp against `now_ms`.
    ///
    /// A missing timestamp is treated as fresh: it is optional metadata, and
    /// the signature plus replay checks still apply.
    pub fn is_fresh(&self, timestamp_ms: Option<i64>, now_ms: i64) -> bool {
        let Some(ts) = timestamp_ms else {
            return true;
        };
        now_ms.saturating_sub(ts) <= self.max_age_ms
            && ts.saturating_sub(now_ms) <= self.clock_skew_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_760_000_000_000;
    const SECOND: i64 = 1000;
    const MINUTE: i64 = 60 * SECOND;

    #[test]
    fn test_window_boundaries() {
        let window = FreshnessWindow::default();
        assert!(!window.is_fresh(Some(NOW - 6 * MINUTE), NOW));
        assert!(window.is_fresh(Some(NOW - 4 * MINUTE), NOW));
        assert!(window.is_fresh(Some(NOW + 30 * SECOND), NOW));
        assert!(!window.is_fresh(Some(NOW + 90 * SECOND), NOW));
    }

    #[test]
    fn test_exact_edges_are_inclusive() {
        let window = FreshnessWindow::default();
        assert!(window.is_fresh(Some(NOW - 5 * MINUTE), NOW));
        assert!(window.is_fresh(Some(NOW + 60 * SECOND), NOW));
        assert!(!window.is_fresh(Some(NOW - 5 * MINUTE - 1), NOW));
    }

    #[test]
    fn test_missing_timestamp_is_fresh() {
        assert!(FreshnessWindow::default().is_fresh(None, NOW));
    }

    #[test]
    fn test_extreme_values_do_not_overflow() {
        let window = FreshnessWindow::default();
        assert!(!window.is_fresh(Some(i64::MIN), NOW));
        assert!(!window.is_fresh(Some(i64::MAX), NOW));
    }
}
