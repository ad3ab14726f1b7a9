//! Bounded replay detection for accepted webhook signatures.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

/// Default number of remembered signatures
pub const DEFAULT_REPLAY_CACHE_SIZE: usize = 10_000;

#[derive(Debug, Default)]
struct SeenSignatures {
    order: VecDeque<String>,
    set: HashSet<String>,
}

/// Remembers accepted signatures and rejects repeats.
///
/// Check-and-insert happens under one mutex so two concurrent deliveries of
/// the same signature cannot both pass. Once more than `max_size` entries are
/// stored, the oldest half is dropped in one sweep. Dropped entries can only
/// be replayed after they have also aged out of the freshness window, which is
/// checked independently on every request.
#[derive(Debug)]
pub struct ReplayGuard {
    max_size: usize,
    seen: Mutex<SeenSignatures>,
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_CACHE_SIZE)
    }
}

impl ReplayGuard {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(2),
            seen: Mutex::new(SeenSignatures::default()),
        }
    }

    /// Returns `false` if `signature` was already accepted, otherwise records
    /// it and returns `true`.
    pub fn check_and_insert(&self, signature: &str) -> bool {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if seen.set.contains(signature) {
            return false;
        }

        seen.set.insert(signature.to_string());
        seen.order.push_back(signature.to_string());

        if seen.order.len() > self.max_size {
            let evict = seen.order.len() / 2;
            for _ in 0..evict {
                if let Some(old) = seen.order.pop_front() {
                    seen.set.remove(&old);
                }
            }
        }

        true
    }

    /// Drop a recorded signature so the same delivery can be accepted again.
    ///
    /// Used when a delivery passed every check but was refused for a
    /// transient reason the sender is expected to retry.
    pub fn forget(&self, signature: &str) {
        let mut seen = match self.seen.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if seen.set.remove(signature) {
            seen.order.retain(|s| s != signature);
        }
    }

    pub fn len(&self) -> usize {
        match self.seen.lock() {
            Ok(guard) => guard.order.len(),
            Err(poisoned) => poisoned.into_inner().order.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
