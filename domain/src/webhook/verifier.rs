//! Webhook verifier service.
//!
//! One [`WebhookVerifier`] is constructed at startup and shared by handle.
//! Callers must run the checks in order: signature, then timestamp, then
//! replay. Verifying the signature first keeps unauthenticated bytes from
//! reaching the JSON parser or mutating the replay cache.

use super::freshness::FreshnessWindow;
use super::replay::ReplayGuard;
use super::signature;
use crate::core::clock::Clock;
use std::sync::Arc;

/// Verifier configuration
#[derive(Debug, Clone, Default)]
pub struct VerifierSettings {
    /// Shared HMAC secret; `None` means no secret is configured
    pub secret: Option<String>,
    /// Development mode: accept deliveries without a signature header.
    /// Only honored while no secret is configured.
    pub allow_unsigned: bool,
    pub window: FreshnessWindow,
    pub replay_cache_size: usize,
}

/// Authenticates and deduplicates inbound webhook deliveries
pub struct WebhookVerifier {
    secret: Option<Vec<u8>>,
    allow_unsigned: bool,
    window: FreshnessWindow,
    replay: ReplayGuard,
    clock: Arc<dyn Clock>,
}

impl WebhookVerifier {
    pub fn new(settings: VerifierSettings, clock: Arc<dyn Clock>) -> Self {
        let secret = settings
            .secret
            .filter(|s| !s.is_empty())
            .map(String::into_bytes);
        Self {
            secret,
            allow_unsigned: settings.allow_unsigned,
            window: settings.window,
            replay: ReplayGuard::new(settings.replay_cache_size),
            clock,
        }
    }

    /// Whether a shared secret is configured
    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify the signature header against the exact raw body.
    ///
    /// With a secret configured, a missing or mismatching header fails. The
    /// unsigned development bypass applies only when no secret is configured,
    /// `allow_unsigned` is set, and the header is absent.
    pub fn verify_signature(&self, raw_body: &[u8], signature_header: Option<&str>) -> bool {
        match (&self.secret, signature_header) {
            (Some(secret), Some(header)) => signature::verify(secret, raw_body, header),
            (Some(_), None) => false,
            (None, None) => self.allow_unsigned,
            (None, Some(_)) => false,
        }
    }

    /// Check the timestamp embedded in the (already authenticated) payload
    pub fn check_timestamp(&self, timestamp_ms: Option<i64>) -> bool {
        self.window.is_fresh(timestamp_ms, self.clock.now_millis())
    }

    /// Record `key` as seen; `false` means it is a replay
    pub fn check_replay(&self, key: &str) -> bool {
        self.replay.check_and_insert(key)
    }

    /// Undo [`check_replay`](Self::check_replay) for a delivery that was
    /// refused after verification and will be retried by the sender
    pub fn forget_replay(&self, key: &str) {
        self.replay.forget(key);
    }

    /// Replay key for a delivery: the signature when present, otherwise the
    /// body digest (unsigned development deliveries).
    pub fn replay_key(raw_body: &[u8], signature_header: Option<&str>) -> String {
        match signature_header {
            Some(sig) => {
                let sig = sig.trim();
                sig.strip_prefix("sha256=").unwrap_or(sig).to_lowercase()
            }
            None => signature::body_digest(raw_body),
        }
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("has_secret", &self.secret.is_some())
            .field("allow_unsigned", &self.allow_unsigned)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
