//! Webhook security boundary
//!
//! Everything an inbound trigger must pass before it reaches the scheduler:
//!
//! | Step | Module | Rejects with |
//! |------|--------|--------------|
//! | 1. HMAC-SHA256 over raw bytes | [`signature`] | [`WebhookError::SignatureInvalid`] |
//! | 2. Embedded timestamp window | [`freshness`] | [`WebhookError::TimestampStale`] |
//! | 3. Seen-signature cache | [`replay`] | [`WebhookError::ReplayDetected`] |
//!
//! Webhook errors are terminal. They are answered at the boundary and never
//! retried or forwarded to task logic.

pub mod freshness;
pub mod payload;
pub mod replay;
pub mod signature;
pub mod verifier;

use thiserror::Error;

pub use freshness::FreshnessWindow;
pub use payload::WebhookPayload;
pub use replay::ReplayGuard;
pub use verifier::{VerifierSettings, WebhookVerifier};

/// Rejections raised at the webhook boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("Signature verification failed")]
    SignatureInvalid,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Webhook timestamp outside the accepted window")]
    TimestampStale,

    #[error("Webhook delivery already processed")]
    ReplayDetected,
}
