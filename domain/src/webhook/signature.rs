//! HMAC-SHA256 signatures over raw webhook bodies.
//!
//! The signature is always computed over the exact bytes received. Parsing
//! and re-serializing the JSON would change the byte layout and break
//! verification.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Length of a raw HMAC-SHA256 tag in bytes
const SIGNATURE_LEN: usize = 32;

/// Hex-encoded HMAC-SHA256 of `body` under `secret`
pub fn sign(secret: &[u8], body: &[u8]) -> String {
    // new_from_slice accepts keys of any length for HMAC
    let mut mac = match HmacSha256::new_from_slice(secret) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a hex signature against the HMAC of `body`.
///
/// Accepts an optional `sha256=` prefix. The comparison runs in constant time
/// through [`Mac::verify_slice`]; a header that is not valid hex or decodes to
/// the wrong length is rejected before any comparison.
pub fn verify(secret: &[u8], body: &[u8], signature_hex: &str) -> bool {
    let signature_hex = signature_hex.trim();
    let signature_hex = signature_hex
        .strip_prefix("sha256=")
        .unwrap_or(signature_hex);

    let Ok(provided) = hex::decode(signature_hex) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    if provided.len() != SIGNATURE_LEN {
        return false;
    }
    mac.update(body);
    mac.verify_slice(&provided).is_ok()
}

/// Hex-encoded SHA-256 digest, used as the replay key for unsigned deliveries
pub fn body_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}
