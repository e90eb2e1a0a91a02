//! LINE webhook signature verification
//!
//! The `x-line-signature` header carries the base64 HMAC-SHA256 of the raw
//! request body, keyed with the channel secret.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the signature
pub const SIGNATURE_HEADER: &str = "x-line-signature";

/// Verify a webhook signature against the raw body
///
/// Comparison runs in constant time via [`Mac::verify_slice`].
#[must_use]
pub fn verify(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let signature = signature.trim();
    let signature = signature
        .strip_prefix("SHA256=")
        .or_else(|| signature.strip_prefix("sha256="))
        .unwrap_or(signature);

    let Ok(expected) = STANDARD.decode(signature) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the signature for a body (used by tests and local tooling)
#[must_use]
pub fn sign(channel_secret: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}
