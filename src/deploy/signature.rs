//! GitHub webhook signature verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the payload signature.
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

/// Computes the `sha256=<hex>` signature GitHub sends for `payload`.
#[must_use]
pub fn sign(secret: &[u8], payload: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload);
    Some(format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    ))
}

/// Checks a signature header against the raw payload.
///
/// Comparison runs in constant time. A missing header, a missing prefix or
/// malformed hex all fail.
#[must_use]
pub fn verify_signature(secret: &[u8], payload: &[u8], header: Option<&str>) -> bool {
    let Some(digest) = header.and_then(|h| h.trim().strip_prefix(SIGNATURE_PREFIX)) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
