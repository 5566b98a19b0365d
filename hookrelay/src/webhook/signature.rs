//! GitHub webhook signature verification using HMAC-SHA256.
//!
//! GitHub signs every delivery with the destination's shared secret and sends
//! the digest in `X-Hub-Signature-256` as `sha256=<hex>`. Verification runs
//! before anything else touches the body.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Parses a signature header (`sha256=<hex>`) into raw bytes.
///
/// Returns `None` for a missing prefix, another algorithm or invalid hex.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}

fn keyed(secret: &[u8]) -> Option<HmacSha256> {
    // HMAC accepts keys of any length; the error arm is unreachable in practice.
    HmacSha256::new_from_slice(secret).ok()
}

/// Computes the HMAC-SHA256 of `payload` keyed by `secret`.
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> Vec<u8> {
    keyed(secret)
        .map(|mut mac| {
            mac.update(payload);
            mac.finalize().into_bytes().to_vec()
        })
        .unwrap_or_default()
}

/// Formats a signature as a GitHub-style header value.
pub fn format_signature_header(signature: &[u8]) -> String {
    format!("sha256={}", hex::encode(signature))
}

/// Verifies a webhook signature against the payload and secret.
///
/// The digest comparison is constant-time (`Mac::verify_slice`). Malformed
/// headers are rejections, never panics.
pub fn verify_signature(payload: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    let Some(expected) = parse_signature_header(signature_header) else {
        return false;
    };
    let Some(mut mac) = keyed(secret) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}
