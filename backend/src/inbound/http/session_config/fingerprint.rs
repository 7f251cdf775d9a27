//! Log-safe identification of the session signing key.
//!
//! Startup logs the fingerprint so operators can tell which key a running
//! instance holds without the key material leaving the process.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

/// Bytes of the SHA-256 digest kept before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Truncated SHA-256 of the key's signing half, as 16 lowercase hex digits.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use edunexus::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
