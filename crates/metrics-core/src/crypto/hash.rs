//! HMAC-SHA256 request/response integrity.
//!
//! A sign/verify pair used by both ends of the wire, built on `hmac`/
//! `sha2` and a constant-time comparison. The empty-key/empty-signature
//! case is handled explicitly: both absent is treated as "no signature
//! required" rather than left to fall out of whatever the comparison
//! happens to do with two empty strings.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum HmacError {
    #[error("HMAC key is invalid")]
    InvalidKey,

    #[error("provided signature is not valid hex")]
    InvalidHex,

    #[error("HMAC-SHA256 digest does not match")]
    Mismatch,
}

/// Compute the lowercase-hex HMAC-SHA256 of `body` under `key`.
///
/// Used by the agent to populate the `HashSHA256` header, and by the
/// server-side verifier below to recompute the digest for comparison.
pub fn sign(body: &[u8], key: &str) -> Result<String, HmacError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| HmacError::InvalidKey)?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex-encoded HMAC-SHA256 signature against `body` under `key`.
///
/// An empty `key` together with an empty `signature` is treated as
/// valid — the explicit codification of "no HMAC configured, no
/// signature sent" rather than a coincidental pass. Callers enforce the
/// surrounding policy (missing header + key configured is allowed;
/// header present + no key is ignored) themselves; this function only
/// answers "does this digest match this key".
pub fn verify(body: &[u8], signature: &str, key: &str) -> Result<(), HmacError> {
    if key.is_empty() && signature.is_empty() {
        return Ok(());
    }

    let expected = hex::decode(signature).map_err(|_| HmacError::InvalidHex)?;
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| HmacError::InvalidKey)?;
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    if computed.ct_eq(&expected).into() {
        Ok(())
    } else {
        Err(HmacError::Mismatch)
    }
}

#[cfg(test)]
#[path = "hash_tests.rs"]
mod tests;
