//! The outermost-first middleware chain applied to every request: request
//! logging, gzip framing, trusted-subnet admission, RSA-OAEP decryption,
//! HMAC verification, and a JSON content-type guard for the three JSON
//! endpoints.
//!
//! Each stage is a plain `axum::middleware::from_fn[_with_state]` function
//! rather than a `tower::Layer`, kept small and independently testable.

mod content_type;
mod decrypt;
mod gzip;
mod hmac;
mod logging;
mod subnet;

pub use content_type::require_json_content_type;
pub use decrypt::decrypt_body;
pub use gzip::gzip_framing;
pub use hmac::verify_hmac;
pub use logging::log_requests;
pub use subnet::admit_trusted_subnet;

/// Maximum request body size this service will buffer in memory while
/// running a middleware stage that needs the whole body (decompress,
/// decrypt, HMAC-verify). Metric payloads are small; this is generous
/// headroom, not a tuned limit.
pub(crate) const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// The bytes the HMAC stage verifies against: the gzip-compressed body as
/// it existed before decompression and before RSA-OAEP decryption, exactly
/// what the sender's `HashSHA256` header covers. The gzip stage captures
/// it on the way in; the decrypt stage overwrites it with the recovered
/// (still-gzipped) plaintext when the body was encrypted. Carried as a
/// request extension because by the time the HMAC middleware runs, the
/// body itself has already moved on to plain JSON.
#[derive(Clone)]
pub(crate) struct HmacInput(pub bytes::Bytes);
