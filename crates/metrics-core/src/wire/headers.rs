//! HTTP framing header names shared by the agent's dispatcher and the
//! server's middleware chain.

/// `Content-Encoding: gzip` — body compression.
pub const CONTENT_ENCODING: &str = "Content-Encoding";

/// `Accept-Encoding: gzip` — response compression request.
pub const ACCEPT_ENCODING: &str = "Accept-Encoding";

/// `X-Real-IP` — client identity used for trusted-subnet admission.
/// Populated by the agent from its outbound interface address.
pub const X_REAL_IP: &str = "X-Real-IP";

/// `X-Encrypted: true` — body is RSA-OAEP chunked ciphertext.
pub const X_ENCRYPTED: &str = "X-Encrypted";

/// `HashSHA256` — hex-lowercase HMAC-SHA256 of the pre-encryption gzip body.
pub const HASH_SHA256: &str = "HashSHA256";
