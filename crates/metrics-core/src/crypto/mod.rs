//! # Cryptographic Framing
//!
//! gzip envelope, HMAC-SHA256 integrity header, and chunked RSA-OAEP body
//! encryption.

pub mod cipher;
pub mod gzip;
pub mod hash;
