//! Chunked RSA-OAEP body encryption.
//!
//! Keys load via `rsa::pkcs1::DecodeRsaPrivateKey` with a PKCS#8 fallback
//! path, the same tolerant loading most RSA key handling needs since a
//! PEM file in the wild could be encoded either way. A metrics body can
//! exceed a single RSA block, so payloads are split into fixed-size
//! chunks before encryption and reassembled from a length-prefixed
//! stream after decryption.

use rand::rngs::OsRng;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use std::io::{Cursor, Read};

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid PEM private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid PEM public key: {0}")]
    InvalidPublicKey(String),

    #[error("RSA-OAEP encryption failed: {0}")]
    Encrypt(String),

    #[error("RSA-OAEP decryption failed: {0}")]
    Decrypt(String),

    #[error("encrypted stream is truncated or malformed")]
    Framing,
}

/// Load an RSA private key from PEM, trying PKCS#1 first and falling back
/// to PKCS#8 — mirroring how keys are actually handed out by `openssl genrsa`
/// versus `openssl genpkey`.
pub fn load_private_key(pem: &str) -> Result<RsaPrivateKey, CipherError> {
    let pem = pem.trim();
    if pem.is_empty() || !pem.contains("-----BEGIN") {
        return Err(CipherError::InvalidPrivateKey(
            "PEM string is empty or missing BEGIN marker".to_string(),
        ));
    }

    RsaPrivateKey::from_pkcs1_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
        .map_err(|e| CipherError::InvalidPrivateKey(e.to_string()))
}

/// Load an RSA public key from a PKIX-encoded PEM (`-----BEGIN PUBLIC KEY-----`).
pub fn load_public_key(pem: &str) -> Result<RsaPublicKey, CipherError> {
    let pem = pem.trim();
    if pem.is_empty() || !pem.contains("-----BEGIN") {
        return Err(CipherError::InvalidPublicKey(
            "PEM string is empty or missing BEGIN marker".to_string(),
        ));
    }

    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CipherError::InvalidPublicKey(e.to_string()))
}

/// Maximum plaintext bytes per OAEP chunk for a 2048-bit key with a SHA-256
/// hash: `modulus_bytes - 2*hash_len - 2` = `256 - 64 - 2`.
const CHUNK_SIZE: usize = 190;

/// Encrypt `plaintext`, splitting it into `CHUNK_SIZE`-byte pieces so each
/// fits the recipient's RSA modulus regardless of payload length.
///
/// A plaintext that fits in a single OAEP block is emitted as the bare
/// ciphertext — exactly `key_size` bytes, no length prefix. Anything
/// longer is framed as a sequence of `[u16 BE chunk_len][chunk]` frames so
/// the receiver can tell the two cases apart by comparing the overall
/// ciphertext length to the key size.
pub fn encrypt(public_key: &RsaPublicKey, plaintext: &[u8]) -> Result<Vec<u8>, CipherError> {
    let mut rng = OsRng;

    let chunks: Vec<&[u8]> = if plaintext.is_empty() {
        vec![plaintext]
    } else {
        plaintext.chunks(CHUNK_SIZE).collect()
    };

    if let [single] = chunks[..] {
        return public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), single)
            .map_err(|e| CipherError::Encrypt(e.to_string()));
    }

    let mut out = Vec::new();
    for chunk in chunks {
        let encrypted = public_key
            .encrypt(&mut rng, Oaep::new::<Sha256>(), chunk)
            .map_err(|e| CipherError::Encrypt(e.to_string()))?;
        let len = u16::try_from(encrypted.len())
            .map_err(|_| CipherError::Encrypt("ciphertext chunk too large".to_string()))?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(&encrypted);
    }

    Ok(out)
}

/// Decrypt a stream produced by [`encrypt`], reassembling the chunks back
/// into the original plaintext.
///
/// A ciphertext exactly `key_size` bytes long is the unprefixed
/// single-chunk case; anything else is parsed as the length-prefixed
/// multi-chunk stream.
pub fn decrypt(private_key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
    if ciphertext.len() == private_key.size() {
        return private_key
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CipherError::Decrypt(e.to_string()));
    }

    let mut cursor = Cursor::new(ciphertext);
    let mut out = Vec::new();

    loop {
        let mut len_buf = [0u8; 2];
        match cursor.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(_) => return Err(CipherError::Framing),
        }
        let len = u16::from_be_bytes(len_buf) as usize;

        let mut chunk = vec![0u8; len];
        cursor.read_exact(&mut chunk).map_err(|_| CipherError::Framing)?;

        let padding = Oaep::new::<Sha256>();
        let decrypted = private_key
            .decrypt(padding, &chunk)
            .map_err(|e| CipherError::Decrypt(e.to_string()))?;
        out.extend_from_slice(&decrypted);
    }

    Ok(out)
}

#[cfg(test)]
#[path = "cipher_tests.rs"]
mod tests;
