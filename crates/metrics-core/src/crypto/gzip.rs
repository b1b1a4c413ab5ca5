//! gzip compression helpers shared by the agent's dispatcher and the
//! server's gzip middleware.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

#[derive(Debug, thiserror::Error)]
pub enum GzipError {
    #[error("failed to compress payload: {0}")]
    Compress(#[source] std::io::Error),

    #[error("failed to decompress payload: {0}")]
    Decompress(#[source] std::io::Error),
}

/// Compress `bytes` with the default compression level.
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, GzipError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).map_err(GzipError::Compress)?;
    encoder.finish().map_err(GzipError::Compress)
}

/// Decompress a gzip-encoded byte string.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, GzipError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(GzipError::Decompress)?;
    Ok(out)
}

#[cfg(test)]
#[path = "gzip_tests.rs"]
mod tests;
