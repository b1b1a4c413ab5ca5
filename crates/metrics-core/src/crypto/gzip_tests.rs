use super::*;

#[test]
fn compress_then_decompress_round_trips() {
    let payload = b"the quick brown fox jumps over the lazy dog".repeat(20);
    let compressed = compress(&payload).unwrap();
    assert!(compressed.len() < payload.len());
    let restored = decompress(&compressed).unwrap();
    assert_eq!(restored, payload);
}

#[test]
fn decompress_rejects_garbage() {
    let err = decompress(b"not gzip data").unwrap_err();
    assert!(matches!(err, GzipError::Decompress(_)));
}
