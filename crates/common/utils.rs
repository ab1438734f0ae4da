/// Reverses a 32-byte hash between wire order and display order.
///
/// Three fields cross this boundary: the previous-transaction hash in an
/// input, and the previous-block and merkle-root hashes in a header. The
/// reversal is applied exactly at encode/decode; in-memory values are always
/// display order.
pub fn reverse32(bytes: &[u8; 32]) -> [u8; 32] {
    let mut out = *bytes;
    out.reverse();
    out
}

/// Interprets up to eight little-endian bytes as an integer.
pub fn le_bytes_to_u64(bytes: &[u8]) -> u64 {
    let mut padded = [0u8; 8];
    let take = bytes.len().min(8);
    padded[..take].copy_from_slice(&bytes[..take]);
    u64::from_le_bytes(padded)
}
