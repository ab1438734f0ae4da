//! Base58 and Base58Check encodings.
//!
//! Base58 is base-conversion of the input magnitude into a 58-character
//! alphabet that omits the easily-confused 0/O and I/l, with leading zero
//! bytes preserved as leading '1' characters. Base58Check appends the first
//! four bytes of the double-SHA-256 of the payload as a checksum before
//! encoding.

use num_bigint::BigUint;
use num_traits::Zero;

use super::{error::CryptoError, hash::hash256};

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn encode(payload: &[u8]) -> String {
    let leading_zeros = payload.iter().take_while(|&&b| b == 0).count();

    let mut num = BigUint::from_bytes_be(payload);
    let base = BigUint::from(58u8);
    let mut digits = Vec::new();
    while !num.is_zero() {
        let rem = (&num % &base)
            .iter_u32_digits()
            .next()
            .unwrap_or(0) as usize;
        digits.push(ALPHABET[rem]);
        num /= &base;
    }

    let mut out = Vec::with_capacity(leading_zeros + digits.len());
    out.extend(std::iter::repeat_n(b'1', leading_zeros));
    out.extend(digits.iter().rev());
    // The alphabet is ASCII, so the bytes are valid UTF-8.
    String::from_utf8(out).expect("base58 alphabet is ASCII")
}

pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let leading_ones = s.bytes().take_while(|&b| b == b'1').count();

    let base = BigUint::from(58u8);
    let mut num = BigUint::zero();
    for c in s.chars() {
        let digit = ALPHABET
            .iter()
            .position(|&a| a as char == c)
            .ok_or(CryptoError::BadBase58(c))?;
        num = &num * &base + BigUint::from(digit);
    }

    let mut out = vec![0u8; leading_ones];
    if !num.is_zero() {
        out.extend(num.to_bytes_be());
    }
    Ok(out)
}

/// Base58 with a 4-byte double-SHA-256 checksum appended to the payload.
pub fn encode_check(payload: &[u8]) -> String {
    let checksum = &hash256(payload)[..4];
    let mut with_checksum = Vec::with_capacity(payload.len() + 4);
    with_checksum.extend_from_slice(payload);
    with_checksum.extend_from_slice(checksum);
    encode(&with_checksum)
}

/// Decodes a Base58Check string, verifying and stripping the checksum.
pub fn decode_check(s: &str) -> Result<Vec<u8>, CryptoError> {
    let decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(CryptoError::BadChecksum);
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    if &hash256(payload)[..4] != checksum {
        return Err(CryptoError::BadChecksum);
    }
    Ok(payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn encode_known_vectors() {
        assert_eq!(
            encode(&hex!(
                "7c076ff316692a3d7eb3c3bb0f8b1488cf72e1afcd929e29307032997a838a3d"
            )),
            "9MA8fRQrT4u8Zj8ZRd6MAiiyaxb2Y1CMpvVkHQu5hVM6"
        );
        assert_eq!(
            encode(&hex!(
                "eff69ef2b1bd93a66ed5219add4fb51e11a840f404876325a1e8ffe0529a2c"
            )),
            "4fE3H2E6XMp4SsxtwinF7w9a34ooUrwWe4WsW1458Pd"
        );
        assert_eq!(
            encode(&hex!(
                "c7207fee197d27c618aea621406f6bf5ef6fca38681d82b2f06fddbdce6feab6"
            )),
            "EQJsjkd6JaGwxrjEhfeqPenqHwrBmPQZjJGNSCHBkcF7"
        );
    }

    #[test]
    fn leading_zeros_become_ones() {
        assert_eq!(encode(&[0, 0, 1]), "112");
        assert_eq!(decode("112").unwrap(), vec![0, 0, 1]);
    }

    #[test]
    fn decode_rejects_bad_characters() {
        assert_eq!(decode("0abc"), Err(CryptoError::BadBase58('0')));
        assert_eq!(decode("Il"), Err(CryptoError::BadBase58('I')));
    }

    #[test]
    fn check_roundtrip() {
        let payload = hex!("6f74d691da1574e6b3c192ecfb52cc8984ee7b6c56");
        let encoded = encode_check(&payload);
        assert_eq!(decode_check(&encoded).unwrap(), payload);
    }

    #[test]
    fn check_rejects_corruption() {
        let payload = hex!("6f74d691da1574e6b3c192ecfb52cc8984ee7b6c56");
        let mut encoded = encode_check(&payload).into_bytes();
        // Flip one digit of the body.
        encoded[5] = if encoded[5] == b'2' { b'3' } else { b'2' };
        let corrupted = String::from_utf8(encoded).unwrap();
        assert_eq!(decode_check(&corrupted), Err(CryptoError::BadChecksum));
    }

    #[test]
    fn mainnet_address_payload() {
        // Version byte 0x00 keeps its leading '1' in the address.
        let payload = hex!("00f54a5851e9372b87810a8e60cdd2e7cfd80b6e31");
        assert_eq!(encode_check(&payload), "1PMycacnJaSqwwJqjawXBErnLsZ7RkXUAs");
    }
}
