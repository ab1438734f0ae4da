//! Block headers, proof of work, and difficulty retargeting.
//!
//! A header is exactly 80 bytes. Every integer in it is little-endian
//! except `bits` and `nonce`, which the wire carries big-endian; the
//! previous-block and merkle-root hashes are byte-reversed between wire and
//! display order. Tests must keep covering the big-endian quirk.

use bytes::BufMut;
use num_bigint::BigUint;

use bitx_codec::{
    decode::WireDecode,
    encode::WireEncode,
    error::CodecError,
    structs::{Decoder, Encoder},
};
use bitx_crypto::hash::hash256;

use crate::utils::reverse32;

/// Seconds in the two-week retargeting window.
pub const TWO_WEEKS: u64 = 60 * 60 * 24 * 14;

/// The bits value of the minimum difficulty (the genesis target).
pub const LOWEST_BITS: u32 = 0xffff_001d;

/// Number of blocks between difficulty adjustments.
pub const RETARGET_INTERVAL: u32 = 2016;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: u32,
    /// Hash of the previous block, display order.
    pub prev_block: [u8; 32],
    /// Merkle root of the block's transactions, display order.
    pub merkle_root: [u8; 32],
    pub timestamp: u32,
    /// Compact target. Stored as the big-endian interpretation of the four
    /// wire bytes, so the exponent is the low byte.
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Parses an 80-byte header off the front of `buf`.
    pub fn parse(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        Self::decode_unfinished(buf)
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    /// The block hash in display order.
    pub fn hash(&self) -> [u8; 32] {
        reverse32(&hash256(&self.serialize()))
    }

    pub fn id(&self) -> String {
        hex::encode(self.hash())
    }

    /// BIP 9 readiness: the top three version bits are 001.
    pub fn bip9(&self) -> bool {
        self.version >> 29 == 0b001
    }

    /// BIP 91 signaling: version bit 4.
    pub fn bip91(&self) -> bool {
        self.version >> 4 & 1 == 1
    }

    /// BIP 141 (SegWit) signaling: version bit 1.
    pub fn bip141(&self) -> bool {
        self.version >> 1 & 1 == 1
    }

    /// The proof-of-work threshold this header's bits encode.
    pub fn target(&self) -> BigUint {
        bits_to_target(self.bits)
    }

    /// How many times harder than the minimum difficulty this target is.
    pub fn difficulty(&self) -> BigUint {
        bits_to_target(LOWEST_BITS) / self.target()
    }

    /// Whether the header hash clears its own target.
    pub fn check_pow(&self) -> bool {
        let proof = BigUint::from_bytes_be(&self.hash());
        proof < self.target()
    }

    /// Whether the given display-order txids produce this header's merkle
    /// root. The tree is computed over wire-order hashes.
    pub fn validate_merkle_root(&self, txids: &[[u8; 32]]) -> bool {
        let leaves: Vec<[u8; 32]> = txids.iter().map(reverse32).collect();
        match crate::merkle::merkle_root(&leaves) {
            Some(root) => reverse32(&root) == self.merkle_root,
            None => false,
        }
    }
}

impl WireEncode for BlockHeader {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.version)
            .encode_field(&reverse32(&self.prev_block))
            .encode_field(&reverse32(&self.merkle_root))
            .encode_field(&self.timestamp)
            // bits and nonce keep their historical big-endian order.
            .encode_raw(&self.bits.to_be_bytes())
            .encode_raw(&self.nonce.to_be_bytes())
            .finish();
    }
}

impl WireDecode for BlockHeader {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let decoder = Decoder::new(buf);
        let (version, decoder) = decoder.decode_field("version")?;
        let (wire_prev, decoder) = decoder.decode_field::<[u8; 32]>("prev_block")?;
        let (wire_merkle, decoder) = decoder.decode_field::<[u8; 32]>("merkle_root")?;
        let (timestamp, decoder) = decoder.decode_field("timestamp")?;
        let (bits_bytes, decoder) = decoder.decode_field::<[u8; 4]>("bits")?;
        let (nonce_bytes, decoder) = decoder.decode_field::<[u8; 4]>("nonce")?;
        Ok((
            Self {
                version,
                prev_block: reverse32(&wire_prev),
                merkle_root: reverse32(&wire_merkle),
                timestamp,
                bits: u32::from_be_bytes(bits_bytes),
                nonce: u32::from_be_bytes(nonce_bytes),
            },
            decoder.finish(),
        ))
    }
}

/// Expands a compact bits value into the 256-bit target:
/// `coefficient * 256^(exponent - 3)`, with the exponent in the low byte and
/// the coefficient little-endian in the high three.
pub fn bits_to_target(bits: u32) -> BigUint {
    let bytes = bits.to_be_bytes();
    let exponent = u32::from(bytes[3]);
    let coefficient = BigUint::from(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]));
    if exponent >= 3 {
        coefficient << (8 * (exponent - 3))
    } else {
        coefficient >> (8 * (3 - exponent))
    }
}

/// Compresses a target back into compact bits: strip leading zeros, pad a
/// zero byte back in when the top bit is set (the compact form is signed),
/// and keep the top three bytes as the coefficient.
pub fn target_to_bits(target: &BigUint) -> u32 {
    let raw = target.to_bytes_be();
    let raw = match raw.as_slice() {
        // BigUint serializes zero as a single zero byte.
        [0] => &[][..],
        bytes => bytes,
    };

    let (exponent, coefficient) = if raw.first().is_some_and(|&b| b > 0x7f) {
        (raw.len() + 1, [0x00, raw[0], *raw.get(1).unwrap_or(&0)])
    } else {
        (
            raw.len(),
            [
                *raw.first().unwrap_or(&0),
                *raw.get(1).unwrap_or(&0),
                *raw.get(2).unwrap_or(&0),
            ],
        )
    };
    u32::from_be_bytes([
        coefficient[2],
        coefficient[1],
        coefficient[0],
        exponent as u8,
    ])
}

/// The retargeting rule: scale the previous target by the observed block
/// time of the 2016-block window, clamped to [half a week, eight weeks],
/// against the two-week ideal.
pub fn calculate_new_bits(prev_bits: u32, time_differential: u64) -> u32 {
    let time_differential = time_differential.clamp(TWO_WEEKS / 4, TWO_WEEKS * 4);
    let new_target = bits_to_target(prev_bits) * time_differential / TWO_WEEKS;
    target_to_bits(&new_target)
}
