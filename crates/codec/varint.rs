//! Bitcoin's compact-size integer codec.
//!
//! Values below 0xfd occupy a single byte. Larger values are tagged with a
//! discriminator byte (0xfd, 0xfe, 0xff) followed by a little-endian u16,
//! u32 or u64. Counts and length prefixes throughout the wire format use
//! this codec; it is unrelated to Protobuf varints.

use bytes::BufMut;

use super::{
    decode::{WireDecode, take},
    encode::WireEncode,
    error::CodecError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl WireEncode for VarInt {
    fn encode(&self, buf: &mut dyn BufMut) {
        match self.0 {
            0..=0xfc => buf.put_u8(self.0 as u8),
            0xfd..=0xffff => {
                buf.put_u8(0xfd);
                buf.put_u16_le(self.0 as u16);
            }
            0x10000..=0xffff_ffff => {
                buf.put_u8(0xfe);
                buf.put_u32_le(self.0 as u32);
            }
            _ => {
                buf.put_u8(0xff);
                buf.put_u64_le(self.0);
            }
        }
    }

    fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x10000..=0xffff_ffff => 5,
            _ => 9,
        }
    }
}

impl WireDecode for VarInt {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (first, rest) = take(buf, 1)?;
        match first[0] {
            0xfd => {
                let (value, rest) = u16::decode_unfinished(rest)?;
                Ok((VarInt(value as u64), rest))
            }
            0xfe => {
                let (value, rest) = u32::decode_unfinished(rest)?;
                Ok((VarInt(value as u64), rest))
            }
            0xff => {
                let (value, rest) = u64::decode_unfinished(rest)?;
                Ok((VarInt(value), rest))
            }
            b => Ok((VarInt(b as u64), rest)),
        }
    }
}

/// Convenience wrapper: reads a compact-size value off the front of `buf`.
pub fn read_varint(buf: &[u8]) -> Result<(u64, &[u8]), CodecError> {
    let (VarInt(value), rest) = VarInt::decode_unfinished(buf)?;
    Ok((value, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: u64) -> Vec<u8> {
        let encoded = VarInt(value).encode_to_vec();
        let decoded = VarInt::decode(&encoded).unwrap();
        assert_eq!(decoded.0, value);
        encoded
    }

    #[test]
    fn single_byte_range() {
        assert_eq!(roundtrip(0), vec![0x00]);
        assert_eq!(roundtrip(0xfc), vec![0xfc]);
    }

    #[test]
    fn two_byte_range() {
        assert_eq!(roundtrip(0xfd), vec![0xfd, 0xfd, 0x00]);
        assert_eq!(roundtrip(255), vec![0xfd, 0xff, 0x00]);
        assert_eq!(roundtrip(555), vec![0xfd, 0x2b, 0x02]);
        assert_eq!(roundtrip(0xffff), vec![0xfd, 0xff, 0xff]);
    }

    #[test]
    fn four_byte_range() {
        assert_eq!(roundtrip(0x10000), vec![0xfe, 0x00, 0x00, 0x01, 0x00]);
        assert_eq!(roundtrip(70015), vec![0xfe, 0x7f, 0x11, 0x01, 0x00]);
    }

    #[test]
    fn eight_byte_range() {
        assert_eq!(
            roundtrip(18005558675309),
            vec![0xff, 0x6d, 0xc7, 0xed, 0x3e, 0x60, 0x10, 0x00, 0x00]
        );
    }

    #[test]
    fn truncated_payload_fails() {
        assert_eq!(
            VarInt::decode(&[0xfd, 0x01]),
            Err(CodecError::unexpected_eof())
        );
    }
}
