use bytes::Bytes;

use super::{error::CodecError, varint::VarInt};

/// Trait for decoding wire-encoded slices of data.
/// The [`decode_unfinished`](WireDecode::decode_unfinished) method decodes a
/// value off the front of the slice and returns it along with the remaining
/// bytes. The [`decode`](WireDecode::decode) method additionally requires the
/// input to be fully consumed.
/// Implementors need to implement [`decode_unfinished`](WireDecode::decode_unfinished).
pub trait WireDecode: Sized {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError>;

    fn decode(buf: &[u8]) -> Result<Self, CodecError> {
        let (decoded, remaining) = Self::decode_unfinished(buf)?;
        if !remaining.is_empty() {
            return Err(CodecError::trailing_bytes());
        }

        Ok(decoded)
    }
}

/// Splits `n` bytes off the front of the slice, or fails if fewer remain.
pub fn take(buf: &[u8], n: usize) -> Result<(&[u8], &[u8]), CodecError> {
    if buf.len() < n {
        return Err(CodecError::unexpected_eof());
    }
    Ok(buf.split_at(n))
}

impl WireDecode for u8 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (bytes, rest) = take(buf, 1)?;
        Ok((bytes[0], rest))
    }
}

impl WireDecode for u16 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (bytes, rest) = take(buf, 2)?;
        let value = u16::from_le_bytes(bytes.try_into().map_err(|_| CodecError::invalid_length())?);
        Ok((value, rest))
    }
}

impl WireDecode for u32 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (bytes, rest) = take(buf, 4)?;
        let value = u32::from_le_bytes(bytes.try_into().map_err(|_| CodecError::invalid_length())?);
        Ok((value, rest))
    }
}

impl WireDecode for u64 {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (bytes, rest) = take(buf, 8)?;
        let value = u64::from_le_bytes(bytes.try_into().map_err(|_| CodecError::invalid_length())?);
        Ok((value, rest))
    }
}

impl<const N: usize> WireDecode for [u8; N] {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (bytes, rest) = take(buf, N)?;
        let value = bytes.try_into().map_err(|_| CodecError::invalid_length())?;
        Ok((value, rest))
    }
}

impl WireDecode for Vec<u8> {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (payload, rest) = decode_bytes(buf)?;
        Ok((payload.to_vec(), rest))
    }
}

impl WireDecode for Bytes {
    fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
        let (payload, rest) = decode_bytes(buf)?;
        Ok((Bytes::copy_from_slice(payload), rest))
    }
}

/// Decodes a varint-length-prefixed byte string, returning the payload and
/// the remaining bytes.
pub fn decode_bytes(buf: &[u8]) -> Result<(&[u8], &[u8]), CodecError> {
    let (VarInt(len), rest) = VarInt::decode_unfinished(buf)?;
    let len = usize::try_from(len).map_err(|_| CodecError::invalid_length())?;
    if rest.len() < len {
        return Err(CodecError::invalid_length());
    }
    Ok(rest.split_at(len))
}

/// Decodes a compact-size element count followed by that many elements.
pub fn decode_list<T: WireDecode>(buf: &[u8]) -> Result<(Vec<T>, &[u8]), CodecError> {
    let (VarInt(count), mut rest) = VarInt::decode_unfinished(buf)?;
    let count = usize::try_from(count).map_err(|_| CodecError::invalid_length())?;
    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let (item, new_rest) = T::decode_unfinished(rest)?;
        items.push(item);
        rest = new_rest;
    }
    Ok((items, rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_little_endian_integers() {
        assert_eq!(u32::decode(&[0x04, 0x03, 0x02, 0x01]).unwrap(), 0x01020304);
        assert_eq!(u16::decode(&[0xed, 0xfe]).unwrap(), 0xfeed);
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        assert_eq!(
            u8::decode(&[0x01, 0x02]),
            Err(CodecError::trailing_bytes())
        );
    }

    #[test]
    fn decode_rejects_truncated_input() {
        assert_eq!(
            u32::decode(&[0x01, 0x02]),
            Err(CodecError::unexpected_eof())
        );
    }

    #[test]
    fn decode_length_prefixed_bytes() {
        let (payload, rest) = decode_bytes(&[0x02, 0xab, 0xcd, 0xff]).unwrap();
        assert_eq!(payload, &[0xab, 0xcd]);
        assert_eq!(rest, &[0xff]);
    }

    #[test]
    fn declared_length_must_fit() {
        assert_eq!(
            decode_bytes(&[0x05, 0xab]),
            Err(CodecError::invalid_length())
        );
    }

    #[test]
    fn decode_counted_list() {
        let (items, rest) = decode_list::<u16>(&[0x02, 0x01, 0x00, 0x02, 0x00]).unwrap();
        assert_eq!(items, vec![1, 2]);
        assert!(rest.is_empty());
    }
}
