use bytes::{BufMut, Bytes};

use super::varint::VarInt;

/// Function for encoding a value to the wire format.
/// For encoding the value into a buffer directly, use [`WireEncode::encode`].
pub fn encode<T: WireEncode>(value: T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf
}

pub trait WireEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }

    fn length(&self) -> usize {
        self.encode_to_vec().len()
    }
}

// Integers are fixed-width little-endian on the wire, unlike the
// big-endian compact representation used by count prefixes (see `varint`).

impl WireEncode for u8 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u8(*self);
    }

    #[inline(always)]
    fn length(&self) -> usize {
        1
    }
}

impl WireEncode for u16 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u16_le(*self);
    }

    #[inline(always)]
    fn length(&self) -> usize {
        2
    }
}

impl WireEncode for u32 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u32_le(*self);
    }

    #[inline(always)]
    fn length(&self) -> usize {
        4
    }
}

impl WireEncode for u64 {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_u64_le(*self);
    }

    #[inline(always)]
    fn length(&self) -> usize {
        8
    }
}

// Fixed-size arrays are written raw, with no length prefix.
impl<const N: usize> WireEncode for [u8; N] {
    fn encode(&self, buf: &mut dyn BufMut) {
        buf.put_slice(self);
    }

    fn length(&self) -> usize {
        N
    }
}

// Variable-length byte strings carry a compact-size length prefix.
impl WireEncode for Vec<u8> {
    fn encode(&self, buf: &mut dyn BufMut) {
        VarInt(self.len() as u64).encode(buf);
        buf.put_slice(self);
    }
}

impl WireEncode for Bytes {
    fn encode(&self, buf: &mut dyn BufMut) {
        VarInt(self.len() as u64).encode(buf);
        buf.put_slice(self);
    }
}

/// Collections are encoded as a compact-size element count followed by the
/// elements back to back.
pub fn encode_list<T: WireEncode>(items: &[T], buf: &mut dyn BufMut) {
    VarInt(items.len() as u64).encode(buf);
    for item in items {
        item.encode(buf);
    }
}
