use bytes::BufMut;

use super::{decode::WireDecode, encode::WireEncode, error::CodecError};

/// # Struct decoding helper
///
/// Used to decode a struct from the wire format. The struct's fields must
/// implement [`WireDecode`] and are expected back to back in the order they
/// are passed to [`Decoder::decode_field`]; failures carry the field name.
///
/// # Examples
///
/// ```
/// # use bitx_codec::structs::Decoder;
/// # use bitx_codec::error::CodecError;
/// #[derive(Debug, PartialEq, Eq)]
/// struct Outpoint {
///     pub txid: [u8; 32],
///     pub index: u32,
/// }
///
/// impl Outpoint {
///     fn decode_unfinished(buf: &[u8]) -> Result<(Self, &[u8]), CodecError> {
///         let decoder = Decoder::new(buf);
///         // The fields are expected in the same order as given here
///         let (txid, decoder) = decoder.decode_field("txid")?;
///         let (index, decoder) = decoder.decode_field("index")?;
///         Ok((Outpoint { txid, index }, decoder.finish()))
///     }
/// }
///
/// let mut bytes = [0u8; 36];
/// bytes[32] = 7;
/// let (decoded, rest) = Outpoint::decode_unfinished(&bytes).unwrap();
/// assert_eq!(decoded.index, 7);
/// assert!(rest.is_empty());
/// ```
#[derive(Debug)]
#[must_use = "`Decoder` must be consumed with `finish` to recover the remaining bytes"]
pub struct Decoder<'a> {
    remaining: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { remaining: buf }
    }

    pub fn decode_field<T: WireDecode>(self, name: &'static str) -> Result<(T, Self), CodecError> {
        let (field, rest) = <T as WireDecode>::decode_unfinished(self.remaining)
            .map_err(|err| err.with_context(name))?;
        Ok((field, Self { remaining: rest }))
    }

    /// Decodes a field with a caller-supplied decoder, for fields whose wire
    /// form isn't a plain [`WireDecode`] implementation (e.g. reversed hashes).
    pub fn decode_field_with<T>(
        self,
        name: &'static str,
        f: impl FnOnce(&'a [u8]) -> Result<(T, &'a [u8]), CodecError>,
    ) -> Result<(T, Self), CodecError> {
        let (field, rest) = f(self.remaining).map_err(|err| err.with_context(name))?;
        Ok((field, Self { remaining: rest }))
    }

    /// Returns the bytes left after the decoded fields.
    pub const fn finish(self) -> &'a [u8] {
        self.remaining
    }
}

/// # Struct encoding helper
///
/// Writes fields back to back into the target buffer in the order they are
/// passed to [`Encoder::encode_field`].
///
/// # Examples
///
/// ```
/// # use bitx_codec::structs::Encoder;
/// let mut buf = vec![];
/// Encoder::new(&mut buf)
///     .encode_field(&1u32)
///     .encode_field(&2u8)
///     .finish();
/// assert_eq!(buf, vec![1, 0, 0, 0, 2]);
/// ```
#[must_use = "`Encoder` must be consumed with `finish`"]
pub struct Encoder<'a> {
    buf: &'a mut dyn BufMut,
}

// NOTE: BufMut doesn't implement Debug, so we can't derive Debug for Encoder.
impl core::fmt::Debug for Encoder<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Encoder").field("buf", &"...").finish()
    }
}

impl<'a> Encoder<'a> {
    pub fn new(buf: &'a mut dyn BufMut) -> Self {
        Self { buf }
    }

    pub fn encode_field<T: WireEncode>(self, value: &T) -> Self {
        <T as WireEncode>::encode(value, self.buf);
        self
    }

    /// Adds raw bytes to the buffer without a length prefix.
    pub fn encode_raw(self, value: &[u8]) -> Self {
        self.buf.put_slice(value);
        self
    }

    pub fn finish(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct Simple {
        pub a: u32,
        pub b: Vec<u8>,
    }

    #[test]
    fn test_decoder_simple_struct() {
        let buf = [0x2a, 0x00, 0x00, 0x00, 0x02, 0xaa, 0xbb, 0xff];

        let decoder = Decoder::new(&buf);
        let (a, decoder) = decoder.decode_field::<u32>("a").unwrap();
        let (b, decoder) = decoder.decode_field::<Vec<u8>>("b").unwrap();
        let rest = decoder.finish();

        assert_eq!(Simple { a, b }, Simple { a: 42, b: vec![0xaa, 0xbb] });
        assert_eq!(rest, &[0xff]);
    }

    #[test]
    fn test_decoder_error_names_field() {
        let buf = [0x2a, 0x00];
        let err = Decoder::new(&buf).decode_field::<u32>("version").unwrap_err();
        assert_eq!(err, CodecError::UnexpectedEof(Some("version")));
    }

    #[test]
    fn test_encoder_simple_struct() {
        let input = Simple { a: 42, b: vec![0xaa, 0xbb] };
        let mut buf = Vec::new();

        Encoder::new(&mut buf)
            .encode_field(&input.a)
            .encode_field(&input.b)
            .finish();

        assert_eq!(buf, vec![0x2a, 0x00, 0x00, 0x00, 0x02, 0xaa, 0xbb]);
    }
}
