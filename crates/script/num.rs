//! The script-number codec.
//!
//! Distinct from the wire varint: numbers on the stack are little-endian
//! magnitudes with the sign carried in the high bit of the last byte, and
//! zero is the empty byte string. Decoding accepts non-minimal encodings
//! (e.g. 0x0100 for 1), as the consensus rules do.

use super::error::ScriptError;

/// Encodes a number for the stack.
pub fn encode_num(num: i64) -> Vec<u8> {
    if num == 0 {
        return Vec::new();
    }
    let negative = num < 0;
    let mut abs = num.unsigned_abs();
    let mut result = Vec::new();
    while abs > 0 {
        result.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    // The top bit of the last byte is the sign; if the magnitude already
    // uses it, a padding byte is appended.
    let last = *result.last().expect("non-zero magnitude");
    if last & 0x80 != 0 {
        result.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *result.last_mut().expect("non-zero magnitude") |= 0x80;
    }
    result
}

/// Decodes a stack element as a number.
pub fn decode_num(element: &[u8]) -> Result<i64, ScriptError> {
    if element.is_empty() {
        return Ok(0);
    }
    if element.len() > 8 {
        return Err(ScriptError::NumberTooLong { len: element.len() });
    }
    let mut big_endian: Vec<u8> = element.to_vec();
    big_endian.reverse();

    let (negative, first) = if big_endian[0] & 0x80 != 0 {
        (true, big_endian[0] & 0x7f)
    } else {
        (false, big_endian[0])
    };
    let mut result = first as i64;
    for &byte in &big_endian[1..] {
        result = (result << 8) + byte as i64;
    }
    Ok(if negative { -result } else { result })
}

/// Bitcoin's CastToBool: any non-zero byte makes the element true, except
/// negative zero (a lone sign bit in the last byte).
pub fn is_truthy(element: &[u8]) -> bool {
    for (i, &byte) in element.iter().enumerate() {
        if byte != 0 {
            return !(i == element.len() - 1 && byte == 0x80);
        }
    }
    false
}
