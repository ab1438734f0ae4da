//! Hashing and signature opcodes.

use num_bigint::BigUint;
use tracing::debug;

use bitx_crypto::{
    ecdsa::Signature,
    hash::{hash160, hash256, ripemd160, sha1, sha256},
    secp256k1::S256Point,
};

use crate::{
    error::ScriptError,
    num::encode_num,
    stack::Stack,
};

use super::flow::op_verify;

pub fn op_ripemd160(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    stack.push(ripemd160(&element).to_vec());
    Ok(true)
}

pub fn op_sha1(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    stack.push(sha1(&element).to_vec());
    Ok(true)
}

pub fn op_sha256(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    stack.push(sha256(&element).to_vec());
    Ok(true)
}

pub fn op_hash160(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    stack.push(hash160(&element).to_vec());
    Ok(true)
}

pub fn op_hash256(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    stack.push(hash256(&element).to_vec());
    Ok(true)
}

/// Splits a stack signature element into its DER body, dropping the trailing
/// sighash byte.
fn strip_sighash(element: &[u8]) -> &[u8] {
    match element.split_last() {
        Some((_, der)) => der,
        None => element,
    }
}

/// Pops a SEC pubkey and a DER signature (with sighash byte) and pushes 1 or
/// 0 for the verification result. A malformed key or signature counts as a
/// failed verification, not an abort.
pub fn op_checksig(stack: &mut Stack, z: &BigUint) -> Result<bool, ScriptError> {
    let sec = stack.pop()?;
    let der = stack.pop()?;

    let valid = match (
        S256Point::parse(&sec),
        Signature::parse_der(strip_sighash(&der)),
    ) {
        (Ok(point), Ok(sig)) => point.verify(z, &sig),
        (point, sig) => {
            debug!(
                pubkey_ok = point.is_ok(),
                signature_ok = sig.is_ok(),
                "malformed data in OP_CHECKSIG"
            );
            false
        }
    };
    stack.push(encode_num(i64::from(valid)));
    Ok(true)
}

pub fn op_checksigverify(stack: &mut Stack, z: &BigUint) -> Result<bool, ScriptError> {
    op_checksig(stack, z)?;
    op_verify(stack)
}

/// Pops n, n pubkeys, m, m signatures, and one extra dummy element, the
/// historical off-by-one that consensus requires consuming. Pushes 1 iff
/// the m signatures match m distinct pubkeys in pubkey-list order.
pub fn op_checkmultisig(stack: &mut Stack, z: &BigUint) -> Result<bool, ScriptError> {
    let n = decode_count(stack)?;
    let mut secs = Vec::with_capacity(n);
    for _ in 0..n {
        secs.push(stack.pop()?);
    }
    let m = decode_count(stack)?;
    let mut ders = Vec::with_capacity(m);
    for _ in 0..m {
        ders.push(stack.pop()?);
    }
    // The off-by-one dummy element.
    stack.pop()?;

    stack.push(encode_num(i64::from(signatures_match(&secs, &ders, z))));
    Ok(true)
}

fn decode_count(stack: &mut Stack) -> Result<usize, ScriptError> {
    let n = crate::num::decode_num(&stack.pop()?)?;
    usize::try_from(n).map_err(|_| ScriptError::StackUnderflow)
}

fn signatures_match(secs: &[Vec<u8>], ders: &[Vec<u8>], z: &BigUint) -> bool {
    let mut points = Vec::with_capacity(secs.len());
    for sec in secs {
        match S256Point::parse(sec) {
            Ok(point) => points.push(point),
            Err(_) => return false,
        }
    }
    let mut sigs = Vec::with_capacity(ders.len());
    for der in ders {
        match Signature::parse_der(strip_sighash(der)) {
            Ok(sig) => sigs.push(sig),
            Err(_) => return false,
        }
    }

    // Each signature must match a pubkey further down the list than the
    // previous one; consuming the points as we scan enforces the ordering.
    let mut points = points.into_iter();
    'sigs: for sig in &sigs {
        for point in points.by_ref() {
            if point.verify(z, sig) {
                continue 'sigs;
            }
        }
        return false;
    }
    true
}

pub fn op_checkmultisigverify(stack: &mut Stack, z: &BigUint) -> Result<bool, ScriptError> {
    op_checkmultisig(stack, z)?;
    op_verify(stack)
}
