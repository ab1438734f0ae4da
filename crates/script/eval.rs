//! The script evaluation loop.

use std::collections::VecDeque;

use num_bigint::BigUint;
use tracing::{debug, trace};

use crate::{
    error::ScriptError,
    num::is_truthy,
    opcode,
    ops::{arithmetic, crypto, flow, locktime, stack as stack_ops},
    script::{Cmd, Script},
    stack::Stack,
};

/// Consensus cap on a stack element.
pub const MAX_ELEMENT_SIZE: usize = 520;

/// The transaction fields the timelock opcodes compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    pub locktime: u32,
    pub sequence: u32,
    pub version: u32,
}

impl Default for TxContext {
    fn default() -> Self {
        // A final sequence, matching an input that opted out of timelocks.
        Self {
            locktime: 0,
            sequence: 0xffff_ffff,
            version: 1,
        }
    }
}

impl Script {
    /// Runs the commands against fresh stacks. Returns `Ok(true)` iff every
    /// command succeeds and the stack ends with a truthy top element;
    /// `Ok(false)` for a failed predicate; `Err` for ill-formed scripts.
    ///
    /// `z` is the signature hash the signature opcodes verify against.
    pub fn evaluate(&self, z: &BigUint, ctx: &TxContext) -> Result<bool, ScriptError> {
        let mut cmds: VecDeque<Cmd> = self.cmds().iter().cloned().collect();
        let mut stack = Stack::new();
        let mut altstack = Stack::new();

        while let Some(cmd) = cmds.pop_front() {
            match cmd {
                Cmd::Data(element) => {
                    if element.len() > MAX_ELEMENT_SIZE {
                        return Err(ScriptError::ElementTooLong {
                            len: element.len(),
                        });
                    }
                    trace!(len = element.len(), "push data element");
                    let p2sh_hash = p2sh_tail(&cmds);
                    stack.push(element.clone());
                    // BIP 16: when the remaining commands are exactly
                    // `OP_HASH160 <h160> OP_EQUAL`, the element just pushed
                    // is a redeem script. Check its hash, then splice its
                    // commands in.
                    if let Some(h160) = p2sh_hash {
                        cmds.clear();
                        crypto::op_hash160(&mut stack)?;
                        stack.push(h160);
                        if !arithmetic::op_equalverify(&mut stack)? {
                            debug!("redeem script hash mismatch");
                            return Ok(false);
                        }
                        let redeem = parse_redeem_script(&element)?;
                        cmds.extend(redeem.cmds().iter().cloned());
                    }
                }
                Cmd::Op(op) => {
                    trace!(op = opcode::name(op).unwrap_or("unknown"), "execute");
                    if !execute(op, &mut stack, &mut altstack, &mut cmds, z, ctx)? {
                        debug!(
                            op = opcode::name(op).unwrap_or("unknown"),
                            "script predicate failed"
                        );
                        return Ok(false);
                    }
                }
            }
        }

        match stack.pop() {
            Ok(top) => Ok(is_truthy(&top)),
            Err(_) => Ok(false),
        }
    }
}

/// Returns the script hash if the remaining commands are exactly the P2SH
/// pattern `OP_HASH160 <20-byte hash> OP_EQUAL`.
fn p2sh_tail(cmds: &VecDeque<Cmd>) -> Option<Vec<u8>> {
    if cmds.len() != 3 {
        return None;
    }
    match (&cmds[0], &cmds[1], &cmds[2]) {
        (Cmd::Op(opcode::OP_HASH160), Cmd::Data(h160), Cmd::Op(opcode::OP_EQUAL))
            if h160.len() == 20 =>
        {
            Some(h160.clone())
        }
        _ => None,
    }
}

/// Re-parses a redeem script element as a script of its own.
fn parse_redeem_script(element: &[u8]) -> Result<Script, ScriptError> {
    use bitx_codec::{encode::WireEncode, varint::VarInt};

    let mut prefixed = Vec::with_capacity(element.len() + 9);
    VarInt(element.len() as u64).encode(&mut prefixed);
    prefixed.extend_from_slice(element);
    let (redeem, _) = Script::parse(&prefixed)?;
    Ok(redeem)
}

/// Routes an opcode byte to its handler with the context it needs.
fn execute(
    op: u8,
    stack: &mut Stack,
    altstack: &mut Stack,
    cmds: &mut VecDeque<Cmd>,
    z: &BigUint,
    ctx: &TxContext,
) -> Result<bool, ScriptError> {
    use opcode::*;

    match op {
        OP_0 => stack_ops::op_0(stack),
        OP_1NEGATE => stack_ops::op_1negate(stack),
        OP_1..=OP_16 => stack_ops::op_small_num(stack, i64::from(op - OP_1 + 1)),

        OP_NOP => flow::op_nop(stack),
        OP_IF => flow::op_if(stack, cmds),
        OP_NOTIF => flow::op_notif(stack, cmds),
        OP_ELSE | OP_ENDIF => Err(ScriptError::UnbalancedConditional),
        OP_VERIFY => flow::op_verify(stack),
        OP_RETURN => flow::op_return(stack),

        OP_TOALTSTACK => stack_ops::op_toaltstack(stack, altstack),
        OP_FROMALTSTACK => stack_ops::op_fromaltstack(stack, altstack),
        OP_2DROP => stack_ops::op_2drop(stack),
        OP_2DUP => stack_ops::op_2dup(stack),
        OP_3DUP => stack_ops::op_3dup(stack),
        OP_2OVER => stack_ops::op_2over(stack),
        OP_2ROT => stack_ops::op_2rot(stack),
        OP_2SWAP => stack_ops::op_2swap(stack),
        OP_IFDUP => stack_ops::op_ifdup(stack),
        OP_DEPTH => stack_ops::op_depth(stack),
        OP_DROP => stack_ops::op_drop(stack),
        OP_DUP => stack_ops::op_dup(stack),
        OP_NIP => stack_ops::op_nip(stack),
        OP_OVER => stack_ops::op_over(stack),
        OP_PICK => stack_ops::op_pick(stack),
        OP_ROLL => stack_ops::op_roll(stack),
        OP_ROT => stack_ops::op_rot(stack),
        OP_SWAP => stack_ops::op_swap(stack),
        OP_TUCK => stack_ops::op_tuck(stack),
        OP_SIZE => stack_ops::op_size(stack),

        OP_EQUAL => arithmetic::op_equal(stack),
        OP_EQUALVERIFY => arithmetic::op_equalverify(stack),
        OP_1ADD => arithmetic::op_1add(stack),
        OP_1SUB => arithmetic::op_1sub(stack),
        OP_NEGATE => arithmetic::op_negate(stack),
        OP_ABS => arithmetic::op_abs(stack),
        OP_NOT => arithmetic::op_not(stack),
        OP_0NOTEQUAL => arithmetic::op_0notequal(stack),
        OP_ADD => arithmetic::op_add(stack),
        OP_SUB => arithmetic::op_sub(stack),
        OP_MUL => arithmetic::op_mul(stack),
        OP_BOOLAND => arithmetic::op_booland(stack),
        OP_BOOLOR => arithmetic::op_boolor(stack),
        OP_NUMEQUAL => arithmetic::op_numequal(stack),
        OP_NUMEQUALVERIFY => arithmetic::op_numequalverify(stack),
        OP_NUMNOTEQUAL => arithmetic::op_numnotequal(stack),
        OP_LESSTHAN => arithmetic::op_lessthan(stack),
        OP_GREATERTHAN => arithmetic::op_greaterthan(stack),
        OP_LESSTHANOREQUAL => arithmetic::op_lessthanorequal(stack),
        OP_GREATERTHANOREQUAL => arithmetic::op_greaterthanorequal(stack),
        OP_MIN => arithmetic::op_min(stack),
        OP_MAX => arithmetic::op_max(stack),
        OP_WITHIN => arithmetic::op_within(stack),

        OP_RIPEMD160 => crypto::op_ripemd160(stack),
        OP_SHA1 => crypto::op_sha1(stack),
        OP_SHA256 => crypto::op_sha256(stack),
        OP_HASH160 => crypto::op_hash160(stack),
        OP_HASH256 => crypto::op_hash256(stack),
        OP_CHECKSIG => crypto::op_checksig(stack, z),
        OP_CHECKSIGVERIFY => crypto::op_checksigverify(stack, z),
        OP_CHECKMULTISIG => crypto::op_checkmultisig(stack, z),
        OP_CHECKMULTISIGVERIFY => crypto::op_checkmultisigverify(stack, z),

        OP_CHECKLOCKTIMEVERIFY => locktime::op_checklocktimeverify(stack, ctx),
        OP_CHECKSEQUENCEVERIFY => locktime::op_checksequenceverify(stack, ctx),

        other => Err(ScriptError::BadOpcode(other)),
    }
}
