//! BIP 65 / BIP 112 timelock opcodes.
//!
//! Both inspect the top stack element without consuming it and compare it
//! against fields of the spending transaction. A failed comparison is a
//! failed predicate (`Ok(false)`), not an abort.

use crate::{error::ScriptError, eval::TxContext, num::decode_num, stack::Stack};

/// Block heights live below this threshold, unix timestamps at or above it.
/// A locktime and a stack operand on different sides are incomparable.
pub const LOCKTIME_THRESHOLD: i64 = 500_000_000;

const SEQUENCE_DISABLE_FLAG: u32 = 1 << 31;
const SEQUENCE_TYPE_FLAG: u32 = 1 << 22;
const SEQUENCE_MASK: u32 = 0xffff;

/// OP_CHECKLOCKTIMEVERIFY (BIP 65).
pub fn op_checklocktimeverify(stack: &mut Stack, ctx: &TxContext) -> Result<bool, ScriptError> {
    if ctx.sequence == 0xffff_ffff {
        // A final input disables locktime entirely.
        return Ok(false);
    }
    let element = decode_num(stack.peek(0)?)?;
    if element < 0 {
        return Ok(false);
    }
    let locktime = i64::from(ctx.locktime);
    if (element < LOCKTIME_THRESHOLD) != (locktime < LOCKTIME_THRESHOLD) {
        return Ok(false);
    }
    Ok(locktime >= element)
}

/// OP_CHECKSEQUENCEVERIFY (BIP 112). The relative-lock comparison only
/// applies when the operand's disable flag is clear; the type flag and the
/// low 16 bits must then be compatible with the input's sequence.
pub fn op_checksequenceverify(stack: &mut Stack, ctx: &TxContext) -> Result<bool, ScriptError> {
    if ctx.sequence & SEQUENCE_DISABLE_FLAG != 0 {
        return Ok(false);
    }
    let element = decode_num(stack.peek(0)?)?;
    if element < 0 {
        return Ok(false);
    }
    let element = element as u64;
    if element & u64::from(SEQUENCE_DISABLE_FLAG) == 0 {
        if ctx.version < 2 {
            return Ok(false);
        }
        if element as u32 & SEQUENCE_TYPE_FLAG != ctx.sequence & SEQUENCE_TYPE_FLAG {
            return Ok(false);
        }
        if element as u32 & SEQUENCE_MASK > ctx.sequence & SEQUENCE_MASK {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::encode_num;

    fn stack_with(num: i64) -> Stack {
        let mut stack = Stack::new();
        stack.push(encode_num(num));
        stack
    }

    #[test]
    fn cltv_final_sequence_disables() {
        let ctx = TxContext {
            locktime: 1000,
            sequence: 0xffff_ffff,
            version: 1,
        };
        assert!(!op_checklocktimeverify(&mut stack_with(500), &ctx).unwrap());
    }

    #[test]
    fn cltv_height_comparison() {
        let ctx = TxContext {
            locktime: 1000,
            sequence: 0xffff_fffe,
            version: 1,
        };
        assert!(op_checklocktimeverify(&mut stack_with(500), &ctx).unwrap());
        assert!(op_checklocktimeverify(&mut stack_with(1000), &ctx).unwrap());
        assert!(!op_checklocktimeverify(&mut stack_with(1001), &ctx).unwrap());
        assert!(!op_checklocktimeverify(&mut stack_with(-1), &ctx).unwrap());
    }

    #[test]
    fn cltv_rejects_mixed_thresholds() {
        let ctx = TxContext {
            locktime: 1_600_000_000,
            sequence: 0,
            version: 1,
        };
        // Height operand against a timestamp locktime.
        assert!(!op_checklocktimeverify(&mut stack_with(400_000), &ctx).unwrap());
        // Timestamp operand in range passes.
        assert!(
            op_checklocktimeverify(&mut stack_with(1_500_000_000), &ctx).unwrap()
        );
    }

    #[test]
    fn cltv_needs_an_operand() {
        let ctx = TxContext {
            locktime: 1000,
            sequence: 0,
            version: 1,
        };
        assert_eq!(
            op_checklocktimeverify(&mut Stack::new(), &ctx),
            Err(ScriptError::StackUnderflow)
        );
    }

    #[test]
    fn csv_disabled_sequence_fails() {
        let ctx = TxContext {
            locktime: 0,
            sequence: SEQUENCE_DISABLE_FLAG,
            version: 2,
        };
        assert!(!op_checksequenceverify(&mut stack_with(10), &ctx).unwrap());
    }

    #[test]
    fn csv_disabled_operand_is_a_nop() {
        let ctx = TxContext {
            locktime: 0,
            sequence: 5,
            version: 1,
        };
        // Operand with the disable flag set skips every check.
        assert!(
            op_checksequenceverify(&mut stack_with(i64::from(1u32 << 31)), &ctx).unwrap()
        );
    }

    #[test]
    fn csv_relative_height() {
        let ctx = TxContext {
            locktime: 0,
            sequence: 20,
            version: 2,
        };
        assert!(op_checksequenceverify(&mut stack_with(10), &ctx).unwrap());
        assert!(op_checksequenceverify(&mut stack_with(20), &ctx).unwrap());
        assert!(!op_checksequenceverify(&mut stack_with(30), &ctx).unwrap());
    }

    #[test]
    fn csv_requires_version_two() {
        let ctx = TxContext {
            locktime: 0,
            sequence: 20,
            version: 1,
        };
        assert!(!op_checksequenceverify(&mut stack_with(10), &ctx).unwrap());
    }

    #[test]
    fn csv_type_flag_must_match() {
        let ctx = TxContext {
            locktime: 0,
            sequence: 20,
            version: 2,
        };
        let time_based = i64::from(SEQUENCE_TYPE_FLAG) + 10;
        assert!(!op_checksequenceverify(&mut stack_with(time_based), &ctx).unwrap());
    }
}
