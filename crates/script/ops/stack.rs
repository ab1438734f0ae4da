//! Constant pushes and stack manipulation.

use crate::{
    error::ScriptError,
    num::{decode_num, encode_num, is_truthy},
    stack::Stack,
};

// Constants

pub fn op_0(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.push(encode_num(0));
    Ok(true)
}

pub fn op_1negate(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.push(encode_num(-1));
    Ok(true)
}

/// OP_1 through OP_16 push their small number.
pub fn op_small_num(stack: &mut Stack, num: i64) -> Result<bool, ScriptError> {
    stack.push(encode_num(num));
    Ok(true)
}

// Alt stack

pub fn op_toaltstack(stack: &mut Stack, altstack: &mut Stack) -> Result<bool, ScriptError> {
    altstack.push(stack.pop()?);
    Ok(true)
}

pub fn op_fromaltstack(stack: &mut Stack, altstack: &mut Stack) -> Result<bool, ScriptError> {
    stack.push(altstack.pop().map_err(|_| ScriptError::AltStackUnderflow)?);
    Ok(true)
}

// Stack manipulation

pub fn op_2drop(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(2)?;
    stack.pop()?;
    stack.pop()?;
    Ok(true)
}

pub fn op_2dup(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(2)?;
    let (second, top) = (stack.peek(1)?.to_vec(), stack.peek(0)?.to_vec());
    stack.push(second);
    stack.push(top);
    Ok(true)
}

pub fn op_3dup(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(3)?;
    for depth in [2, 2, 2] {
        // Each push moves the originals one deeper.
        let element = stack.peek(depth)?.to_vec();
        stack.push(element);
    }
    Ok(true)
}

/// `x1 x2 x3 x4 -> x1 x2 x3 x4 x1 x2`
pub fn op_2over(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(4)?;
    let (a, b) = (stack.peek(3)?.to_vec(), stack.peek(2)?.to_vec());
    stack.push(a);
    stack.push(b);
    Ok(true)
}

/// `x1 x2 x3 x4 x5 x6 -> x3 x4 x5 x6 x1 x2`
pub fn op_2rot(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(6)?;
    let a = stack.remove(5)?;
    let b = stack.remove(4)?;
    stack.push(a);
    stack.push(b);
    Ok(true)
}

/// `x1 x2 x3 x4 -> x3 x4 x1 x2`
pub fn op_2swap(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(4)?;
    let a = stack.remove(3)?;
    let b = stack.remove(2)?;
    stack.push(a);
    stack.push(b);
    Ok(true)
}

pub fn op_ifdup(stack: &mut Stack) -> Result<bool, ScriptError> {
    let top = stack.peek(0)?;
    if is_truthy(top) {
        let copy = top.to_vec();
        stack.push(copy);
    }
    Ok(true)
}

pub fn op_depth(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.push(encode_num(stack.len() as i64));
    Ok(true)
}

pub fn op_drop(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.pop()?;
    Ok(true)
}

pub fn op_dup(stack: &mut Stack) -> Result<bool, ScriptError> {
    let top = stack.peek(0)?.to_vec();
    stack.push(top);
    Ok(true)
}

/// `x1 x2 -> x2`
pub fn op_nip(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.remove(1)?;
    Ok(true)
}

/// `x1 x2 -> x1 x2 x1`
pub fn op_over(stack: &mut Stack) -> Result<bool, ScriptError> {
    let second = stack.peek(1)?.to_vec();
    stack.push(second);
    Ok(true)
}

pub fn op_pick(stack: &mut Stack) -> Result<bool, ScriptError> {
    let n = decode_num(&stack.pop()?)?;
    let depth = usize::try_from(n).map_err(|_| ScriptError::StackUnderflow)?;
    let element = stack.peek(depth)?.to_vec();
    stack.push(element);
    Ok(true)
}

pub fn op_roll(stack: &mut Stack) -> Result<bool, ScriptError> {
    let n = decode_num(&stack.pop()?)?;
    let depth = usize::try_from(n).map_err(|_| ScriptError::StackUnderflow)?;
    let element = stack.remove(depth)?;
    stack.push(element);
    Ok(true)
}

/// `x1 x2 x3 -> x2 x3 x1`
pub fn op_rot(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.remove(2)?;
    stack.push(element);
    Ok(true)
}

pub fn op_swap(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.remove(1)?;
    stack.push(element);
    Ok(true)
}

/// `x1 x2 -> x2 x1 x2`
pub fn op_tuck(stack: &mut Stack) -> Result<bool, ScriptError> {
    stack.require(2)?;
    let top = stack.peek(0)?.to_vec();
    stack.insert(2, top)?;
    Ok(true)
}

/// Pushes the byte length of the top element without consuming it.
pub fn op_size(stack: &mut Stack) -> Result<bool, ScriptError> {
    let len = stack.peek(0)?.len();
    stack.push(encode_num(len as i64));
    Ok(true)
}
