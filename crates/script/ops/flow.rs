//! Flow control: OP_NOP, OP_IF / OP_NOTIF / OP_ELSE / OP_ENDIF, OP_VERIFY,
//! OP_RETURN.

use std::collections::VecDeque;

use crate::{
    error::ScriptError,
    num::is_truthy,
    opcode,
    script::Cmd,
    stack::Stack,
};

pub fn op_nop(_stack: &mut Stack) -> Result<bool, ScriptError> {
    Ok(true)
}

/// Splits the commands up to the matching OP_ENDIF into the true and false
/// branches, tracking nesting. The branch commands are removed from `cmds`.
fn partition_branches(
    cmds: &mut VecDeque<Cmd>,
) -> Result<(Vec<Cmd>, Vec<Cmd>), ScriptError> {
    let mut true_branch = Vec::new();
    let mut false_branch = Vec::new();
    let mut in_false = false;
    let mut depth = 1usize;

    while let Some(cmd) = cmds.pop_front() {
        match cmd {
            Cmd::Op(op @ (opcode::OP_IF | opcode::OP_NOTIF)) => {
                depth += 1;
                current(&mut true_branch, &mut false_branch, in_false).push(Cmd::Op(op));
            }
            Cmd::Op(opcode::OP_ELSE) if depth == 1 => {
                in_false = true;
            }
            Cmd::Op(opcode::OP_ENDIF) => {
                if depth == 1 {
                    return Ok((true_branch, false_branch));
                }
                depth -= 1;
                current(&mut true_branch, &mut false_branch, in_false)
                    .push(Cmd::Op(opcode::OP_ENDIF));
            }
            other => current(&mut true_branch, &mut false_branch, in_false).push(other),
        }
    }
    Err(ScriptError::UnterminatedConditional)
}

fn current<'a>(
    true_branch: &'a mut Vec<Cmd>,
    false_branch: &'a mut Vec<Cmd>,
    in_false: bool,
) -> &'a mut Vec<Cmd> {
    if in_false { false_branch } else { true_branch }
}

fn run_branch(cmds: &mut VecDeque<Cmd>, branch: Vec<Cmd>) {
    for cmd in branch.into_iter().rev() {
        cmds.push_front(cmd);
    }
}

pub fn op_if(stack: &mut Stack, cmds: &mut VecDeque<Cmd>) -> Result<bool, ScriptError> {
    let (true_branch, false_branch) = partition_branches(cmds)?;
    let condition = stack.pop()?;
    if is_truthy(&condition) {
        run_branch(cmds, true_branch);
    } else {
        run_branch(cmds, false_branch);
    }
    Ok(true)
}

pub fn op_notif(stack: &mut Stack, cmds: &mut VecDeque<Cmd>) -> Result<bool, ScriptError> {
    let (true_branch, false_branch) = partition_branches(cmds)?;
    let condition = stack.pop()?;
    if is_truthy(&condition) {
        run_branch(cmds, false_branch);
    } else {
        run_branch(cmds, true_branch);
    }
    Ok(true)
}

pub fn op_verify(stack: &mut Stack) -> Result<bool, ScriptError> {
    let element = stack.pop()?;
    Ok(is_truthy(&element))
}

pub fn op_return(_stack: &mut Stack) -> Result<bool, ScriptError> {
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::encode_num;

    fn cmds_of(ops: &[u8]) -> VecDeque<Cmd> {
        ops.iter().map(|&op| Cmd::Op(op)).collect()
    }

    #[test]
    fn if_takes_true_branch() {
        let mut stack = Stack::new();
        stack.push(encode_num(1));
        let mut cmds = cmds_of(&[opcode::OP_2, opcode::OP_ELSE, opcode::OP_3, opcode::OP_ENDIF]);
        assert!(op_if(&mut stack, &mut cmds).unwrap());
        assert_eq!(cmds, cmds_of(&[opcode::OP_2]));
    }

    #[test]
    fn if_takes_false_branch() {
        let mut stack = Stack::new();
        stack.push(encode_num(0));
        let mut cmds = cmds_of(&[opcode::OP_2, opcode::OP_ELSE, opcode::OP_3, opcode::OP_ENDIF]);
        assert!(op_if(&mut stack, &mut cmds).unwrap());
        assert_eq!(cmds, cmds_of(&[opcode::OP_3]));
    }

    #[test]
    fn notif_inverts_the_condition() {
        let mut stack = Stack::new();
        stack.push(encode_num(0));
        let mut cmds = cmds_of(&[opcode::OP_2, opcode::OP_ELSE, opcode::OP_3, opcode::OP_ENDIF]);
        assert!(op_notif(&mut stack, &mut cmds).unwrap());
        assert_eq!(cmds, cmds_of(&[opcode::OP_2]));
    }

    #[test]
    fn nested_conditionals_keep_their_markers() {
        let mut stack = Stack::new();
        stack.push(encode_num(1));
        // IF <2> IF <3> ENDIF ENDIF ... outer true branch keeps the inner IF.
        let mut cmds = cmds_of(&[
            opcode::OP_2,
            opcode::OP_IF,
            opcode::OP_3,
            opcode::OP_ENDIF,
            opcode::OP_ENDIF,
        ]);
        assert!(op_if(&mut stack, &mut cmds).unwrap());
        assert_eq!(
            cmds,
            cmds_of(&[opcode::OP_2, opcode::OP_IF, opcode::OP_3, opcode::OP_ENDIF])
        );
    }

    #[test]
    fn missing_endif_is_an_error() {
        let mut stack = Stack::new();
        stack.push(encode_num(1));
        let mut cmds = cmds_of(&[opcode::OP_2]);
        assert_eq!(
            op_if(&mut stack, &mut cmds),
            Err(ScriptError::UnterminatedConditional)
        );
    }

    #[test]
    fn verify_consumes_and_checks() {
        let mut stack = Stack::new();
        stack.push(encode_num(1));
        assert!(op_verify(&mut stack).unwrap());
        stack.push(encode_num(0));
        assert!(!op_verify(&mut stack).unwrap());
        assert_eq!(op_verify(&mut stack), Err(ScriptError::StackUnderflow));
    }

    #[test]
    fn return_always_fails() {
        let mut stack = Stack::new();
        assert!(!op_return(&mut stack).unwrap());
    }
}
