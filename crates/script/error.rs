use bitx_codec::error::CodecError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ScriptError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Script body of {len} bytes exceeds the 10000 byte limit")]
    ScriptTooLong { len: usize },
    #[error("Script declared {declared} bytes but parsing consumed {consumed}")]
    LengthMismatch { declared: usize, consumed: usize },
    #[error("Data element of {len} bytes exceeds the 520 byte limit")]
    ElementTooLong { len: usize },
    #[error("Opcode 0x{0:02x} is invalid or unimplemented")]
    BadOpcode(u8),
    #[error("Stack underflow")]
    StackUnderflow,
    #[error("Alt stack underflow")]
    AltStackUnderflow,
    #[error("OP_ELSE or OP_ENDIF without a matching OP_IF")]
    UnbalancedConditional,
    #[error("OP_IF without a matching OP_ENDIF")]
    UnterminatedConditional,
    #[error("Script number of {len} bytes exceeds the 8 byte limit")]
    NumberTooLong { len: usize },
}
