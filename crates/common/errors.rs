use bitx_codec::error::CodecError;
use bitx_crypto::CryptoError;
use bitx_script::ScriptError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ChainError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("Transaction {0} not found")]
    NotFound(String),
    #[error("Transaction source failure: {0}")]
    Source(String),
    #[error("Input index {index} out of range for {len} inputs")]
    InputOutOfRange { index: usize, len: usize },
    #[error("Transaction value overflows")]
    ValueOverflow,
}
