use bitx_codec::error::CodecError;
use bitx_common::ChainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Transaction {0} not found")]
    NotFound(String),
    #[error("Fetched transaction reports id {got}, expected {expected}")]
    IdMismatch { expected: String, got: String },
    #[error("Response is not valid hex: {0}")]
    BadHex(String),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Cache file I/O: {0}")]
    CacheIo(String),
    #[error("Cache file format: {0}")]
    CacheFormat(String),
}

impl From<ClientError> for ChainError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound(txid) => ChainError::NotFound(txid),
            other => ChainError::Source(other.to_string()),
        }
    }
}
