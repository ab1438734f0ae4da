use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("Unexpected end of input{}", fmt_ctx(.0))]
    UnexpectedEof(Option<&'static str>),
    #[error("Declared length exceeds remaining input{}", fmt_ctx(.0))]
    InvalidLength(Option<&'static str>),
    #[error("Trailing bytes after decoded value{}", fmt_ctx(.0))]
    TrailingBytes(Option<&'static str>),
    #[error("{0}")]
    Custom(String),
}

fn fmt_ctx(ctx: &Option<&'static str>) -> String {
    ctx.map(|c| format!(" decoding {c}")).unwrap_or_default()
}

impl CodecError {
    pub fn unexpected_eof() -> Self {
        Self::UnexpectedEof(None)
    }

    pub fn invalid_length() -> Self {
        Self::InvalidLength(None)
    }

    pub fn trailing_bytes() -> Self {
        Self::TrailingBytes(None)
    }

    pub fn with_context(self, ctx: &'static str) -> Self {
        match self {
            Self::UnexpectedEof(_) => Self::UnexpectedEof(Some(ctx)),
            Self::InvalidLength(_) => Self::InvalidLength(Some(ctx)),
            Self::TrailingBytes(_) => Self::TrailingBytes(Some(ctx)),
            other => other,
        }
    }
}
