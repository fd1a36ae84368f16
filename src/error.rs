use thiserror::Error;

/// Errors produced by the bit-packed codec.
///
/// Every failing read leaves the buffer's read position where it was, so
/// callers can recover by reading something else or by treating the error
/// as end-of-input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("read past the end of the buffer")]
    ReadOverflow,
    #[error("variable-length integer exceeds its maximum encoded width")]
    MalformedVarint,
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    #[error("endpoint address length {0} is neither 4 nor 16")]
    InvalidEndpoint(u8),
}

pub type Result<T> = std::result::Result<T, CodecError>;
