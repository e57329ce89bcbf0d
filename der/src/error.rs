use kagi::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Truncated(#[from] kagi::Error),
    #[error("high-tag-number form is not supported: tag 0x{tag:02x} at offset {offset}")]
    HighTagNumber { offset: usize, tag: u8 },
    #[error("indefinite length at offset {offset}")]
    IndefiniteLength { offset: usize },
    #[error("length field of {count} bytes at offset {offset} is too long")]
    LengthTooLong { offset: usize, count: usize },
    #[error("length {length} at offset {offset} exceeds the {remaining} remaining bytes")]
    LengthOutOfBounds {
        offset: usize,
        length: u64,
        remaining: usize,
    },
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
    #[error("{remaining} trailing bytes after the element at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },
    #[error("pem: {0}")]
    Pem(#[from] pem::error::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Truncated(e) => e.kind(),
            Error::TrailingData { .. } => ErrorKind::TrailingBytes,
            Error::Pem(e) => e.kind(),
            _ => ErrorKind::MalformedDer,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
