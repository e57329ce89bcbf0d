use base64::DecodeError;
use kagi::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Truncated(#[from] kagi::Error),

    // mpint errors
    #[error("mpint at offset {offset}: empty magnitude")]
    EmptyMpint { offset: usize },
    #[error("mpint at offset {offset}: more than one leading zero byte")]
    MpintRedundantPadding { offset: usize },
    #[error("mpint at offset {offset}: negative value")]
    NegativeMpint { offset: usize },
    #[error("mpint: only positive values can be encoded")]
    NonPositiveMpint,

    #[error("invalid algorithm name at offset {offset}")]
    InvalidAlgorithmName { offset: usize },
    #[error("algorithm name mismatch: line says {line}, blob says {blob}")]
    AlgorithmNameMismatch { line: String, blob: String },
    #[error("{remaining} trailing bytes at offset {offset}")]
    TrailingData { offset: usize, remaining: usize },

    #[error("invalid OpenSSH public key line")]
    InvalidLine,
    #[error("unexpected content after the key line")]
    TrailingLines,

    #[error("missing SSH2 public key begin marker")]
    MissingBeginMarker,
    #[error("missing SSH2 public key end marker")]
    MissingEndMarker,
    #[error("invalid SSH2 header line: {0}")]
    InvalidHeader(String),
    #[error("missing key data")]
    MissingData,
    #[error("base64 decode: {0}")]
    Base64Decode(#[from] DecodeError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Truncated(e) => e.kind(),
            Error::EmptyMpint { .. }
            | Error::MpintRedundantPadding { .. }
            | Error::NegativeMpint { .. }
            | Error::NonPositiveMpint => ErrorKind::MalformedInteger,
            Error::InvalidAlgorithmName { .. } | Error::AlgorithmNameMismatch { .. } => {
                ErrorKind::UnknownAlgorithmName
            }
            Error::TrailingData { .. } | Error::TrailingLines => ErrorKind::TrailingBytes,
            Error::InvalidLine | Error::InvalidHeader(_) => ErrorKind::UnknownFormat,
            Error::MissingBeginMarker | Error::MissingEndMarker => ErrorKind::MissingEnvelope,
            Error::MissingData | Error::Base64Decode(_) => ErrorKind::MalformedBase64,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
