//! Error taxonomy shared by every crate in the workspace.

use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Classification of every failure the codec can report.
///
/// Each crate keeps its own detailed `Error` enum and maps it onto one of
/// these kinds through a `kind()` method. All kinds are terminal: malformed
/// key material is never fixed by retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Buffer shorter than a structurally required length.
    TruncatedInput,
    /// Invalid sign padding or empty magnitude in a big-integer field.
    MalformedInteger,
    /// Invalid tag/length encoding or a structure that does not match the grammar.
    MalformedDer,
    /// Invalid base64 body.
    MalformedBase64,
    /// Absent or mismatched PEM boundary markers.
    MissingEnvelope,
    /// Input matches no recognized format signature.
    UnknownFormat,
    /// SSH algorithm name with no registered mapper.
    UnknownAlgorithmName,
    /// DER algorithm identifier with no registered mapper.
    UnsupportedAlgorithm,
    /// Bytes left over after a complete structure.
    TrailingBytes,
    /// No encoder path from a valid key to the requested format.
    UnsupportedConversion,
    /// A parameter required by (algorithm, type) is absent.
    MissingField,
    /// Encrypted key material and no decryptor configured.
    EncryptedKey,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::TruncatedInput => "truncated input",
            ErrorKind::MalformedInteger => "malformed integer",
            ErrorKind::MalformedDer => "malformed DER",
            ErrorKind::MalformedBase64 => "malformed base64",
            ErrorKind::MissingEnvelope => "missing envelope",
            ErrorKind::UnknownFormat => "unknown format",
            ErrorKind::UnknownAlgorithmName => "unknown algorithm name",
            ErrorKind::UnsupportedAlgorithm => "unsupported algorithm",
            ErrorKind::TrailingBytes => "trailing bytes",
            ErrorKind::UnsupportedConversion => "unsupported conversion",
            ErrorKind::MissingField => "missing field",
            ErrorKind::EncryptedKey => "encrypted key",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised by [`ByteCursor`](crate::cursor::ByteCursor).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("truncated input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Truncated { .. } => ErrorKind::TruncatedInput,
        }
    }

    /// Byte offset at which the read was attempted.
    pub fn offset(&self) -> usize {
        match self {
            Error::Truncated { offset, .. } => *offset,
        }
    }

    /// Moves the reported offset by `base`, for cursors over a sub-slice.
    pub fn shifted(self, base: usize) -> Self {
        match self {
            Error::Truncated {
                offset,
                needed,
                remaining,
            } => Error::Truncated {
                offset: offset + base,
                needed,
                remaining,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
