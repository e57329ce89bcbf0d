//! Error types for ASN.1 parsing and encoding.

use std::num::ParseIntError;

use kagi::ErrorKind;
use thiserror::Error;

/// Errors that can occur during ASN.1 parsing and encoding operations.
#[derive(Debug, Error)]
pub enum Error {
    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,
    #[error("INTEGER: more than one leading zero byte")]
    IntegerRedundantPadding,

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: component overflows u64")]
    ObjectIdentifierOverflow,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: invalid first components {0}.{1}")]
    ObjectIdentifierInvalidRoot(u64, u64),
    #[error("OBJECT IDENTIFIER: invalid component: {0}")]
    ObjectIdentifierInvalidComponent(ParseIntError),

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    #[error("NULL: unexpected content of {0} bytes")]
    NullWithContent(usize),

    // Context-specific errors
    #[error("invalid context-specific value: {slot}, {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },

    #[error("unexpected constructed encoding for tag 0x{0:02x}")]
    UnexpectedConstructed(u8),

    // DER errors
    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[from] der::error::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IntegerNoData | Error::IntegerRedundantPadding => ErrorKind::MalformedInteger,
            Error::FailedToDecodeDer(e) => e.kind(),
            _ => ErrorKind::MalformedDer,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
