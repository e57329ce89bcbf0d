//! Error types for the key structures.

use kagi::ErrorKind;
use pem::Label;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1: {0}")]
    Asn1(#[from] asn1::error::Error),
    #[error("PEM: {0}")]
    Pem(#[from] pem::error::Error),

    #[error("{0} must be a SEQUENCE")]
    ExpectedSequence(&'static str),
    #[error("{structure}: expected {expected} elements, got {actual}")]
    InvalidElementCount {
        structure: &'static str,
        expected: &'static str,
        actual: usize,
    },
    #[error("{structure}: unexpected element type for {field}")]
    UnexpectedElement {
        structure: &'static str,
        field: &'static str,
    },
    #[error("{structure}: unsupported version {version}")]
    UnsupportedVersion {
        structure: &'static str,
        version: String,
    },
    #[error("{0}: missing algorithm parameters")]
    MissingParameters(&'static str),
    #[error("BIT STRING holding key material has {0} unused bits")]
    UnusedBits(u8),

    #[error("unsupported named curve {0}")]
    UnsupportedCurve(String),
    #[error("unsupported EC point encoding 0x{0:02x}")]
    UnsupportedPointFormat(u8),
    #[error("EC point is {actual} bytes, expected {expected} for {curve}")]
    InvalidPointLength {
        curve: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("value does not fit in {0} bytes")]
    ValueTooLarge(usize),
    #[error("negative value where key material was expected")]
    NegativeValue,
    #[error("multi-prime RSA keys are not supported")]
    MultiPrimeRsa,

    #[error("PEM label {actual} where {expected} was expected")]
    UnexpectedLabel { expected: Label, actual: Label },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Asn1(e) => e.kind(),
            Error::Pem(e) => e.kind(),
            Error::UnsupportedCurve(_)
            | Error::UnsupportedPointFormat(_)
            | Error::MultiPrimeRsa => ErrorKind::UnsupportedAlgorithm,
            Error::ValueTooLarge(_) | Error::NegativeValue => ErrorKind::MalformedInteger,
            Error::UnexpectedLabel { .. } => ErrorKind::MissingEnvelope,
            _ => ErrorKind::MalformedDer,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
