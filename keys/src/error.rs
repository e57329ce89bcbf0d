use kagi::ErrorKind;
use pem::Label;
use thiserror::Error;

use crate::key::{Algorithm, Field, Format, KeyType};

#[derive(Debug, Error)]
pub enum Error {
    #[error("ASN.1: {0}")]
    Asn1(#[from] asn1::error::Error),
    #[error("PEM: {0}")]
    Pem(#[from] pem::error::Error),
    #[error("{0}")]
    Pkcs(#[from] pkcs::Error),
    #[error("SSH: {0}")]
    Ssh(#[from] ssh::error::Error),

    #[error("input matches no known key format")]
    UnknownFormat,
    #[error("text input is not valid UTF-8")]
    InvalidText,
    #[error("DER structure is not a known key layout")]
    UnrecognizedStructure,
    #[error("unsupported algorithm identifier {0}")]
    UnsupportedAlgorithm(String),
    #[error("unknown SSH algorithm name {0:?}")]
    UnknownAlgorithmName(String),
    #[error("SSH key type {name} does not match curve {curve:?}")]
    CurveMismatch { name: String, curve: String },
    #[error("{0} algorithm parameters are not valid")]
    UnexpectedParameters(Algorithm),

    #[error("{algorithm} {key_type} key is missing field {field}")]
    MissingField {
        algorithm: Algorithm,
        key_type: KeyType,
        field: Field,
    },
    #[error("{0} key has no curve")]
    MissingCurve(Algorithm),
    #[error("{algorithm} {key_type} key does not use field {field}")]
    UnexpectedField {
        algorithm: Algorithm,
        key_type: KeyType,
        field: Field,
    },
    #[error("{0} key does not take a curve")]
    UnexpectedCurve(Algorithm),
    #[error("cannot encode a {algorithm} {key_type} key as {format}")]
    UnsupportedConversion {
        algorithm: Algorithm,
        key_type: KeyType,
        format: Format,
    },

    #[error("{0} is encrypted and no decryptor is configured")]
    EncryptedKey(Label),
    #[error("decryption failed: {0}")]
    Decryption(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Asn1(e) => e.kind(),
            Error::Pem(e) => e.kind(),
            Error::Pkcs(e) => e.kind(),
            Error::Ssh(e) => e.kind(),
            Error::UnknownFormat | Error::InvalidText => ErrorKind::UnknownFormat,
            Error::UnrecognizedStructure | Error::UnexpectedParameters(_) => {
                ErrorKind::MalformedDer
            }
            Error::UnsupportedAlgorithm(_) => ErrorKind::UnsupportedAlgorithm,
            Error::UnknownAlgorithmName(_) | Error::CurveMismatch { .. } => {
                ErrorKind::UnknownAlgorithmName
            }
            Error::MissingField { .. } | Error::MissingCurve(_) => ErrorKind::MissingField,
            Error::UnexpectedField { .. }
            | Error::UnexpectedCurve(_)
            | Error::UnsupportedConversion { .. } => ErrorKind::UnsupportedConversion,
            Error::EncryptedKey(_) | Error::Decryption(_) => ErrorKind::EncryptedKey,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
