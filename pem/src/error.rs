use base64::DecodeError;
use kagi::ErrorKind;
use thiserror::Error;

/// Errors that can occur when parsing or decoding PEM data.
///
/// PEM parsing follows RFC 7468 (and RFC 1421 for headers) and requires
/// matching boundary markers and a valid base64 body.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Missing the opening boundary marker (e.g., `-----BEGIN PUBLIC KEY-----`)
    #[error("missing a pre encapsulation boundary")]
    MissingPreEncapsulationBoundary,

    /// Missing the closing boundary marker (e.g., `-----END PUBLIC KEY-----`)
    #[error("missing a post encapsulation boundary")]
    MissingPostEncapsulationBoundary,

    /// The BEGIN and END labels differ
    #[error("label doesn't match: BEGIN {begin}, END {end}")]
    LabelMismatch { begin: String, end: String },

    #[error("invalid encapsulation boundary")]
    InvalidEncapsulationBoundary,

    /// The label is well-formed but not one this codec knows how to handle
    #[error("unsupported label: {0}")]
    UnsupportedLabel(String),

    /// No data found between boundary markers
    #[error("missing PEM data")]
    MissingData,

    #[error("base64 decode: {0}")]
    Base64Decode(#[from] DecodeError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingPreEncapsulationBoundary
            | Error::MissingPostEncapsulationBoundary
            | Error::LabelMismatch { .. }
            | Error::InvalidEncapsulationBoundary => ErrorKind::MissingEnvelope,
            Error::UnsupportedLabel(_) => ErrorKind::UnknownFormat,
            Error::MissingData | Error::Base64Decode(_) => ErrorKind::MalformedBase64,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
