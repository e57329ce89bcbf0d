//! Key structures expressed over [`asn1::Element`].
//!
//! | Structure | Module | PEM label |
//! |-----------|--------|-----------|
//! | RSAPrivateKey / RSAPublicKey (RFC 8017) | [`pkcs1`] | `RSA PRIVATE KEY` / `RSA PUBLIC KEY` |
//! | OpenSSL DSA private key | [`dsa`] | `DSA PRIVATE KEY` |
//! | ECPrivateKey (RFC 5915) | [`sec1`] | `EC PRIVATE KEY` |
//! | OneAsymmetricKey (RFC 5958) | [`pkcs8`] | `PRIVATE KEY` |
//! | EncryptedPrivateKeyInfo (RFC 5958) | [`pkcs8`] | `ENCRYPTED PRIVATE KEY` |
//! | SubjectPublicKeyInfo (RFC 5280) | [`spki`] | `PUBLIC KEY` |
//!
//! Every structure converts from and to an `Element` through the
//! [`Decoder`] / [`Encoder`] traits; [`decode_der`] and [`encode_der`] add
//! the DER step on either side.

use asn1::{BitString, Element, Integer};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pem::{Label, Pem};

pub mod algorithm;
pub mod dsa;
pub mod error;
pub mod pkcs1;
pub mod pkcs8;
pub mod sec1;
pub mod spki;

pub use algorithm::AlgorithmIdentifier;
pub use error::{Error, Result};

/// Structures that have a PEM label of their own.
pub trait PemStructure {
    const LABEL: Label;
}

/// Parses a DER buffer holding exactly one structure.
pub fn decode_der<T>(bytes: &[u8]) -> Result<T>
where
    T: DecodableFrom<Element>,
    Element: Decoder<Element, T, Error = Error>,
{
    let element = Element::from_der(bytes)?;
    element.decode()
}

pub fn encode_der<T>(value: &T) -> Result<Vec<u8>>
where
    T: Encoder<T, Element, Error = Error>,
    Element: EncodableTo<T>,
{
    let element = value.encode()?;
    Ok(element.to_der()?)
}

/// Decodes a PEM block, refusing a label that belongs to another structure.
pub fn decode_pem<T>(pem: &Pem) -> Result<T>
where
    T: PemStructure + DecodableFrom<Element>,
    Element: Decoder<Element, T, Error = Error>,
{
    if pem.label() != T::LABEL {
        return Err(Error::UnexpectedLabel {
            expected: T::LABEL,
            actual: pem.label(),
        });
    }
    let bytes: Vec<u8> = pem.decode()?;
    decode_der(&bytes)
}

pub fn encode_pem<T>(value: &T) -> Result<Pem>
where
    T: PemStructure + Encoder<T, Element, Error = Error>,
    Element: EncodableTo<T>,
{
    Ok(Pem::from_bytes(T::LABEL, &encode_der(value)?))
}

pub(crate) fn sequence<'a>(element: &'a Element, structure: &'static str) -> Result<&'a [Element]> {
    match element {
        Element::Sequence(elements) => Ok(elements),
        _ => Err(Error::ExpectedSequence(structure)),
    }
}

pub(crate) fn integer<'a>(
    element: &'a Element,
    structure: &'static str,
    field: &'static str,
) -> Result<&'a Integer> {
    match element {
        Element::Integer(int) => Ok(int),
        _ => Err(Error::UnexpectedElement { structure, field }),
    }
}

/// Reads a version INTEGER and checks it against the accepted values.
pub(crate) fn version(element: &Element, structure: &'static str, accepted: &[u64]) -> Result<u64> {
    let int = integer(element, structure, "version")?;
    match int.to_u64() {
        Some(v) if accepted.contains(&v) => Ok(v),
        _ => Err(Error::UnsupportedVersion {
            structure,
            version: int.to_string(),
        }),
    }
}

/// Key material inside a BIT STRING is always a whole number of octets.
pub(crate) fn key_bits(bits: &BitString) -> Result<&[u8]> {
    match bits.unused_bits() {
        0 => Ok(bits.as_bytes()),
        n => Err(Error::UnusedBits(n)),
    }
}
