use std::str::FromStr;

use asn1::{BitString, Element, Integer, ObjectIdentifier, OctetString};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use num_bigint::{BigInt, Sign};
use pem::Label;
use serde::Serialize;

use crate::PemStructure;
use crate::error::{Error, Result};

/*
RFC 5915 - Elliptic Curve Private Key Structure

ECPrivateKey ::= SEQUENCE {
    version        INTEGER { ecPrivkeyVer1(1) } (ecPrivkeyVer1),
    privateKey     OCTET STRING,
    parameters [0] ECParameters {{ NamedCurve }} OPTIONAL,
    publicKey  [1] BIT STRING OPTIONAL
}
*/

const STRUCTURE: &str = "ECPrivateKey";

// SEC1 2.3.3 point compression octet for the uncompressed form
const UNCOMPRESSED_POINT: u8 = 0x04;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Curve {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl Curve {
    pub const OID_SECP256R1: &'static str = "1.2.840.10045.3.1.7";
    pub const OID_SECP384R1: &'static str = "1.3.132.0.34";
    pub const OID_SECP521R1: &'static str = "1.3.132.0.35";

    pub fn oid(&self) -> Result<ObjectIdentifier> {
        let oid = match self {
            Curve::P256 => Self::OID_SECP256R1,
            Curve::P384 => Self::OID_SECP384R1,
            Curve::P521 => Self::OID_SECP521R1,
        };
        Ok(ObjectIdentifier::from_str(oid)?)
    }

    /// Curve identifier used inside SSH blobs (`nistp256`, ...).
    pub fn ssh_identifier(&self) -> &'static str {
        match self {
            Curve::P256 => "nistp256",
            Curve::P384 => "nistp384",
            Curve::P521 => "nistp521",
        }
    }

    pub fn from_ssh_identifier(identifier: &str) -> Option<Curve> {
        match identifier {
            "nistp256" => Some(Curve::P256),
            "nistp384" => Some(Curve::P384),
            "nistp521" => Some(Curve::P521),
            _ => None,
        }
    }

    /// Size in bytes of a field element (coordinates and private scalar).
    pub fn field_size(&self) -> usize {
        match self {
            Curve::P256 => 32,
            Curve::P384 => 48,
            Curve::P521 => 66,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Curve::P256 => "P-256",
            Curve::P384 => "P-384",
            Curve::P521 => "P-521",
        }
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&ObjectIdentifier> for Curve {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        [Curve::P256, Curve::P384, Curve::P521]
            .into_iter()
            .find(|curve| curve.oid().is_ok_and(|c| &c == oid))
            .ok_or_else(|| Error::UnsupportedCurve(oid.to_string()))
    }
}

/// Big-endian `value` left-padded with zeros to exactly `size` bytes.
pub fn to_field_bytes(value: &BigInt, size: usize) -> Result<Vec<u8>> {
    let (sign, magnitude) = value.to_bytes_be();
    if sign == Sign::Minus {
        return Err(Error::NegativeValue);
    }
    // zero encodes as a single 0x00 byte
    let magnitude = if sign == Sign::NoSign { Vec::new() } else { magnitude };
    if magnitude.len() > size {
        return Err(Error::ValueTooLarge(size));
    }
    let mut out = vec![0u8; size - magnitude.len()];
    out.extend_from_slice(&magnitude);
    Ok(out)
}

/// Splits an uncompressed point `0x04 || X || Y` into its coordinates.
pub fn decode_point(curve: Curve, point: &[u8]) -> Result<(BigInt, BigInt)> {
    let size = curve.field_size();
    match point.split_first() {
        Some((&UNCOMPRESSED_POINT, coordinates)) if coordinates.len() == 2 * size => {
            let (x, y) = coordinates.split_at(size);
            Ok((
                BigInt::from_bytes_be(Sign::Plus, x),
                BigInt::from_bytes_be(Sign::Plus, y),
            ))
        }
        Some((&UNCOMPRESSED_POINT, _)) | None => Err(Error::InvalidPointLength {
            curve: curve.name(),
            expected: 1 + 2 * size,
            actual: point.len(),
        }),
        Some((&form, _)) => Err(Error::UnsupportedPointFormat(form)),
    }
}

pub fn encode_point(curve: Curve, x: &BigInt, y: &BigInt) -> Result<Vec<u8>> {
    let size = curve.field_size();
    let mut point = Vec::with_capacity(1 + 2 * size);
    point.push(UNCOMPRESSED_POINT);
    point.extend(to_field_bytes(x, size)?);
    point.extend(to_field_bytes(y, size)?);
    Ok(point)
}

/// SEC1 ECPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    /// ecPrivkeyVer1
    V1 = 1,
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as u64)
    }
}

/// The `parameters` field is left out inside PKCS#8, where the curve lives
/// in the AlgorithmIdentifier instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ECPrivateKey {
    pub private_key: OctetString,
    pub parameters: Option<Curve>,
    pub public_key: Option<BitString>,
}

impl ECPrivateKey {
    pub fn new(
        private_key: OctetString,
        parameters: Option<Curve>,
        public_key: Option<BitString>,
    ) -> Self {
        ECPrivateKey {
            private_key,
            parameters,
            public_key,
        }
    }

    /// Private scalar as an unsigned integer.
    pub fn scalar(&self) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, self.private_key.as_bytes())
    }

    /// Public point octets, if present.
    pub fn public_point(&self) -> Result<Option<&[u8]>> {
        self.public_key.as_ref().map(crate::key_bits).transpose()
    }
}

impl PemStructure for ECPrivateKey {
    const LABEL: Label = Label::EcPrivateKey;
}

fn explicit(element: &Element, expected: u8) -> Option<&Element> {
    match element {
        Element::ContextSpecific {
            slot,
            constructed: true,
            element,
        } if *slot == expected => Some(element),
        _ => None,
    }
}

impl DecodableFrom<Element> for ECPrivateKey {}

impl Decoder<Element, ECPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<ECPrivateKey> {
        let elements = crate::sequence(self, STRUCTURE)?;
        let mut iter = elements.iter().peekable();

        let version = iter.next().ok_or(Error::InvalidElementCount {
            structure: STRUCTURE,
            expected: "2 to 4",
            actual: 0,
        })?;
        crate::version(version, STRUCTURE, &[Version::V1 as u64])?;

        let private_key = match iter.next() {
            Some(Element::OctetString(octets)) => octets.clone(),
            Some(_) => {
                return Err(Error::UnexpectedElement {
                    structure: STRUCTURE,
                    field: "privateKey",
                });
            }
            None => {
                return Err(Error::InvalidElementCount {
                    structure: STRUCTURE,
                    expected: "2 to 4",
                    actual: 1,
                });
            }
        };

        let parameters = match iter
            .next_if(|e| explicit(e, 0).is_some())
            .and_then(|e| explicit(e, 0))
        {
            Some(Element::ObjectIdentifier(oid)) => Some(Curve::try_from(oid)?),
            Some(_) => {
                return Err(Error::UnexpectedElement {
                    structure: STRUCTURE,
                    field: "parameters",
                });
            }
            None => None,
        };

        let public_key = match iter
            .next_if(|e| explicit(e, 1).is_some())
            .and_then(|e| explicit(e, 1))
        {
            Some(Element::BitString(bits)) => {
                crate::key_bits(bits)?;
                Some(bits.clone())
            }
            Some(_) => {
                return Err(Error::UnexpectedElement {
                    structure: STRUCTURE,
                    field: "publicKey",
                });
            }
            None => None,
        };

        if iter.next().is_some() {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "2 to 4",
                actual: elements.len(),
            });
        }

        Ok(ECPrivateKey {
            private_key,
            parameters,
            public_key,
        })
    }
}

impl EncodableTo<ECPrivateKey> for Element {}

impl Encoder<ECPrivateKey, Element> for ECPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(Version::V1)),
            Element::OctetString(self.private_key.clone()),
        ];
        if let Some(curve) = &self.parameters {
            elements.push(Element::ContextSpecific {
                slot: 0,
                constructed: true,
                element: Box::new(Element::ObjectIdentifier(curve.oid()?)),
            });
        }
        if let Some(public_key) = &self.public_key {
            elements.push(Element::ContextSpecific {
                slot: 1,
                constructed: true,
                element: Box::new(Element::BitString(public_key.clone())),
            });
        }
        Ok(Element::Sequence(elements))
    }
}
