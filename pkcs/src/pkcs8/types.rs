use asn1::{BitString, Element, Integer, OctetString};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pem::Label;
use serde::Serialize;

use crate::PemStructure;
use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};

/*
RFC 5958 - Asymmetric Key Packages

OneAsymmetricKey ::= SEQUENCE {
    version                   Version,
    privateKeyAlgorithm       PrivateKeyAlgorithmIdentifier,
    privateKey                PrivateKey,
    attributes            [0] Attributes OPTIONAL,
    ...,
    [[2: publicKey        [1] PublicKey OPTIONAL ]],
    ...
}

PrivateKeyInfo ::= OneAsymmetricKey

Version ::= INTEGER { v1(0), v2(1) } (v1, ..., v2)

PrivateKey ::= OCTET STRING

PublicKey ::= BIT STRING
*/

const STRUCTURE: &str = "OneAsymmetricKey";

/// PKCS#8 OneAsymmetricKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    V1 = 0,
    V2 = 1,
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneAsymmetricKey {
    pub version: Version,
    pub private_key_algorithm: AlgorithmIdentifier,
    /// DER of the algorithm specific private key structure.
    pub private_key: OctetString,
    /// `[0] IMPLICIT Attributes`, carried through without interpretation.
    pub attributes: Option<Element>,
    pub public_key: Option<BitString>,
}

pub type PrivateKeyInfo = OneAsymmetricKey;

impl OneAsymmetricKey {
    /// A v1 structure with no attributes and no public key.
    pub fn new(private_key_algorithm: AlgorithmIdentifier, private_key: Vec<u8>) -> Self {
        OneAsymmetricKey {
            version: Version::V1,
            private_key_algorithm,
            private_key: OctetString::from(private_key),
            attributes: None,
            public_key: None,
        }
    }
}

impl PemStructure for OneAsymmetricKey {
    const LABEL: Label = Label::PrivateKey;
}

fn is_tagged(element: &Element, expected: u8) -> bool {
    matches!(element, Element::ContextSpecific { slot, .. } if *slot == expected)
}

// Content octets of an IMPLICIT primitive field, as kept by the ASN.1 layer.
fn implicit_content(element: &Element) -> Option<&[u8]> {
    match element {
        Element::ContextSpecific {
            constructed: false,
            element,
            ..
        } => match element.as_ref() {
            Element::OctetString(raw) => Some(raw.as_bytes()),
            _ => None,
        },
        _ => None,
    }
}

impl DecodableFrom<Element> for OneAsymmetricKey {}

impl Decoder<Element, OneAsymmetricKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<OneAsymmetricKey> {
        let elements = crate::sequence(self, STRUCTURE)?;
        let (version, algorithm, private_key, rest) = match elements {
            [version, algorithm, private_key, rest @ ..] if rest.len() <= 2 => {
                (version, algorithm, private_key, rest)
            }
            _ => {
                return Err(Error::InvalidElementCount {
                    structure: STRUCTURE,
                    expected: "3 to 5",
                    actual: elements.len(),
                });
            }
        };

        let version = match crate::version(version, STRUCTURE, &[0, 1])? {
            0 => Version::V1,
            _ => Version::V2,
        };
        let private_key_algorithm: AlgorithmIdentifier = algorithm.decode()?;
        let Element::OctetString(private_key) = private_key else {
            return Err(Error::UnexpectedElement {
                structure: STRUCTURE,
                field: "privateKey",
            });
        };

        let mut rest = rest.iter().peekable();
        let attributes = rest.next_if(|e| is_tagged(e, 0)).cloned();
        let public_key = match rest.next_if(|e| is_tagged(e, 1)) {
            Some(element) => {
                let raw = implicit_content(element).ok_or(Error::UnexpectedElement {
                    structure: STRUCTURE,
                    field: "publicKey",
                })?;
                let bits = BitString::try_from(raw)?;
                crate::key_bits(&bits)?;
                Some(bits)
            }
            None => None,
        };
        if rest.next().is_some() {
            return Err(Error::UnexpectedElement {
                structure: STRUCTURE,
                field: "attributes",
            });
        }
        if public_key.is_some() && version == Version::V1 {
            return Err(Error::UnsupportedVersion {
                structure: STRUCTURE,
                version: "v1 with publicKey".to_string(),
            });
        }

        Ok(OneAsymmetricKey {
            version,
            private_key_algorithm,
            private_key: private_key.clone(),
            attributes,
            public_key,
        })
    }
}

impl EncodableTo<OneAsymmetricKey> for Element {}

impl Encoder<OneAsymmetricKey, Element> for OneAsymmetricKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![
            Element::Integer(Integer::from(self.version)),
            self.private_key_algorithm.encode()?,
            Element::OctetString(self.private_key.clone()),
        ];
        if let Some(attributes) = &self.attributes {
            elements.push(attributes.clone());
        }
        if let Some(public_key) = &self.public_key {
            elements.push(Element::ContextSpecific {
                slot: 1,
                constructed: false,
                element: Box::new(Element::BitString(public_key.clone())),
            });
        }
        Ok(Element::Sequence(elements))
    }
}
