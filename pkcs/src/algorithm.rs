/*
RFC 5280 Section 4.1.1.2

AlgorithmIdentifier ::= SEQUENCE {
    algorithm   OBJECT IDENTIFIER,
    parameters  ANY DEFINED BY algorithm OPTIONAL
}
*/

use std::str::FromStr;

use asn1::{Element, ObjectIdentifier};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

use crate::dsa::DsaParameters;
use crate::error::{Error, Result};
use crate::sec1::Curve;

const STRUCTURE: &str = "AlgorithmIdentifier";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifier,
    pub parameters: Option<Element>,
}

impl AlgorithmIdentifier {
    pub const OID_RSA_ENCRYPTION: &'static str = "1.2.840.113549.1.1.1";
    pub const OID_ID_DSA: &'static str = "1.2.840.10040.4.1";
    pub const OID_EC_PUBLIC_KEY: &'static str = "1.2.840.10045.2.1";

    pub fn new(algorithm: ObjectIdentifier, parameters: Option<Element>) -> Self {
        AlgorithmIdentifier {
            algorithm,
            parameters,
        }
    }

    /// rsaEncryption with the NULL parameter RFC 3279 requires.
    pub fn rsa_encryption() -> Result<Self> {
        Ok(AlgorithmIdentifier::new(
            ObjectIdentifier::from_str(Self::OID_RSA_ENCRYPTION)?,
            Some(Element::Null),
        ))
    }

    pub fn dsa(parameters: &DsaParameters) -> Result<Self> {
        Ok(AlgorithmIdentifier::new(
            ObjectIdentifier::from_str(Self::OID_ID_DSA)?,
            Some(parameters.encode()?),
        ))
    }

    pub fn ec_public_key(curve: Curve) -> Result<Self> {
        Ok(AlgorithmIdentifier::new(
            ObjectIdentifier::from_str(Self::OID_EC_PUBLIC_KEY)?,
            Some(Element::ObjectIdentifier(curve.oid()?)),
        ))
    }

    /// Dss-Parms carried in the parameters field.
    pub fn dsa_parameters(&self) -> Result<DsaParameters> {
        match &self.parameters {
            Some(params @ Element::Sequence(_)) => params.decode(),
            Some(_) => Err(Error::UnexpectedElement {
                structure: STRUCTURE,
                field: "parameters",
            }),
            None => Err(Error::MissingParameters(STRUCTURE)),
        }
    }

    /// namedCurve carried in the parameters field.
    pub fn named_curve(&self) -> Result<Curve> {
        match &self.parameters {
            Some(Element::ObjectIdentifier(oid)) => Curve::try_from(oid),
            Some(_) => Err(Error::UnexpectedElement {
                structure: STRUCTURE,
                field: "parameters",
            }),
            None => Err(Error::MissingParameters(STRUCTURE)),
        }
    }
}

impl DecodableFrom<Element> for AlgorithmIdentifier {}

impl Decoder<Element, AlgorithmIdentifier> for Element {
    type Error = Error;

    fn decode(&self) -> Result<AlgorithmIdentifier> {
        let elements = crate::sequence(self, STRUCTURE)?;
        let (algorithm, parameters) = match elements {
            [Element::ObjectIdentifier(oid)] => (oid.clone(), None),
            [Element::ObjectIdentifier(oid), params] => (oid.clone(), Some(params.clone())),
            [_] | [_, _] => {
                return Err(Error::UnexpectedElement {
                    structure: STRUCTURE,
                    field: "algorithm",
                });
            }
            _ => {
                return Err(Error::InvalidElementCount {
                    structure: STRUCTURE,
                    expected: "1 or 2",
                    actual: elements.len(),
                });
            }
        };
        Ok(AlgorithmIdentifier {
            algorithm,
            parameters,
        })
    }
}

impl EncodableTo<AlgorithmIdentifier> for Element {}

impl Encoder<AlgorithmIdentifier, Element> for AlgorithmIdentifier {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        let mut elements = vec![Element::ObjectIdentifier(self.algorithm.clone())];
        if let Some(params) = &self.parameters {
            elements.push(params.clone());
        }
        Ok(Element::Sequence(elements))
    }
}
