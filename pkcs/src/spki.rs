/*
RFC 5280 Section 4.1

SubjectPublicKeyInfo ::= SEQUENCE {
    algorithm            AlgorithmIdentifier,
    subjectPublicKey     BIT STRING
}
*/

use asn1::{BitString, Element};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pem::Label;

use crate::PemStructure;
use crate::algorithm::AlgorithmIdentifier;
use crate::error::{Error, Result};

const STRUCTURE: &str = "SubjectPublicKeyInfo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectPublicKeyInfo {
    pub algorithm: AlgorithmIdentifier,
    pub subject_public_key: BitString,
}

impl SubjectPublicKeyInfo {
    pub fn new(algorithm: AlgorithmIdentifier, public_key: Vec<u8>) -> Self {
        SubjectPublicKeyInfo {
            algorithm,
            subject_public_key: BitString::from(public_key),
        }
    }

    /// Key octets inside the BIT STRING.
    pub fn public_key(&self) -> Result<&[u8]> {
        crate::key_bits(&self.subject_public_key)
    }
}

impl PemStructure for SubjectPublicKeyInfo {
    const LABEL: Label = Label::PublicKey;
}

impl DecodableFrom<Element> for SubjectPublicKeyInfo {}

impl Decoder<Element, SubjectPublicKeyInfo> for Element {
    type Error = Error;

    fn decode(&self) -> Result<SubjectPublicKeyInfo> {
        let elements = crate::sequence(self, STRUCTURE)?;
        let [algorithm, subject_public_key] = elements else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "2",
                actual: elements.len(),
            });
        };
        let algorithm: AlgorithmIdentifier = algorithm.decode()?;
        let Element::BitString(subject_public_key) = subject_public_key else {
            return Err(Error::UnexpectedElement {
                structure: STRUCTURE,
                field: "subjectPublicKey",
            });
        };
        crate::key_bits(subject_public_key)?;
        Ok(SubjectPublicKeyInfo {
            algorithm,
            subject_public_key: subject_public_key.clone(),
        })
    }
}

impl EncodableTo<SubjectPublicKeyInfo> for Element {}

impl Encoder<SubjectPublicKeyInfo, Element> for SubjectPublicKeyInfo {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            self.algorithm.encode()?,
            Element::BitString(self.subject_public_key.clone()),
        ]))
    }
}
