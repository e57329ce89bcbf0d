//! DSA structures: Dss-Parms (RFC 3279) and the OpenSSL private key layout.

/*
Dss-Parms ::= SEQUENCE {
    p   INTEGER,
    q   INTEGER,
    g   INTEGER
}

DSAPrivateKey ::= SEQUENCE {   -- OpenSSL "DSA PRIVATE KEY"
    version  INTEGER,          -- 0
    p        INTEGER,
    q        INTEGER,
    g        INTEGER,
    y        INTEGER,          -- public key
    x        INTEGER           -- private key
}
*/

use asn1::{Element, Integer};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pem::Label;

use crate::PemStructure;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaParameters {
    pub p: Integer,
    pub q: Integer,
    pub g: Integer,
}

impl DecodableFrom<Element> for DsaParameters {}

impl Decoder<Element, DsaParameters> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DsaParameters> {
        const STRUCTURE: &str = "Dss-Parms";
        let elements = crate::sequence(self, STRUCTURE)?;
        let [p, q, g] = elements else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "3",
                actual: elements.len(),
            });
        };
        Ok(DsaParameters {
            p: crate::integer(p, STRUCTURE, "p")?.clone(),
            q: crate::integer(q, STRUCTURE, "q")?.clone(),
            g: crate::integer(g, STRUCTURE, "g")?.clone(),
        })
    }
}

impl EncodableTo<DsaParameters> for Element {}

impl Encoder<DsaParameters, Element> for DsaParameters {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.p.clone()),
            Element::Integer(self.q.clone()),
            Element::Integer(self.g.clone()),
        ]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsaPrivateKey {
    pub parameters: DsaParameters,
    pub public_key: Integer,  // y
    pub private_key: Integer, // x
}

impl PemStructure for DsaPrivateKey {
    const LABEL: Label = Label::DsaPrivateKey;
}

impl DecodableFrom<Element> for DsaPrivateKey {}

impl Decoder<Element, DsaPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<DsaPrivateKey> {
        const STRUCTURE: &str = "DSAPrivateKey";
        let elements = crate::sequence(self, STRUCTURE)?;
        let [version, p, q, g, y, x] = elements else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "6",
                actual: elements.len(),
            });
        };
        crate::version(version, STRUCTURE, &[0])?;
        let get_integer = |element: &Element, field| -> Result<Integer> {
            Ok(crate::integer(element, STRUCTURE, field)?.clone())
        };
        Ok(DsaPrivateKey {
            parameters: DsaParameters {
                p: get_integer(p, "p")?,
                q: get_integer(q, "q")?,
                g: get_integer(g, "g")?,
            },
            public_key: get_integer(y, "y")?,
            private_key: get_integer(x, "x")?,
        })
    }
}

impl EncodableTo<DsaPrivateKey> for Element {}

impl Encoder<DsaPrivateKey, Element> for DsaPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(Integer::from(0u64)),
            Element::Integer(self.parameters.p.clone()),
            Element::Integer(self.parameters.q.clone()),
            Element::Integer(self.parameters.g.clone()),
            Element::Integer(self.public_key.clone()),
            Element::Integer(self.private_key.clone()),
        ]))
    }
}
