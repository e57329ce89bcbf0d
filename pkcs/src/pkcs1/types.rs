use asn1::{Element, Integer};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use pem::Label;
use serde::Serialize;

use crate::PemStructure;
use crate::error::{Error, Result};

/*
RFC 8017 - PKCS #1: RSA Cryptography Specifications

RSAPrivateKey ::= SEQUENCE {
    version           Version,
    modulus           INTEGER,  -- n
    publicExponent    INTEGER,  -- e
    privateExponent   INTEGER,  -- d
    prime1            INTEGER,  -- p
    prime2            INTEGER,  -- q
    exponent1         INTEGER,  -- d mod (p-1)
    exponent2         INTEGER,  -- d mod (q-1)
    coefficient       INTEGER,  -- (inverse of q) mod p
    otherPrimeInfos   OtherPrimeInfos OPTIONAL
}

Version ::= INTEGER { two-prime(0), multi(1) }
*/

/// PKCS#1 RSAPrivateKey version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Version {
    TwoPrime = 0,
    Multi = 1,
}

impl From<Version> for Integer {
    fn from(v: Version) -> Self {
        Integer::from(v as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPrivateKey {
    pub modulus: Integer,          // n
    pub public_exponent: Integer,  // e
    pub private_exponent: Integer, // d
    pub prime1: Integer,           // p
    pub prime2: Integer,           // q
    pub exponent1: Integer,        // d mod (p-1)
    pub exponent2: Integer,        // d mod (q-1)
    pub coefficient: Integer,      // (inverse of q) mod p
}

impl RSAPrivateKey {
    pub fn public_key(&self) -> RSAPublicKey {
        RSAPublicKey {
            modulus: self.modulus.clone(),
            public_exponent: self.public_exponent.clone(),
        }
    }
}

impl PemStructure for RSAPrivateKey {
    const LABEL: Label = Label::RsaPrivateKey;
}

impl DecodableFrom<Element> for RSAPrivateKey {}

impl Decoder<Element, RSAPrivateKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPrivateKey> {
        const STRUCTURE: &str = "RSAPrivateKey";
        let elements = crate::sequence(self, STRUCTURE)?;
        let Some(version) = elements.first() else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "9",
                actual: 0,
            });
        };
        // multi-prime keys carry otherPrimeInfos as a tenth element
        if crate::version(version, STRUCTURE, &[0, 1])? == Version::Multi as u64 {
            return Err(Error::MultiPrimeRsa);
        }
        let [_, n, e, d, p, q, dp, dq, qinv] = elements else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "9",
                actual: elements.len(),
            });
        };

        let get_integer = |element: &Element, field| -> Result<Integer> {
            Ok(crate::integer(element, STRUCTURE, field)?.clone())
        };

        Ok(RSAPrivateKey {
            modulus: get_integer(n, "modulus")?,
            public_exponent: get_integer(e, "publicExponent")?,
            private_exponent: get_integer(d, "privateExponent")?,
            prime1: get_integer(p, "prime1")?,
            prime2: get_integer(q, "prime2")?,
            exponent1: get_integer(dp, "exponent1")?,
            exponent2: get_integer(dq, "exponent2")?,
            coefficient: get_integer(qinv, "coefficient")?,
        })
    }
}

impl EncodableTo<RSAPrivateKey> for Element {}

impl Encoder<RSAPrivateKey, Element> for RSAPrivateKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(Integer::from(Version::TwoPrime)),
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
            Element::Integer(self.private_exponent.clone()),
            Element::Integer(self.prime1.clone()),
            Element::Integer(self.prime2.clone()),
            Element::Integer(self.exponent1.clone()),
            Element::Integer(self.exponent2.clone()),
            Element::Integer(self.coefficient.clone()),
        ]))
    }
}

/*
RSAPublicKey ::= SEQUENCE {
    modulus           INTEGER,  -- n
    publicExponent    INTEGER   -- e
}
*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RSAPublicKey {
    pub modulus: Integer,
    pub public_exponent: Integer,
}

impl PemStructure for RSAPublicKey {
    const LABEL: Label = Label::RsaPublicKey;
}

impl DecodableFrom<Element> for RSAPublicKey {}

impl Decoder<Element, RSAPublicKey> for Element {
    type Error = Error;

    fn decode(&self) -> Result<RSAPublicKey> {
        const STRUCTURE: &str = "RSAPublicKey";
        let elements = crate::sequence(self, STRUCTURE)?;
        let [n, e] = elements else {
            return Err(Error::InvalidElementCount {
                structure: STRUCTURE,
                expected: "2",
                actual: elements.len(),
            });
        };
        Ok(RSAPublicKey {
            modulus: crate::integer(n, STRUCTURE, "modulus")?.clone(),
            public_exponent: crate::integer(e, STRUCTURE, "publicExponent")?.clone(),
        })
    }
}

impl EncodableTo<RSAPublicKey> for Element {}

impl Encoder<RSAPublicKey, Element> for RSAPublicKey {
    type Error = Error;

    fn encode(&self) -> Result<Element> {
        Ok(Element::Sequence(vec![
            Element::Integer(self.modulus.clone()),
            Element::Integer(self.public_exponent.clone()),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use asn1::{Element, Integer};
    use kagi::ErrorKind;
    use kagi::decoder::Decoder;
    use num_bigint::BigInt;
    use pem::Pem;
    use rstest::rstest;

    use super::{RSAPrivateKey, RSAPublicKey};
    use crate::{decode_der, decode_pem, encode_der, encode_pem};

    const RSA_1024_PRIVATE: &str =
        include_str!("../../../keys/tests/resources/rsa-1024/private.pkcs1.pem");
    const RSA_1024_PUBLIC: &str =
        include_str!("../../../keys/tests/resources/rsa-1024/public.pkcs1.pem");
    const RSA_2048_PRIVATE: &str =
        include_str!("../../../keys/tests/resources/rsa-2048/private.pkcs1.pem");

    const RSA_1024_MODULUS: &str = "135905486259440517865209646173404599620534038194720785268198047236531688043506844685016583428372835435220698959380274944299188367170659944106975596667826978706315566471628578261842471420597120743317216099328752675861458318080712703168279100665220735106095274989162651313663427091041601632551803263009289467403";

    #[test]
    fn test_decode_private_key() {
        let pem = Pem::from_str(RSA_1024_PRIVATE).unwrap();
        let key: RSAPrivateKey = decode_pem(&pem).unwrap();
        assert_eq!(key.modulus.to_string(), RSA_1024_MODULUS);
        assert_eq!(key.public_exponent, Integer::from(65537u64));
        assert_eq!(
            key.prime1.to_string(),
            "12876895445165709746224440477571759465822288830951920295961154484319359210188563833017576319846567037198835692972489513564321026958344372663920416826043197"
        );
        let public = key.public_key();
        assert_eq!(public.modulus.as_bigint(), key.modulus.as_bigint());
    }

    #[rstest(input, case(RSA_1024_PRIVATE), case(RSA_2048_PRIVATE))]
    fn test_private_key_reproduced(input: &str) {
        let pem = Pem::from_str(input).unwrap();
        let key: RSAPrivateKey = decode_pem(&pem).unwrap();
        assert_eq!(encode_pem(&key).unwrap().to_string(), input);
    }

    #[test]
    fn test_public_key_reproduced() {
        let pem = Pem::from_str(RSA_1024_PUBLIC).unwrap();
        let key: RSAPublicKey = decode_pem(&pem).unwrap();
        assert_eq!(key.modulus.to_string(), RSA_1024_MODULUS);
        assert_eq!(encode_pem(&key).unwrap().to_string(), RSA_1024_PUBLIC);
    }

    #[test]
    fn test_public_key_with_private_label() {
        let pem = Pem::from_str(RSA_1024_PUBLIC).unwrap();
        let result: Result<RSAPrivateKey, _> = decode_pem(&pem);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::MissingEnvelope);
    }

    #[test]
    fn test_small_public_key_der() {
        let key = RSAPublicKey {
            modulus: Integer::from(BigInt::from(0xc5u32)),
            public_exponent: Integer::from(3u64),
        };
        let der = encode_der(&key).unwrap();
        assert_eq!(der, vec![0x30, 0x07, 0x02, 0x02, 0x00, 0xc5, 0x02, 0x01, 0x03]);
        let decoded: RSAPublicKey = decode_der(&der).unwrap();
        assert_eq!(decoded, key);
    }

    #[rstest(
        element,
        kind,
        case(Element::Integer(Integer::from(0u64)), ErrorKind::MalformedDer),
        case(Element::Sequence(vec![]), ErrorKind::MalformedDer),
        case(Element::Sequence(vec![Element::Integer(Integer::from(0u64)); 8]), ErrorKind::MalformedDer),
        case(Element::Sequence(vec![Element::Integer(Integer::from(2u64)); 9]), ErrorKind::MalformedDer),
        case(Element::Sequence(vec![Element::Integer(Integer::from(1u64)); 10]), ErrorKind::UnsupportedAlgorithm),
        case(
            Element::Sequence(
                std::iter::once(Element::Integer(Integer::from(0u64)))
                    .chain(std::iter::repeat_n(Element::Null, 8))
                    .collect()
            ),
            ErrorKind::MalformedDer
        )
    )]
    fn test_decode_private_key_error(element: Element, kind: ErrorKind) {
        let result: Result<RSAPrivateKey, _> = element.decode();
        assert_eq!(result.unwrap_err().kind(), kind);
    }

    #[test]
    fn test_trailing_element_rejected() {
        let mut der = encode_der(&RSAPublicKey {
            modulus: Integer::from(0x7fu64),
            public_exponent: Integer::from(3u64),
        })
        .unwrap();
        der.extend_from_slice(&[0x05, 0x00]);
        let result: Result<RSAPublicKey, _> = decode_der(&der);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::TrailingBytes);
    }
}
