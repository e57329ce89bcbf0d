use std::{fmt::Display, str::FromStr};

use der::{Der, Tag, Tlv, UniversalTag};
use error::{Error, Result};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};

pub mod error;

#[derive(Debug, Clone)]
pub struct ASN1Object {
    elements: Vec<Element>,
}

impl ASN1Object {
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn new(elements: Vec<Element>) -> Self {
        ASN1Object { elements }
    }
}

impl DecodableFrom<Der> for ASN1Object {}

impl Decoder<Der, ASN1Object> for Der {
    type Error = Error;
    fn decode(&self) -> Result<ASN1Object> {
        let elements = self
            .elements()
            .iter()
            .map(Element::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(ASN1Object { elements })
    }
}

impl EncodableTo<ASN1Object> for Der {}

impl Encoder<ASN1Object, Der> for ASN1Object {
    type Error = Error;

    fn encode(&self) -> Result<Der> {
        let tlvs = self
            .elements
            .iter()
            .map(|e| e.encode())
            .collect::<Result<Vec<_>>>()?;
        Ok(Der::new(tlvs))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Integer(Integer),
    BitString(BitString),
    OctetString(OctetString),
    Null,
    ObjectIdentifier(ObjectIdentifier),
    Sequence(Vec<Element>),
    Set(Vec<Element>),
    ContextSpecific {
        slot: u8,
        constructed: bool,
        element: Box<Element>,
    },
    // any other tag, carried through untouched
    Unimplemented(Tlv),
}

impl Element {
    /// Parses a buffer holding exactly one DER element.
    pub fn from_der(bytes: &[u8]) -> Result<Element> {
        let tlv = Tlv::parse_single(bytes)?;
        Element::try_from(&tlv)
    }

    pub fn to_der(&self) -> Result<Vec<u8>> {
        let tlv = self.encode()?;
        Ok(tlv.encode()?)
    }
}

impl TryFrom<&Tlv> for Element {
    type Error = Error;

    fn try_from(tlv: &Tlv) -> Result<Self> {
        match tlv.tag() {
            Tag::Universal(UniversalTag::Integer) => {
                Ok(Element::Integer(Integer::try_from(primitive(tlv)?)?))
            }
            Tag::Universal(UniversalTag::BitString) => {
                Ok(Element::BitString(BitString::try_from(primitive(tlv)?)?))
            }
            Tag::Universal(UniversalTag::OctetString) => {
                Ok(Element::OctetString(primitive(tlv)?.into()))
            }
            Tag::Universal(UniversalTag::Null) => match primitive(tlv)? {
                [] => Ok(Element::Null),
                data => Err(Error::NullWithContent(data.len())),
            },
            Tag::Universal(UniversalTag::ObjectIdentifier) => Ok(Element::ObjectIdentifier(
                ObjectIdentifier::try_from(primitive(tlv)?)?,
            )),
            Tag::Universal(UniversalTag::Sequence) => Ok(Element::Sequence(children(tlv)?)),
            Tag::Universal(UniversalTag::Set) => Ok(Element::Set(children(tlv)?)),
            Tag::ContextSpecific { slot, constructed } => {
                if *constructed {
                    // EXPLICIT tagging wraps exactly one element
                    match tlv.tlvs() {
                        Some([inner]) => Ok(Element::ContextSpecific {
                            slot: *slot,
                            constructed: true,
                            element: Box::new(Element::try_from(inner)?),
                        }),
                        _ => Err(Error::InvalidContextSpecific {
                            slot: *slot,
                            msg: "constructed form must hold exactly one element".to_string(),
                        }),
                    }
                } else {
                    // IMPLICIT tagging: the raw content is kept as an OctetString and the
                    // structural layer interprets it
                    Ok(Element::ContextSpecific {
                        slot: *slot,
                        constructed: false,
                        element: Box::new(Element::OctetString(primitive(tlv)?.into())),
                    })
                }
            }
            Tag::Universal(UniversalTag::Other(_)) | Tag::Other(_) => {
                Ok(Element::Unimplemented(tlv.clone()))
            }
        }
    }
}

fn primitive(tlv: &Tlv) -> Result<&[u8]> {
    tlv.data()
        .ok_or(Error::UnexpectedConstructed(u8::from(tlv.tag())))
}

fn children(tlv: &Tlv) -> Result<Vec<Element>> {
    tlv.tlvs()
        .ok_or(Error::UnexpectedConstructed(u8::from(tlv.tag())))?
        .iter()
        .map(Element::try_from)
        .collect()
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Element::Integer(i) => write!(f, "Integer({})", i),
            Element::BitString(bs) => write!(f, "BitString({})", bs),
            Element::OctetString(os) => write!(f, "OctetString({})", os),
            Element::Null => write!(f, "Null"),
            Element::ObjectIdentifier(oid) => write!(f, "ObjectIdentifier({})", oid),
            Element::Sequence(seq) => write!(f, "Sequence({:?})", seq),
            Element::Set(set) => write!(f, "Set({:?})", set),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => write!(
                f,
                "ContextSpecific(slot: {}, constructed: {}, element: {})",
                slot, constructed, element
            ),
            Element::Unimplemented(tlv) => write!(f, "Unimplemented({:?})", tlv),
        }
    }
}

impl TryFrom<&Element> for Tlv {
    type Error = Error;

    fn try_from(element: &Element) -> Result<Self> {
        match element {
            Element::Integer(i) => Ok(Tlv::new_primitive(
                Tag::Universal(UniversalTag::Integer),
                Vec::from(i),
            )),
            Element::BitString(bs) => Ok(Tlv::new_primitive(
                Tag::Universal(UniversalTag::BitString),
                Vec::from(bs.clone()),
            )),
            Element::OctetString(os) => Ok(Tlv::new_primitive(
                Tag::Universal(UniversalTag::OctetString),
                os.as_bytes().to_vec(),
            )),
            Element::Null => Ok(Tlv::new_primitive(
                Tag::Universal(UniversalTag::Null),
                vec![],
            )),
            Element::ObjectIdentifier(oid) => Ok(Tlv::new_primitive(
                Tag::Universal(UniversalTag::ObjectIdentifier),
                Vec::try_from(oid)?,
            )),
            Element::Sequence(elements) => Ok(Tlv::new_constructed(
                Tag::Universal(UniversalTag::Sequence),
                elements.iter().map(Tlv::try_from).collect::<Result<_>>()?,
            )),
            Element::Set(elements) => Ok(Tlv::new_constructed(
                Tag::Universal(UniversalTag::Set),
                elements.iter().map(Tlv::try_from).collect::<Result<_>>()?,
            )),
            Element::ContextSpecific {
                slot,
                constructed,
                element,
            } => {
                let tag = Tag::ContextSpecific {
                    slot: *slot,
                    constructed: *constructed,
                };
                let inner = Tlv::try_from(element.as_ref())?;
                if *constructed {
                    return Ok(Tlv::new_constructed(tag, vec![inner]));
                }
                // IMPLICIT tagging replaces the inner tag and keeps its content
                match inner.data() {
                    Some(data) => Ok(Tlv::new_primitive(tag, data.to_vec())),
                    None => Err(Error::InvalidContextSpecific {
                        slot: *slot,
                        msg: "primitive form requires a primitive inner element".to_string(),
                    }),
                }
            }
            Element::Unimplemented(tlv) => Ok(tlv.clone()),
        }
    }
}

impl EncodableTo<Element> for Tlv {}

impl Encoder<Element, Tlv> for Element {
    type Error = Error;

    fn encode(&self) -> Result<Tlv> {
        Tlv::try_from(self)
    }
}

/// DER INTEGER backed by an arbitrary precision `BigInt`.
///
/// Decoding accepts minimal content and content carrying a single `0x00`
/// sign guard; an empty body or a run of two or more leading zero bytes is
/// rejected. Encoding always emits the minimal two's-complement form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Integer {
    inner: BigInt,
}

impl Integer {
    pub fn as_bigint(&self) -> &BigInt {
        &self.inner
    }

    pub fn into_bigint(self) -> BigInt {
        self.inner
    }

    pub fn to_u64(&self) -> Option<u64> {
        self.inner.to_u64()
    }
}

impl Serialize for Integer {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.inner.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let inner = s.parse::<BigInt>().map_err(serde::de::Error::custom)?;
        Ok(Integer { inner })
    }
}

impl TryFrom<&[u8]> for Integer {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        match value {
            [] => Err(Error::IntegerNoData),
            [0x00, 0x00, ..] => Err(Error::IntegerRedundantPadding),
            _ => Ok(Integer {
                inner: BigInt::from_signed_bytes_be(value),
            }),
        }
    }
}

impl From<BigInt> for Integer {
    fn from(inner: BigInt) -> Self {
        Integer { inner }
    }
}

impl From<&BigInt> for Integer {
    fn from(inner: &BigInt) -> Self {
        Integer {
            inner: inner.clone(),
        }
    }
}

impl From<u64> for Integer {
    fn from(value: u64) -> Self {
        Integer {
            inner: BigInt::from(value),
        }
    }
}

impl From<&Integer> for Vec<u8> {
    fn from(value: &Integer) -> Self {
        value.inner.to_signed_bytes_be()
    }
}

impl Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectIdentifier {
    inner: Vec<u64>,
}

impl ObjectIdentifier {
    pub fn arcs(&self) -> &[u64] {
        &self.inner
    }
}

impl Serialize for ObjectIdentifier {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl TryFrom<&[u8]> for ObjectIdentifier {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        if value.is_empty() {
            return Err(Error::ObjectIdentifierNoData);
        }

        let mut subidentifiers = Vec::new();
        let mut val = 0u64;
        let mut pending = false;
        for b in value {
            if val > u64::MAX >> 7 {
                return Err(Error::ObjectIdentifierOverflow);
            }
            val = (val << 7) | (*b & 0x7f) as u64;
            pending = *b & 0x80 != 0;
            if !pending {
                subidentifiers.push(val);
                val = 0;
            }
        }
        if pending {
            return Err(Error::ObjectIdentifierIncompleteEncoding);
        }

        // the first subidentifier packs the first two arcs as X * 40 + Y
        let first = subidentifiers[0];
        let mut inner = match first {
            0..40 => vec![0, first],
            40..80 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };
        inner.extend_from_slice(&subidentifiers[1..]);
        Ok(ObjectIdentifier { inner })
    }
}

impl TryFrom<&ObjectIdentifier> for Vec<u8> {
    type Error = Error;

    fn try_from(oid: &ObjectIdentifier) -> Result<Self> {
        let [x, y, rest @ ..] = oid.inner.as_slice() else {
            return Err(Error::ObjectIdentifierTooFewComponents);
        };
        if *x > 2 || (*x < 2 && *y >= 40) {
            return Err(Error::ObjectIdentifierInvalidRoot(*x, *y));
        }
        let first = (x * 40)
            .checked_add(*y)
            .ok_or(Error::ObjectIdentifierOverflow)?;

        let mut result = Vec::new();
        for v in std::iter::once(&first).chain(rest) {
            let mut encoded = vec![(*v & 0x7f) as u8];
            let mut value = *v >> 7;
            while value > 0 {
                encoded.push((value & 0x7f) as u8 | 0x80);
                value >>= 7;
            }
            result.extend(encoded.iter().rev());
        }
        Ok(result)
    }
}

impl Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(".");
        write!(f, "{}", s)
    }
}

impl FromStr for ObjectIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let inner = s
            .split('.')
            .map(|s| s.parse::<u64>().map_err(Error::ObjectIdentifierInvalidComponent))
            .collect::<Result<Vec<u64>>>()?;
        if inner.len() < 2 {
            return Err(Error::ObjectIdentifierTooFewComponents);
        }
        Ok(ObjectIdentifier { inner })
    }
}

impl PartialEq<&str> for ObjectIdentifier {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}

impl PartialEq<ObjectIdentifier> for &str {
    fn eq(&self, other: &ObjectIdentifier) -> bool {
        *self == other.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    unused: u8,
    data: Vec<u8>,
}

impl BitString {
    pub fn new(unused: u8, data: Vec<u8>) -> Self {
        BitString { unused, data }
    }

    /// Returns the number of unused bits in the last byte
    pub fn unused_bits(&self) -> u8 {
        self.unused
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn bit_len(&self) -> usize {
        if self.data.is_empty() {
            0
        } else {
            self.data.len() * 8 - self.unused as usize
        }
    }
}

impl From<Vec<u8>> for BitString {
    /// Whole-byte content, as used for key material.
    fn from(data: Vec<u8>) -> Self {
        BitString { unused: 0, data }
    }
}

impl AsRef<[u8]> for BitString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl TryFrom<&[u8]> for BitString {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self> {
        match value {
            [] => Err(Error::BitStringNoData),
            [unused, ..] if *unused > 7 => Err(Error::BitStringUnusedBitsOutOfRange(*unused)),
            // an empty bit string cannot have unused bits
            [unused] if *unused != 0 => Err(Error::BitStringUnusedBitsOutOfRange(*unused)),
            [unused, data @ ..] => Ok(BitString {
                unused: *unused,
                data: data.to_vec(),
            }),
        }
    }
}

impl From<BitString> for Vec<u8> {
    fn from(value: BitString) -> Self {
        let mut result = Vec::with_capacity(value.data.len() + 1);
        result.push(value.unused);
        result.extend(value.data);
        result
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut result = String::new();
        for (i, byte) in self.data.iter().enumerate() {
            if i == self.data.len() - 1 && self.unused > 0 {
                let bit_count = 8 - self.unused as usize;
                result.push_str(&format!("{:0bit_count$b}", byte >> self.unused));
            } else {
                result.push_str(&format!("{:08b}", byte));
            }
        }
        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OctetString {
    inner: Vec<u8>,
}

impl OctetString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.inner
    }
}

impl Serialize for OctetString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            self.inner.serialize(serializer)
        }
    }
}

impl TryFrom<&OctetString> for Element {
    type Error = Error;

    /// Parses the content as a nested DER element (PKCS#8 privateKey).
    fn try_from(value: &OctetString) -> Result<Self> {
        Element::from_der(value.as_bytes())
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(value: Vec<u8>) -> Self {
        OctetString { inner: value }
    }
}

impl From<&[u8]> for OctetString {
    fn from(value: &[u8]) -> Self {
        OctetString {
            inner: value.to_vec(),
        }
    }
}

impl Display for OctetString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self
            .inner
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<String>();
        write!(f, "{}", s)
    }
}
