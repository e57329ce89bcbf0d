use error::{Error, Result};
use kagi::decoder::{DecodableFrom, Decoder};
use kagi::encoder::{EncodableTo, Encoder};
use kagi::{ByteCursor, ByteWriter};
use pem::Pem;

pub mod error;

pub const TAG_CONSTRUCTED: u8 = 0x20;

const CLASS_MASK: u8 = 0xc0;
const CLASS_UNIVERSAL: u8 = 0x00;
const CLASS_CONTEXT_SPECIFIC: u8 = 0x80;
const TAG_NUMBER_MASK: u8 = 0x1f;

const LENGTH_LONG_FORM: u8 = 0x80;
// Longest long-form length accepted: the count fits a u64.
const MAX_LENGTH_OCTETS: usize = 8;
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniversalTag {
    Integer,
    BitString,
    OctetString,
    Null,
    ObjectIdentifier,
    Sequence,
    Set,
    // any other universal tag, raw byte kept for re-encoding
    Other(u8),
}

impl From<u8> for UniversalTag {
    fn from(value: u8) -> Self {
        match value {
            0x02 => UniversalTag::Integer,
            0x03 => UniversalTag::BitString,
            0x04 => UniversalTag::OctetString,
            0x05 => UniversalTag::Null,
            0x06 => UniversalTag::ObjectIdentifier,
            0x30 => UniversalTag::Sequence,
            0x31 => UniversalTag::Set,
            _ => UniversalTag::Other(value),
        }
    }
}

impl From<&UniversalTag> for u8 {
    fn from(value: &UniversalTag) -> Self {
        match value {
            UniversalTag::Integer => 0x02,
            UniversalTag::BitString => 0x03,
            UniversalTag::OctetString => 0x04,
            UniversalTag::Null => 0x05,
            UniversalTag::ObjectIdentifier => 0x06,
            UniversalTag::Sequence => 0x30,
            UniversalTag::Set => 0x31,
            UniversalTag::Other(v) => *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Universal(UniversalTag),
    ContextSpecific { slot: u8, constructed: bool },
    // application and private classes
    Other(u8),
}

impl Tag {
    pub fn is_constructed(&self) -> bool {
        u8::from(self) & TAG_CONSTRUCTED != 0
    }
}

impl From<u8> for Tag {
    fn from(value: u8) -> Self {
        match value & CLASS_MASK {
            CLASS_UNIVERSAL => Tag::Universal(UniversalTag::from(value)),
            CLASS_CONTEXT_SPECIFIC => Tag::ContextSpecific {
                slot: value & TAG_NUMBER_MASK,
                constructed: value & TAG_CONSTRUCTED != 0,
            },
            _ => Tag::Other(value),
        }
    }
}

impl From<&Tag> for u8 {
    fn from(value: &Tag) -> Self {
        match value {
            Tag::Universal(t) => u8::from(t),
            Tag::ContextSpecific { slot, constructed } => {
                let mut b = CLASS_CONTEXT_SPECIFIC | (slot & TAG_NUMBER_MASK);
                if *constructed {
                    b |= TAG_CONSTRUCTED;
                }
                b
            }
            Tag::Other(v) => *v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Tlv(Vec<Tlv>),
    Data(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    tag: Tag,
    // where the tag byte sat in the source buffer; 0 for built values
    offset: usize,
    value: Value,
}

impl Tlv {
    pub fn new_primitive(tag: Tag, data: Vec<u8>) -> Self {
        Tlv {
            tag,
            offset: 0,
            value: Value::Data(data),
        }
    }

    pub fn new_constructed(tag: Tag, tlvs: Vec<Tlv>) -> Self {
        Tlv {
            tag,
            offset: 0,
            value: Value::Tlv(tlvs),
        }
    }

    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn data(&self) -> Option<&[u8]> {
        match &self.value {
            Value::Data(d) => Some(d),
            Value::Tlv(_) => None,
        }
    }

    pub fn tlvs(&self) -> Option<&[Tlv]> {
        match &self.value {
            Value::Tlv(t) => Some(t),
            Value::Data(_) => None,
        }
    }

    /// Parses exactly one element; any byte left after it is an error.
    pub fn parse_single(input: &[u8]) -> Result<Tlv> {
        let mut cursor = ByteCursor::new(input);
        let tlv = Self::parse(&mut cursor, 0, 0)?;
        if !cursor.is_empty() {
            return Err(Error::TrailingData {
                offset: cursor.position(),
                remaining: cursor.remaining(),
            });
        }
        Ok(tlv)
    }

    // `base` is the absolute offset of the cursor's buffer, so nested
    // errors report positions in the original input.
    fn parse(cursor: &mut ByteCursor<'_>, base: usize, depth: usize) -> Result<Tlv> {
        if depth > MAX_DEPTH {
            return Err(Error::TooDeep(MAX_DEPTH));
        }
        let offset = base + cursor.position();
        let tag = parse_tag(cursor, base)?;
        let length = parse_length(cursor, base)?;
        let content_offset = base + cursor.position();
        let content = cursor.read(length).map_err(|e| e.shifted(base))?;

        if tag.is_constructed() {
            let mut inner = ByteCursor::new(content);
            let mut tlvs = Vec::new();
            while !inner.is_empty() {
                tlvs.push(Self::parse(&mut inner, content_offset, depth + 1)?);
            }
            return Ok(Tlv {
                tag,
                offset,
                value: Value::Tlv(tlvs),
            });
        }

        Ok(Tlv {
            tag,
            offset,
            value: Value::Data(content.to_vec()),
        })
    }

    fn content_len(&self) -> usize {
        match &self.value {
            Value::Data(d) => d.len(),
            Value::Tlv(tlvs) => tlvs.iter().map(Tlv::encoded_len).sum(),
        }
    }

    fn encoded_len(&self) -> usize {
        let len = self.content_len();
        1 + length_octets(len) + len
    }

    fn write_to(&self, writer: &mut ByteWriter) {
        writer.push(u8::from(&self.tag));
        write_length(writer, self.content_len());
        match &self.value {
            Value::Data(d) => writer.append(d),
            Value::Tlv(tlvs) => tlvs.iter().for_each(|t| t.write_to(writer)),
        }
    }
}

fn parse_tag(cursor: &mut ByteCursor<'_>, base: usize) -> Result<Tag> {
    let offset = base + cursor.position();
    let b = cursor.read_u8().map_err(|e| e.shifted(base))?;
    if b & TAG_NUMBER_MASK == TAG_NUMBER_MASK {
        return Err(Error::HighTagNumber { offset, tag: b });
    }
    Ok(Tag::from(b))
}

fn parse_length(cursor: &mut ByteCursor<'_>, base: usize) -> Result<usize> {
    let offset = base + cursor.position();
    let n = cursor.read_u8().map_err(|e| e.shifted(base))?;
    let length = if n & LENGTH_LONG_FORM == 0 {
        // short form: 0-127
        n as u64
    } else {
        // long form: low 7 bits count the big-endian length octets
        let count = (n & !LENGTH_LONG_FORM) as usize;
        if count == 0 {
            return Err(Error::IndefiniteLength { offset });
        }
        if count > MAX_LENGTH_OCTETS {
            return Err(Error::LengthTooLong { offset, count });
        }
        cursor
            .read(count)
            .map_err(|e| e.shifted(base))?
            .iter()
            .fold(0u64, |acc, &b| (acc << 8) | b as u64)
    };
    match usize::try_from(length) {
        Ok(len) if len <= cursor.remaining() => Ok(len),
        _ => Err(Error::LengthOutOfBounds {
            offset,
            length,
            remaining: cursor.remaining(),
        }),
    }
}

fn length_octets(len: usize) -> usize {
    if len < LENGTH_LONG_FORM as usize {
        1
    } else {
        1 + (usize::BITS as usize / 8 - len.leading_zeros() as usize / 8)
    }
}

fn write_length(writer: &mut ByteWriter, len: usize) {
    if len < LENGTH_LONG_FORM as usize {
        writer.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = len.leading_zeros() as usize / 8;
    writer.push(LENGTH_LONG_FORM | (bytes.len() - skip) as u8);
    writer.append(&bytes[skip..]);
}

/// A sequence of top-level DER elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Der {
    elements: Vec<Tlv>,
}

impl Der {
    pub fn new(elements: Vec<Tlv>) -> Self {
        Der { elements }
    }

    pub fn elements(&self) -> &[Tlv] {
        &self.elements
    }
}

impl DecodableFrom<&[u8]> for Der {}

impl Decoder<&[u8], Der> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        let mut cursor = ByteCursor::new(self);
        let mut elements = Vec::new();
        while !cursor.is_empty() {
            elements.push(Tlv::parse(&mut cursor, 0, 0)?);
        }
        Ok(Der { elements })
    }
}

impl DecodableFrom<Vec<u8>> for Der {}

impl Decoder<Vec<u8>, Der> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        self.as_slice().decode()
    }
}

impl DecodableFrom<Pem> for Der {}

impl Decoder<Pem, Der> for Pem {
    type Error = Error;

    fn decode(&self) -> Result<Der> {
        let bytes: Vec<u8> = Decoder::<Pem, Vec<u8>>::decode(self)?;
        bytes.decode()
    }
}

impl EncodableTo<Tlv> for Vec<u8> {}

impl Encoder<Tlv, Vec<u8>> for Tlv {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::with_capacity(self.encoded_len());
        self.write_to(&mut writer);
        Ok(writer.into_inner())
    }
}

impl EncodableTo<Der> for Vec<u8> {}

impl Encoder<Der, Vec<u8>> for Der {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::new();
        self.elements.iter().for_each(|t| t.write_to(&mut writer));
        Ok(writer.into_inner())
    }
}
