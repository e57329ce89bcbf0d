//! Field-level reader and writer for the RFC 4251 data types used in public
//! key blobs: `uint32`, `string` and `mpint`.

use kagi::{ByteCursor, ByteWriter};
use num_bigint::BigInt;

use crate::error::{Error, Result};
use crate::mpint;

#[derive(Debug, Clone)]
pub struct SshReader<'a> {
    cursor: ByteCursor<'a>,
}

impl<'a> SshReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        SshReader {
            cursor: ByteCursor::new(buf),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.cursor.read_u32_be()?)
    }

    /// Reads a length-prefixed byte string.
    pub fn read_string(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        Ok(self.cursor.read(len)?)
    }

    /// Reads a length-prefixed string holding an algorithm or curve name.
    pub fn read_name(&mut self) -> Result<&'a str> {
        let offset = self.position();
        let bytes = self.read_string()?;
        if bytes.is_empty() || !bytes.iter().all(|b| b.is_ascii_graphic()) {
            return Err(Error::InvalidAlgorithmName { offset });
        }
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidAlgorithmName { offset })
    }

    pub fn read_mpint(&mut self) -> Result<BigInt> {
        // content starts right after the 4-byte length
        let offset = self.position() + 4;
        let content = self.read_string()?;
        mpint::decode(content, offset)
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(self) -> Result<()> {
        if self.cursor.is_empty() {
            Ok(())
        } else {
            Err(Error::TrailingData {
                offset: self.cursor.position(),
                remaining: self.cursor.remaining(),
            })
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SshWriter {
    writer: ByteWriter,
}

impl SshWriter {
    pub fn new() -> Self {
        SshWriter::default()
    }

    pub fn put_u32(&mut self, value: u32) -> &mut Self {
        self.writer.put_u32_be(value);
        self
    }

    pub fn put_string(&mut self, bytes: &[u8]) -> &mut Self {
        self.writer.put_u32_be(bytes.len() as u32);
        self.writer.append(bytes);
        self
    }

    pub fn put_name(&mut self, name: &str) -> &mut Self {
        self.put_string(name.as_bytes())
    }

    pub fn put_mpint(&mut self, value: &BigInt) -> Result<&mut Self> {
        let content = mpint::encode(value)?;
        Ok(self.put_string(&content))
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}
