use kagi::decoder::{DecodableFrom, Decoder};

use crate::error::{Error, Result};
use crate::wire::SshReader;

// Longest algorithm name accepted when sniffing raw input.
const MAX_SNIFF_NAME_LEN: u32 = 64;

/// SSH public key blob: `string name` followed by algorithm specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyBlob {
    name: String,
    bytes: Vec<u8>,
}

impl PublicKeyBlob {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Reader positioned just after the algorithm name.
    pub fn fields(&self) -> Result<SshReader<'_>> {
        let mut reader = SshReader::new(&self.bytes);
        reader.read_name()?;
        Ok(reader)
    }

    /// True when `bytes` starts with a length of 1..=64 followed by that
    /// many printable ASCII bytes.
    pub fn sniff(bytes: &[u8]) -> bool {
        let Some((len, rest)) = bytes.split_first_chunk::<4>() else {
            return false;
        };
        let len = u32::from_be_bytes(*len);
        if !(1..=MAX_SNIFF_NAME_LEN).contains(&len) {
            return false;
        }
        rest.get(..len as usize)
            .is_some_and(|name| name.iter().all(|b| b.is_ascii_graphic()))
    }
}

impl TryFrom<Vec<u8>> for PublicKeyBlob {
    type Error = Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        let name = SshReader::new(&bytes).read_name()?.to_string();
        Ok(PublicKeyBlob { name, bytes })
    }
}

impl DecodableFrom<&[u8]> for PublicKeyBlob {}

impl Decoder<&[u8], PublicKeyBlob> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<PublicKeyBlob> {
        PublicKeyBlob::try_from(self.to_vec())
    }
}
