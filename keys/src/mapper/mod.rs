//! Per-algorithm field mappers and the registry that finds them.
//!
//! A mapper knows how one algorithm lays its numbers out in every
//! structure: the SSH blob, SubjectPublicKeyInfo, PKCS#8 and the
//! traditional layout. Mapping is purely structural; no key arithmetic is
//! done.

use std::sync::LazyLock;

use asn1::{Element, ObjectIdentifier};
use pem::Label;
use pkcs::pkcs8::PrivateKeyInfo;
use pkcs::spki::SubjectPublicKeyInfo;
use ssh::{SshReader, SshWriter};

use crate::error::{Error, Result};
use crate::key::{Algorithm, Curve, Field, Key, KeyType, Parameters};

mod dsa;
mod ec;
mod rsa;

pub use dsa::DsaMapper;
pub use ec::EcMapper;
pub use rsa::RsaMapper;

/// Fields a key of one (algorithm, type) pair carries.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub required: &'static [Field],
    pub optional: &'static [Field],
}

impl FieldSpec {
    pub fn allows(&self, field: Field) -> bool {
        self.required.contains(&field) || self.optional.contains(&field)
    }
}

/// Numbers recovered from one structure, before they become a [`Key`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyMaterial {
    pub curve: Option<Curve>,
    pub parameters: Parameters,
}

impl KeyMaterial {
    pub fn new(parameters: Parameters) -> Self {
        KeyMaterial {
            curve: None,
            parameters,
        }
    }

    pub fn with_curve(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }
}

pub trait AlgorithmMapper: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    /// Dotted OID used in AlgorithmIdentifier.
    fn oid(&self) -> &'static str;

    /// Every SSH key type name this mapper answers to.
    fn ssh_names(&self) -> &'static [&'static str];

    fn fields(&self, key_type: KeyType) -> FieldSpec;

    fn uses_curve(&self) -> bool {
        false
    }

    /// PEM label of the traditional layout, if the algorithm has one for
    /// `key_type`.
    fn traditional_label(&self, key_type: KeyType) -> Option<Label>;

    /// SSH key type name for this particular key.
    fn ssh_name(&self, key: &Key) -> Result<&'static str>;

    /// Reads the fields that follow the name in a public key blob.
    fn decode_ssh(&self, name: &str, reader: &mut SshReader<'_>) -> Result<KeyMaterial>;

    /// Writes the fields that follow the name in a public key blob.
    fn encode_ssh(&self, key: &Key, writer: &mut SshWriter) -> Result<()>;

    fn decode_spki(&self, spki: &SubjectPublicKeyInfo) -> Result<KeyMaterial>;

    fn encode_spki(&self, key: &Key) -> Result<SubjectPublicKeyInfo>;

    fn decode_pkcs8(&self, info: &PrivateKeyInfo) -> Result<KeyMaterial>;

    fn encode_pkcs8(&self, key: &Key) -> Result<PrivateKeyInfo>;

    fn decode_traditional(&self, key_type: KeyType, element: &Element) -> Result<KeyMaterial>;

    fn encode_traditional(&self, key: &Key) -> Result<Element>;
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Read-only table of every known mapper, built on first use.
pub struct Registry {
    mappers: Vec<Box<dyn AlgorithmMapper>>,
}

impl Registry {
    fn new() -> Self {
        Registry {
            mappers: vec![
                Box::new(RsaMapper),
                Box::new(DsaMapper),
                Box::new(EcMapper),
            ],
        }
    }

    pub fn get() -> &'static Registry {
        &REGISTRY
    }

    pub fn mapper(&self, algorithm: Algorithm) -> Result<&dyn AlgorithmMapper> {
        self.mappers
            .iter()
            .find(|m| m.algorithm() == algorithm)
            .map(|m| m.as_ref())
            .ok_or_else(|| Error::UnsupportedAlgorithm(algorithm.to_string()))
    }

    pub fn by_oid(&self, oid: &ObjectIdentifier) -> Result<&dyn AlgorithmMapper> {
        self.mappers
            .iter()
            .find(|m| *oid == m.oid())
            .map(|m| m.as_ref())
            .ok_or_else(|| Error::UnsupportedAlgorithm(oid.to_string()))
    }

    pub fn by_ssh_name(&self, name: &str) -> Result<&dyn AlgorithmMapper> {
        self.mappers
            .iter()
            .find(|m| m.ssh_names().contains(&name))
            .map(|m| m.as_ref())
            .ok_or_else(|| Error::UnknownAlgorithmName(name.to_string()))
    }

    /// Mapper and key type selected by a traditional PEM label.
    pub fn by_label(&self, label: Label) -> Option<(&dyn AlgorithmMapper, KeyType)> {
        self.mappers.iter().find_map(|m| {
            [KeyType::Private, KeyType::Public]
                .into_iter()
                .find(|t| m.traditional_label(*t) == Some(label))
                .map(|t| (m.as_ref(), t))
        })
    }
}

// Shared helpers for the mappers.

fn integer(key: &Key, field: Field) -> Result<asn1::Integer> {
    Ok(asn1::Integer::from(key.require(field)?))
}

pub(crate) fn unsupported(key: &Key, format: crate::key::Format) -> Error {
    Error::UnsupportedConversion {
        algorithm: key.algorithm(),
        key_type: key.key_type(),
        format,
    }
}
