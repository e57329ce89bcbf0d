//! The canonical, algorithm-tagged key value.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use asn1::Integer;
use num_bigint::BigInt;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub use pkcs::sec1::Curve;

use crate::error::{Error, Result};
use crate::mapper::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[non_exhaustive]
pub enum Algorithm {
    Rsa,
    Dsa,
    Ec,
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Algorithm::Rsa => "RSA",
            Algorithm::Dsa => "DSA",
            Algorithm::Ec => "EC",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Public,
    Private,
}

impl Display for KeyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyType::Public => write!(f, "public"),
            KeyType::Private => write!(f, "private"),
        }
    }
}

/// Wire encoding a key was read from, or is to be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
    #[serde(rename = "openssh")]
    OpenSsh,
    #[serde(rename = "ssh2")]
    Ssh2,
    #[serde(rename = "pem-pkcs1")]
    PemPkcs1,
    #[serde(rename = "pem-pkcs8")]
    PemPkcs8,
    #[serde(rename = "der-pkcs1")]
    DerPkcs1,
    #[serde(rename = "der-pkcs8")]
    DerPkcs8,
}

impl Format {
    /// PKCS#1 here covers every traditional layout (RSA, DSA and SEC1).
    pub fn is_traditional(&self) -> bool {
        matches!(self, Format::PemPkcs1 | Format::DerPkcs1)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Format::DerPkcs1 | Format::DerPkcs8)
    }

    pub fn is_ssh(&self) -> bool {
        matches!(self, Format::OpenSsh | Format::Ssh2)
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Format::OpenSsh => "OpenSSH",
            Format::Ssh2 => "SSH2",
            Format::PemPkcs1 => "PEM (traditional)",
            Format::PemPkcs8 => "PEM (PKCS#8)",
            Format::DerPkcs1 => "DER (traditional)",
            Format::DerPkcs8 => "DER (PKCS#8)",
        };
        write!(f, "{}", s)
    }
}

/// Named numeric component of a key. DSA and EC share the `x`/`y` names;
/// the algorithm decides what they mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Modulus,
    PublicExponent,
    PrivateExponent,
    PrimeP,
    PrimeQ,
    ExponentP,
    ExponentQ,
    Coefficient,
    P,
    Q,
    G,
    X,
    Y,
    D,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Modulus => "modulus",
            Field::PublicExponent => "publicExponent",
            Field::PrivateExponent => "privateExponent",
            Field::PrimeP => "primeP",
            Field::PrimeQ => "primeQ",
            Field::ExponentP => "exponentP",
            Field::ExponentQ => "exponentQ",
            Field::Coefficient => "coefficient",
            Field::P => "p",
            Field::Q => "q",
            Field::G => "g",
            Field::X => "x",
            Field::Y => "y",
            Field::D => "d",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub type Parameters = BTreeMap<Field, BigInt>;

// Decimal strings, the same JSON convention as `asn1::Integer`.
fn serialize_parameters<S>(
    parameters: &Parameters,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(parameters.len()))?;
    for (field, value) in parameters {
        map.serialize_entry(field, &Integer::from(value))?;
    }
    map.end()
}

/// An immutable key value.
///
/// The set of parameters always matches what the algorithm and key type
/// require; [`Key::new`] and every decoder enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    algorithm: Algorithm,
    #[serde(rename = "type")]
    key_type: KeyType,
    format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    curve: Option<Curve>,
    #[serde(serialize_with = "serialize_parameters")]
    parameters: Parameters,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

impl Key {
    /// Builds a key from raw parameters, checking them against the fields
    /// registered for `algorithm`. `format` records the intended encoding.
    pub fn new(
        algorithm: Algorithm,
        key_type: KeyType,
        format: Format,
        curve: Option<Curve>,
        parameters: Parameters,
    ) -> Result<Key> {
        let mapper = Registry::get().mapper(algorithm)?;
        let spec = mapper.fields(key_type);

        for field in spec.required {
            if !parameters.contains_key(field) {
                return Err(Error::MissingField {
                    algorithm,
                    key_type,
                    field: *field,
                });
            }
        }
        if let Some(field) = parameters.keys().find(|f| !spec.allows(**f)) {
            return Err(Error::UnexpectedField {
                algorithm,
                key_type,
                field: *field,
            });
        }
        match (mapper.uses_curve(), curve) {
            (true, None) => return Err(Error::MissingCurve(algorithm)),
            (false, Some(_)) => return Err(Error::UnexpectedCurve(algorithm)),
            _ => {}
        }

        Ok(Key {
            algorithm,
            key_type,
            format,
            curve,
            parameters,
            comment: None,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    pub fn is_private(&self) -> bool {
        self.key_type == KeyType::Private
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn curve(&self) -> Option<Curve> {
        self.curve
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn get(&self, field: Field) -> Option<&BigInt> {
        self.parameters.get(&field)
    }

    /// Like [`Key::get`], failing with `MissingField` when absent.
    pub fn require(&self, field: Field) -> Result<&BigInt> {
        self.get(field).ok_or(Error::MissingField {
            algorithm: self.algorithm,
            key_type: self.key_type,
            field,
        })
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn with_comment(&self, comment: Option<String>) -> Key {
        Key {
            comment,
            ..self.clone()
        }
    }

    pub fn with_format(&self, format: Format) -> Key {
        Key {
            format,
            ..self.clone()
        }
    }

    /// The public half of this key. Public keys are returned unchanged.
    pub fn to_public(&self) -> Result<Key> {
        if !self.is_private() {
            return Ok(self.clone());
        }
        let mapper = Registry::get().mapper(self.algorithm)?;
        let parameters = mapper
            .fields(KeyType::Public)
            .required
            .iter()
            .map(|field| Ok((*field, self.require(*field)?.clone())))
            .collect::<Result<Parameters>>()?;
        let key = Key::new(
            self.algorithm,
            KeyType::Public,
            self.format,
            self.curve,
            parameters,
        )?;
        Ok(key.with_comment(self.comment.clone()))
    }
}
