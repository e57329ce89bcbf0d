use asn1::Element;
use kagi::decoder::Decoder;
use kagi::encoder::Encoder;
use pem::Label;
use pkcs::AlgorithmIdentifier;
use pkcs::pkcs1::{RSAPrivateKey, RSAPublicKey};
use pkcs::pkcs8::PrivateKeyInfo;
use pkcs::spki::SubjectPublicKeyInfo;
use ssh::{SshReader, SshWriter};
use tracing::trace;

use super::{AlgorithmMapper, FieldSpec, KeyMaterial, integer};
use crate::error::{Error, Result};
use crate::key::{Algorithm, Field, Key, KeyType, Parameters};

const SSH_NAMES: &[&str] = &["ssh-rsa"];

const PUBLIC_FIELDS: &[Field] = &[Field::Modulus, Field::PublicExponent];

const PRIVATE_FIELDS: &[Field] = &[
    Field::Modulus,
    Field::PublicExponent,
    Field::PrivateExponent,
    Field::PrimeP,
    Field::PrimeQ,
    Field::ExponentP,
    Field::ExponentQ,
    Field::Coefficient,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct RsaMapper;

impl RsaMapper {
    fn from_public(key: RSAPublicKey) -> KeyMaterial {
        KeyMaterial::new(Parameters::from([
            (Field::Modulus, key.modulus.into_bigint()),
            (Field::PublicExponent, key.public_exponent.into_bigint()),
        ]))
    }

    fn from_private(key: RSAPrivateKey) -> KeyMaterial {
        KeyMaterial::new(Parameters::from([
            (Field::Modulus, key.modulus.into_bigint()),
            (Field::PublicExponent, key.public_exponent.into_bigint()),
            (Field::PrivateExponent, key.private_exponent.into_bigint()),
            (Field::PrimeP, key.prime1.into_bigint()),
            (Field::PrimeQ, key.prime2.into_bigint()),
            (Field::ExponentP, key.exponent1.into_bigint()),
            (Field::ExponentQ, key.exponent2.into_bigint()),
            (Field::Coefficient, key.coefficient.into_bigint()),
        ]))
    }

    fn to_public(key: &Key) -> Result<RSAPublicKey> {
        Ok(RSAPublicKey {
            modulus: integer(key, Field::Modulus)?,
            public_exponent: integer(key, Field::PublicExponent)?,
        })
    }

    fn to_private(key: &Key) -> Result<RSAPrivateKey> {
        Ok(RSAPrivateKey {
            modulus: integer(key, Field::Modulus)?,
            public_exponent: integer(key, Field::PublicExponent)?,
            private_exponent: integer(key, Field::PrivateExponent)?,
            prime1: integer(key, Field::PrimeP)?,
            prime2: integer(key, Field::PrimeQ)?,
            exponent1: integer(key, Field::ExponentP)?,
            exponent2: integer(key, Field::ExponentQ)?,
            coefficient: integer(key, Field::Coefficient)?,
        })
    }

    // RFC 3279 asks for NULL; an absent field is accepted too.
    fn check_parameters(algorithm: &AlgorithmIdentifier) -> Result<()> {
        match algorithm.parameters {
            None | Some(Element::Null) => Ok(()),
            Some(_) => Err(Error::UnexpectedParameters(Algorithm::Rsa)),
        }
    }
}

impl AlgorithmMapper for RsaMapper {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Rsa
    }

    fn oid(&self) -> &'static str {
        AlgorithmIdentifier::OID_RSA_ENCRYPTION
    }

    fn ssh_names(&self) -> &'static [&'static str] {
        SSH_NAMES
    }

    fn fields(&self, key_type: KeyType) -> FieldSpec {
        let required = match key_type {
            KeyType::Public => PUBLIC_FIELDS,
            KeyType::Private => PRIVATE_FIELDS,
        };
        FieldSpec {
            required,
            optional: &[],
        }
    }

    fn traditional_label(&self, key_type: KeyType) -> Option<Label> {
        match key_type {
            KeyType::Public => Some(Label::RsaPublicKey),
            KeyType::Private => Some(Label::RsaPrivateKey),
        }
    }

    fn ssh_name(&self, _key: &Key) -> Result<&'static str> {
        Ok(SSH_NAMES[0])
    }

    // string "ssh-rsa", mpint e, mpint n
    fn decode_ssh(&self, _name: &str, reader: &mut SshReader<'_>) -> Result<KeyMaterial> {
        let e = reader.read_mpint()?;
        let n = reader.read_mpint()?;
        trace!(bits = n.bits(), "read RSA public key blob");
        Ok(KeyMaterial::new(Parameters::from([
            (Field::Modulus, n),
            (Field::PublicExponent, e),
        ])))
    }

    fn encode_ssh(&self, key: &Key, writer: &mut SshWriter) -> Result<()> {
        writer.put_mpint(key.require(Field::PublicExponent)?)?;
        writer.put_mpint(key.require(Field::Modulus)?)?;
        Ok(())
    }

    fn decode_spki(&self, spki: &SubjectPublicKeyInfo) -> Result<KeyMaterial> {
        Self::check_parameters(&spki.algorithm)?;
        let key: RSAPublicKey = pkcs::decode_der(spki.public_key()?)?;
        trace!(
            bits = key.modulus.as_bigint().bits(),
            "read RSAPublicKey from SubjectPublicKeyInfo"
        );
        Ok(Self::from_public(key))
    }

    fn encode_spki(&self, key: &Key) -> Result<SubjectPublicKeyInfo> {
        let public = pkcs::encode_der(&Self::to_public(key)?)?;
        Ok(SubjectPublicKeyInfo::new(
            AlgorithmIdentifier::rsa_encryption()?,
            public,
        ))
    }

    fn decode_pkcs8(&self, info: &PrivateKeyInfo) -> Result<KeyMaterial> {
        Self::check_parameters(&info.private_key_algorithm)?;
        let key: RSAPrivateKey = pkcs::decode_der(info.private_key.as_bytes())?;
        trace!(bits = key.modulus.as_bigint().bits(), "read RSAPrivateKey from PKCS#8");
        Ok(Self::from_private(key))
    }

    fn encode_pkcs8(&self, key: &Key) -> Result<PrivateKeyInfo> {
        let private = pkcs::encode_der(&Self::to_private(key)?)?;
        Ok(PrivateKeyInfo::new(
            AlgorithmIdentifier::rsa_encryption()?,
            private,
        ))
    }

    fn decode_traditional(&self, key_type: KeyType, element: &Element) -> Result<KeyMaterial> {
        match key_type {
            KeyType::Public => {
                let key: RSAPublicKey = element.decode()?;
                Ok(Self::from_public(key))
            }
            KeyType::Private => {
                let key: RSAPrivateKey = element.decode()?;
                Ok(Self::from_private(key))
            }
        }
    }

    fn encode_traditional(&self, key: &Key) -> Result<Element> {
        match key.key_type() {
            KeyType::Public => Ok(Self::to_public(key)?.encode()?),
            KeyType::Private => Ok(Self::to_private(key)?.encode()?),
        }
    }
}
