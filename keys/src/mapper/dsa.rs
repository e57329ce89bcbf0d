use asn1::{Element, Integer};
use kagi::decoder::Decoder;
use kagi::encoder::Encoder;
use pem::Label;
use pkcs::AlgorithmIdentifier;
use pkcs::dsa::{DsaParameters, DsaPrivateKey};
use pkcs::pkcs8::PrivateKeyInfo;
use pkcs::spki::SubjectPublicKeyInfo;
use ssh::{SshReader, SshWriter};
use tracing::trace;

use super::{AlgorithmMapper, FieldSpec, KeyMaterial, integer, unsupported};
use crate::error::{Error, Result};
use crate::key::{Algorithm, Field, Format, Key, KeyType, Parameters};

const SSH_NAMES: &[&str] = &["ssh-dss"];

const PUBLIC_FIELDS: &[Field] = &[Field::P, Field::Q, Field::G, Field::Y];
const PRIVATE_FIELDS: &[Field] = &[Field::P, Field::Q, Field::G, Field::X];
// PKCS#8 carries only x; the traditional layout also has y
const PRIVATE_OPTIONAL_FIELDS: &[Field] = &[Field::Y];

#[derive(Debug, Clone, Copy, Default)]
pub struct DsaMapper;

impl DsaMapper {
    fn parameters(key: &Key) -> Result<DsaParameters> {
        Ok(DsaParameters {
            p: integer(key, Field::P)?,
            q: integer(key, Field::Q)?,
            g: integer(key, Field::G)?,
        })
    }

    fn with_domain(parameters: DsaParameters) -> Parameters {
        Parameters::from([
            (Field::P, parameters.p.into_bigint()),
            (Field::Q, parameters.q.into_bigint()),
            (Field::G, parameters.g.into_bigint()),
        ])
    }

    // The key itself is a bare INTEGER wrapped in a BIT STRING or OCTET STRING.
    fn bare_integer(bytes: &[u8]) -> Result<Integer> {
        match Element::from_der(bytes)? {
            Element::Integer(value) => Ok(value),
            _ => Err(Error::UnrecognizedStructure),
        }
    }
}

impl AlgorithmMapper for DsaMapper {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dsa
    }

    fn oid(&self) -> &'static str {
        AlgorithmIdentifier::OID_ID_DSA
    }

    fn ssh_names(&self) -> &'static [&'static str] {
        SSH_NAMES
    }

    fn fields(&self, key_type: KeyType) -> FieldSpec {
        match key_type {
            KeyType::Public => FieldSpec {
                required: PUBLIC_FIELDS,
                optional: &[],
            },
            KeyType::Private => FieldSpec {
                required: PRIVATE_FIELDS,
                optional: PRIVATE_OPTIONAL_FIELDS,
            },
        }
    }

    fn traditional_label(&self, key_type: KeyType) -> Option<Label> {
        match key_type {
            KeyType::Public => None,
            KeyType::Private => Some(Label::DsaPrivateKey),
        }
    }

    fn ssh_name(&self, _key: &Key) -> Result<&'static str> {
        Ok(SSH_NAMES[0])
    }

    // string "ssh-dss", mpint p, mpint q, mpint g, mpint y
    fn decode_ssh(&self, _name: &str, reader: &mut SshReader<'_>) -> Result<KeyMaterial> {
        let mut parameters = Parameters::new();
        for field in PUBLIC_FIELDS {
            parameters.insert(*field, reader.read_mpint()?);
        }
        trace!("read DSA public key blob");
        Ok(KeyMaterial::new(parameters))
    }

    fn encode_ssh(&self, key: &Key, writer: &mut SshWriter) -> Result<()> {
        for field in PUBLIC_FIELDS {
            writer.put_mpint(key.require(*field)?)?;
        }
        Ok(())
    }

    fn decode_spki(&self, spki: &SubjectPublicKeyInfo) -> Result<KeyMaterial> {
        let domain = spki.algorithm.dsa_parameters()?;
        let y = Self::bare_integer(spki.public_key()?)?;
        trace!(bits = domain.p.as_bigint().bits(), "read DSA SubjectPublicKeyInfo");
        let mut parameters = Self::with_domain(domain);
        parameters.insert(Field::Y, y.into_bigint());
        Ok(KeyMaterial::new(parameters))
    }

    fn encode_spki(&self, key: &Key) -> Result<SubjectPublicKeyInfo> {
        let algorithm = AlgorithmIdentifier::dsa(&Self::parameters(key)?)?;
        let y = Element::Integer(integer(key, Field::Y)?).to_der()?;
        Ok(SubjectPublicKeyInfo::new(algorithm, y))
    }

    fn decode_pkcs8(&self, info: &PrivateKeyInfo) -> Result<KeyMaterial> {
        let domain = info.private_key_algorithm.dsa_parameters()?;
        let x = Self::bare_integer(info.private_key.as_bytes())?;
        trace!(bits = domain.p.as_bigint().bits(), "read DSA private key from PKCS#8");
        let mut parameters = Self::with_domain(domain);
        parameters.insert(Field::X, x.into_bigint());
        Ok(KeyMaterial::new(parameters))
    }

    fn encode_pkcs8(&self, key: &Key) -> Result<PrivateKeyInfo> {
        let algorithm = AlgorithmIdentifier::dsa(&Self::parameters(key)?)?;
        let x = Element::Integer(integer(key, Field::X)?).to_der()?;
        Ok(PrivateKeyInfo::new(algorithm, x))
    }

    fn decode_traditional(&self, key_type: KeyType, element: &Element) -> Result<KeyMaterial> {
        if key_type == KeyType::Public {
            return Err(Error::UnrecognizedStructure);
        }
        let key: DsaPrivateKey = element.decode()?;
        let mut parameters = Self::with_domain(key.parameters);
        parameters.insert(Field::Y, key.public_key.into_bigint());
        parameters.insert(Field::X, key.private_key.into_bigint());
        Ok(KeyMaterial::new(parameters))
    }

    fn encode_traditional(&self, key: &Key) -> Result<Element> {
        if !key.is_private() {
            return Err(unsupported(key, Format::PemPkcs1));
        }
        // the OpenSSL layout has no slot to leave y out
        let key = DsaPrivateKey {
            parameters: Self::parameters(key)?,
            public_key: integer(key, Field::Y)?,
            private_key: integer(key, Field::X)?,
        };
        Ok(key.encode()?)
    }
}
