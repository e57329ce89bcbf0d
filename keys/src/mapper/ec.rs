use asn1::{BitString, Element, OctetString};
use kagi::decoder::Decoder;
use kagi::encoder::Encoder;
use pem::Label;
use pkcs::AlgorithmIdentifier;
use pkcs::pkcs8::PrivateKeyInfo;
use pkcs::sec1::{ECPrivateKey, decode_point, encode_point, to_field_bytes};
use pkcs::spki::SubjectPublicKeyInfo;
use ssh::{SshReader, SshWriter};
use tracing::trace;

use super::{AlgorithmMapper, FieldSpec, KeyMaterial, unsupported};
use crate::error::{Error, Result};
use crate::key::{Algorithm, Curve, Field, Format, Key, KeyType, Parameters};

const SSH_NAMES: &[&str] = &[
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
];

const PUBLIC_FIELDS: &[Field] = &[Field::X, Field::Y];
const PRIVATE_FIELDS: &[Field] = &[Field::X, Field::Y, Field::D];

#[derive(Debug, Clone, Copy, Default)]
pub struct EcMapper;

impl EcMapper {
    fn curve(key: &Key) -> Result<Curve> {
        key.curve().ok_or(Error::MissingCurve(Algorithm::Ec))
    }

    fn curve_for_name(name: &str) -> Result<Curve> {
        name.strip_prefix("ecdsa-sha2-")
            .and_then(Curve::from_ssh_identifier)
            .ok_or_else(|| Error::UnknownAlgorithmName(name.to_string()))
    }

    fn point(key: &Key, curve: Curve) -> Result<Vec<u8>> {
        Ok(encode_point(
            curve,
            key.require(Field::X)?,
            key.require(Field::Y)?,
        )?)
    }

    fn from_point(curve: Curve, point: &[u8]) -> Result<KeyMaterial> {
        let (x, y) = decode_point(curve, point)?;
        Ok(KeyMaterial::new(Parameters::from([(Field::X, x), (Field::Y, y)])).with_curve(curve))
    }

    // No point arithmetic here, so the public point has to be stored.
    fn from_private(curve: Curve, key: &ECPrivateKey) -> Result<KeyMaterial> {
        let point = key.public_point()?.ok_or(Error::MissingField {
            algorithm: Algorithm::Ec,
            key_type: KeyType::Private,
            field: Field::X,
        })?;
        let mut material = Self::from_point(curve, point)?;
        material.parameters.insert(Field::D, key.scalar());
        Ok(material)
    }

    fn to_private(key: &Key, curve: Curve, named: bool) -> Result<ECPrivateKey> {
        let d = to_field_bytes(key.require(Field::D)?, curve.field_size())?;
        Ok(ECPrivateKey::new(
            OctetString::from(d),
            named.then_some(curve),
            Some(BitString::from(Self::point(key, curve)?)),
        ))
    }
}

impl AlgorithmMapper for EcMapper {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Ec
    }

    fn oid(&self) -> &'static str {
        AlgorithmIdentifier::OID_EC_PUBLIC_KEY
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

    fn uses_curve(&self) -> bool {
        true
    }

    fn traditional_label(&self, key_type: KeyType) -> Option<Label> {
        match key_type {
            KeyType::Public => None,
            KeyType::Private => Some(Label::EcPrivateKey),
        }
    }

    fn ssh_name(&self, key: &Key) -> Result<&'static str> {
        Ok(match Self::curve(key)? {
            Curve::P256 => SSH_NAMES[0],
            Curve::P384 => SSH_NAMES[1],
            Curve::P521 => SSH_NAMES[2],
        })
    }

    // string "ecdsa-sha2-<id>", string <id>, string Q
    fn decode_ssh(&self, name: &str, reader: &mut SshReader<'_>) -> Result<KeyMaterial> {
        let curve = Self::curve_for_name(name)?;
        let identifier = reader.read_name()?;
        if identifier != curve.ssh_identifier() {
            return Err(Error::CurveMismatch {
                name: name.to_string(),
                curve: identifier.to_string(),
            });
        }
        let point = reader.read_string()?;
        trace!(%curve, "read EC public key blob");
        Self::from_point(curve, point)
    }

    fn encode_ssh(&self, key: &Key, writer: &mut SshWriter) -> Result<()> {
        let curve = Self::curve(key)?;
        writer
            .put_name(curve.ssh_identifier())
            .put_string(&Self::point(key, curve)?);
        Ok(())
    }

    fn decode_spki(&self, spki: &SubjectPublicKeyInfo) -> Result<KeyMaterial> {
        let curve = spki.algorithm.named_curve()?;
        trace!(%curve, "read EC SubjectPublicKeyInfo");
        Self::from_point(curve, spki.public_key()?)
    }

    fn encode_spki(&self, key: &Key) -> Result<SubjectPublicKeyInfo> {
        let curve = Self::curve(key)?;
        Ok(SubjectPublicKeyInfo::new(
            AlgorithmIdentifier::ec_public_key(curve)?,
            Self::point(key, curve)?,
        ))
    }

    fn decode_pkcs8(&self, info: &PrivateKeyInfo) -> Result<KeyMaterial> {
        let curve = info.private_key_algorithm.named_curve()?;
        let key: ECPrivateKey = pkcs::decode_der(info.private_key.as_bytes())?;
        if key.parameters.is_some_and(|inner| inner != curve) {
            return Err(Error::UnexpectedParameters(Algorithm::Ec));
        }
        trace!(%curve, "read ECPrivateKey from PKCS#8");
        Self::from_private(curve, &key)
    }

    fn encode_pkcs8(&self, key: &Key) -> Result<PrivateKeyInfo> {
        let curve = Self::curve(key)?;
        let inner = Self::to_private(key, curve, false)?;
        Ok(PrivateKeyInfo::new(
            AlgorithmIdentifier::ec_public_key(curve)?,
            pkcs::encode_der(&inner)?,
        ))
    }

    fn decode_traditional(&self, key_type: KeyType, element: &Element) -> Result<KeyMaterial> {
        if key_type == KeyType::Public {
            return Err(Error::UnrecognizedStructure);
        }
        let key: ECPrivateKey = element.decode()?;
        let curve = key.parameters.ok_or(Error::MissingCurve(Algorithm::Ec))?;
        Self::from_private(curve, &key)
    }

    fn encode_traditional(&self, key: &Key) -> Result<Element> {
        if !key.is_private() {
            return Err(unsupported(key, Format::PemPkcs1));
        }
        let curve = Self::curve(key)?;
        Ok(Self::to_private(key, curve, true)?.encode()?)
    }
}

#[cfg(test)]
mod tests {
    use kagi::ErrorKind;
    use num_bigint::BigInt;
    use rstest::rstest;
    use ssh::{SshReader, SshWriter};

    use super::EcMapper;
    use crate::key::{Algorithm, Curve, Field, Format, Key, KeyType, Parameters};
    use crate::mapper::AlgorithmMapper;

    fn private_key(curve: Curve) -> Key {
        Key::new(
            Algorithm::Ec,
            KeyType::Private,
            Format::PemPkcs1,
            Some(curve),
            Parameters::from([
                (Field::X, BigInt::from(5)),
                (Field::Y, BigInt::from(7)),
                (Field::D, BigInt::from(9)),
            ]),
        )
        .unwrap()
    }

    #[rstest(
        curve,
        name,
        case(Curve::P256, "ecdsa-sha2-nistp256"),
        case(Curve::P384, "ecdsa-sha2-nistp384"),
        case(Curve::P521, "ecdsa-sha2-nistp521")
    )]
    fn test_ssh_round_trip(curve: Curve, name: &str) {
        let public = private_key(curve).to_public().unwrap();
        assert_eq!(EcMapper.ssh_name(&public).unwrap(), name);
        let mut writer = SshWriter::new();
        EcMapper.encode_ssh(&public, &mut writer).unwrap();
        let bytes = writer.into_inner();
        let mut reader = SshReader::new(&bytes);
        let material = EcMapper.decode_ssh(name, &mut reader).unwrap();
        reader.finish().unwrap();
        assert_eq!(material.curve, Some(curve));
        assert_eq!(&material.parameters, public.parameters());
    }

    #[test]
    fn test_ssh_curve_mismatch() {
        let public = private_key(Curve::P384).to_public().unwrap();
        let mut writer = SshWriter::new();
        EcMapper.encode_ssh(&public, &mut writer).unwrap();
        let bytes = writer.into_inner();
        let mut reader = SshReader::new(&bytes);
        let err = EcMapper
            .decode_ssh("ecdsa-sha2-nistp256", &mut reader)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownAlgorithmName);
    }

    #[test]
    fn test_private_scalar_padded() {
        let info = EcMapper.encode_pkcs8(&private_key(Curve::P521)).unwrap();
        let material = EcMapper.decode_pkcs8(&info).unwrap();
        assert_eq!(material.curve, Some(Curve::P521));
        assert_eq!(material.parameters[&Field::D], BigInt::from(9));

        let element = EcMapper.encode_traditional(&private_key(Curve::P521)).unwrap();
        let der = element.to_der().unwrap();
        // SEQUENCE (long form), INTEGER 1, OCTET STRING of 66 bytes
        assert_eq!(&der[3..8], &[0x02, 0x01, 0x01, 0x04, 0x42]);
    }

    #[test]
    fn test_public_traditional_unsupported() {
        let public = private_key(Curve::P256).to_public().unwrap();
        let err = EcMapper.encode_traditional(&public).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedConversion);
    }
}
