use keys::{Algorithm, Curve, Encoded, Field, Format, Key, KeyType, Parameters, decode, encode};
use kagi::ErrorKind;
use num_bigint::BigInt;
use rstest::rstest;

const RSA_1024_N: &str = "135905486259440517865209646173404599620534038194720785268198047236531688043506844685016583428372835435220698959380274944299188367170659944106975596667826978706315566471628578261842471420597120743317216099328752675861458318080712703168279100665220735106095274989162651313663427091041601632551803263009289467403";
const RSA_1024_P: &str = "12876895445165709746224440477571759465822288830951920295961154484319359210188563833017576319846567037198835692972489513564321026958344372663920416826043197";
const DSA_1024_X: &str = "21860298249768970399274461426452131230560768229969370307878954549892";
const EC_P256_X: &str = "43554997745228333395297980692181111437518056258418618493037533437268017894615";
const EC_P256_Y: &str = "104478022840883212943400931172714091151952358782043166999062245814662639557916";
const EC_P256_D: &str = "70699471715301327946207417106550931413476903673589690701613283896752127529606";

const COMMENT: &str = "dblevins@mingus.lan";

fn int(decimal: &str) -> BigInt {
    decimal.parse().unwrap()
}

#[rstest(
    input,
    algorithm,
    key_type,
    format,
    case(include_bytes!("resources/rsa-1024/public.openssh").as_slice(), Algorithm::Rsa, KeyType::Public, Format::OpenSsh),
    case(include_bytes!("resources/rsa-1024/public.ssh2").as_slice(), Algorithm::Rsa, KeyType::Public, Format::Ssh2),
    case(include_bytes!("resources/rsa-1024/public.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Public, Format::PemPkcs1),
    case(include_bytes!("resources/rsa-1024/public.pkcs8.pem").as_slice(), Algorithm::Rsa, KeyType::Public, Format::PemPkcs8),
    case(include_bytes!("resources/rsa-1024/public.pkcs8.der").as_slice(), Algorithm::Rsa, KeyType::Public, Format::DerPkcs8),
    case(include_bytes!("resources/rsa-1024/private.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Private, Format::PemPkcs1),
    case(include_bytes!("resources/rsa-1024/private.pkcs8.pem").as_slice(), Algorithm::Rsa, KeyType::Private, Format::PemPkcs8),
    case(include_bytes!("resources/rsa-1024/private.pkcs8.der").as_slice(), Algorithm::Rsa, KeyType::Private, Format::DerPkcs8),
    case(include_bytes!("resources/rsa-2048/public.openssh").as_slice(), Algorithm::Rsa, KeyType::Public, Format::OpenSsh),
    case(include_bytes!("resources/rsa-2048/public.ssh2").as_slice(), Algorithm::Rsa, KeyType::Public, Format::Ssh2),
    case(include_bytes!("resources/rsa-2048/public.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Public, Format::PemPkcs1),
    case(include_bytes!("resources/rsa-2048/public.pkcs8.pem").as_slice(), Algorithm::Rsa, KeyType::Public, Format::PemPkcs8),
    case(include_bytes!("resources/rsa-2048/public.pkcs8.der").as_slice(), Algorithm::Rsa, KeyType::Public, Format::DerPkcs8),
    case(include_bytes!("resources/rsa-2048/private.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Private, Format::PemPkcs1),
    case(include_bytes!("resources/rsa-2048/private.pkcs8.pem").as_slice(), Algorithm::Rsa, KeyType::Private, Format::PemPkcs8),
    case(include_bytes!("resources/rsa-2048/private.pkcs8.der").as_slice(), Algorithm::Rsa, KeyType::Private, Format::DerPkcs8),
    case(include_bytes!("resources/dsa-1024/public.openssh").as_slice(), Algorithm::Dsa, KeyType::Public, Format::OpenSsh),
    case(include_bytes!("resources/dsa-1024/public.ssh2").as_slice(), Algorithm::Dsa, KeyType::Public, Format::Ssh2),
    case(include_bytes!("resources/dsa-1024/public.pkcs8.pem").as_slice(), Algorithm::Dsa, KeyType::Public, Format::PemPkcs8),
    case(include_bytes!("resources/dsa-1024/public.pkcs8.der").as_slice(), Algorithm::Dsa, KeyType::Public, Format::DerPkcs8),
    case(include_bytes!("resources/dsa-1024/private.pkcs1.pem").as_slice(), Algorithm::Dsa, KeyType::Private, Format::PemPkcs1),
    case(include_bytes!("resources/dsa-1024/private.pkcs8.pem").as_slice(), Algorithm::Dsa, KeyType::Private, Format::PemPkcs8),
    case(include_bytes!("resources/dsa-1024/private.pkcs8.der").as_slice(), Algorithm::Dsa, KeyType::Private, Format::DerPkcs8),
    case(include_bytes!("resources/ec-p256/public.openssh").as_slice(), Algorithm::Ec, KeyType::Public, Format::OpenSsh),
    case(include_bytes!("resources/ec-p256/public.ssh2").as_slice(), Algorithm::Ec, KeyType::Public, Format::Ssh2),
    case(include_bytes!("resources/ec-p256/public.pkcs8.pem").as_slice(), Algorithm::Ec, KeyType::Public, Format::PemPkcs8),
    case(include_bytes!("resources/ec-p256/public.pkcs8.der").as_slice(), Algorithm::Ec, KeyType::Public, Format::DerPkcs8),
    case(include_bytes!("resources/ec-p256/private.pkcs1.pem").as_slice(), Algorithm::Ec, KeyType::Private, Format::PemPkcs1),
    case(include_bytes!("resources/ec-p256/private.pkcs8.pem").as_slice(), Algorithm::Ec, KeyType::Private, Format::PemPkcs8),
    case(include_bytes!("resources/ec-p256/private.pkcs8.der").as_slice(), Algorithm::Ec, KeyType::Private, Format::DerPkcs8)
)]
fn test_reproduces_input(input: &[u8], algorithm: Algorithm, key_type: KeyType, format: Format) {
    let key = decode(input).unwrap();
    assert_eq!(key.algorithm(), algorithm);
    assert_eq!(key.key_type(), key_type);
    assert_eq!(key.format(), format);
    let encoded = encode(&key, format).unwrap();
    assert_eq!(encoded.as_bytes(), input);
    assert_eq!(format.is_binary(), matches!(encoded, Encoded::Binary(_)));
}

#[test]
fn test_rsa_values() {
    let public = decode(include_bytes!("resources/rsa-1024/public.openssh")).unwrap();
    assert_eq!(public.get(Field::Modulus), Some(&int(RSA_1024_N)));
    assert_eq!(public.get(Field::PublicExponent), Some(&BigInt::from(65537)));
    assert_eq!(public.comment(), Some(COMMENT));
    assert_eq!(public.curve(), None);

    let private = decode(include_bytes!("resources/rsa-1024/private.pkcs1.pem")).unwrap();
    assert_eq!(private.get(Field::PrimeP), Some(&int(RSA_1024_P)));
    assert_eq!(private.parameters().len(), 8);
    assert_eq!(private.comment(), None);
}

#[test]
fn test_dsa_values() {
    let private = decode(include_bytes!("resources/dsa-1024/private.pkcs8.pem")).unwrap();
    assert_eq!(private.get(Field::X), Some(&int(DSA_1024_X)));
    // PKCS#8 stores only x next to the domain parameters
    assert_eq!(private.get(Field::Y), None);
    assert_eq!(private.require(Field::Q).unwrap().bits(), 224);

    let traditional = decode(include_bytes!("resources/dsa-1024/private.pkcs1.pem")).unwrap();
    let public = decode(include_bytes!("resources/dsa-1024/public.openssh")).unwrap();
    assert_eq!(traditional.get(Field::Y), public.get(Field::Y));
}

#[test]
fn test_ec_values() {
    let private = decode(include_bytes!("resources/ec-p256/private.pkcs1.pem")).unwrap();
    assert_eq!(private.curve(), Some(Curve::P256));
    assert_eq!(private.get(Field::X), Some(&int(EC_P256_X)));
    assert_eq!(private.get(Field::Y), Some(&int(EC_P256_Y)));
    assert_eq!(private.get(Field::D), Some(&int(EC_P256_D)));

    let public = decode(include_bytes!("resources/ec-p256/public.ssh2")).unwrap();
    assert_eq!(public.curve(), Some(Curve::P256));
    assert_eq!(public.comment(), Some(COMMENT));
    assert_eq!(public.parameters(), private.to_public().unwrap().parameters());
}

#[rstest(
    inputs,
    case(vec![
        include_bytes!("resources/rsa-1024/public.openssh").as_slice(),
        include_bytes!("resources/rsa-1024/public.ssh2").as_slice(),
        include_bytes!("resources/rsa-1024/public.pkcs1.pem").as_slice(),
        include_bytes!("resources/rsa-1024/public.pkcs8.pem").as_slice(),
        include_bytes!("resources/rsa-1024/public.pkcs8.der").as_slice(),
        include_bytes!("resources/rsa-1024/private.pkcs1.pem").as_slice(),
        include_bytes!("resources/rsa-1024/private.pkcs8.der").as_slice(),
    ]),
    case(vec![
        include_bytes!("resources/dsa-1024/public.openssh").as_slice(),
        include_bytes!("resources/dsa-1024/public.ssh2").as_slice(),
        include_bytes!("resources/dsa-1024/public.pkcs8.pem").as_slice(),
        include_bytes!("resources/dsa-1024/private.pkcs1.pem").as_slice(),
    ]),
    case(vec![
        include_bytes!("resources/ec-p256/public.openssh").as_slice(),
        include_bytes!("resources/ec-p256/public.pkcs8.der").as_slice(),
        include_bytes!("resources/ec-p256/private.pkcs1.pem").as_slice(),
        include_bytes!("resources/ec-p256/private.pkcs8.pem").as_slice(),
    ])
)]
fn test_formats_agree_on_public_values(inputs: Vec<&[u8]>) {
    let keys: Vec<Key> = inputs
        .iter()
        .map(|input| decode(input).unwrap().to_public().unwrap())
        .collect();
    for key in &keys[1..] {
        assert_eq!(key.algorithm(), keys[0].algorithm());
        assert_eq!(key.curve(), keys[0].curve());
        assert_eq!(key.parameters(), keys[0].parameters());
    }
}

#[rstest(
    input,
    format,
    expected,
    case(include_bytes!("resources/rsa-1024/public.openssh").as_slice(), Format::PemPkcs8, include_bytes!("resources/rsa-1024/public.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/rsa-1024/public.openssh").as_slice(), Format::PemPkcs1, include_bytes!("resources/rsa-1024/public.pkcs1.pem").as_slice()),
    case(include_bytes!("resources/rsa-1024/public.openssh").as_slice(), Format::Ssh2, include_bytes!("resources/rsa-1024/public.ssh2").as_slice()),
    case(include_bytes!("resources/rsa-2048/private.pkcs1.pem").as_slice(), Format::PemPkcs8, include_bytes!("resources/rsa-2048/private.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/rsa-2048/private.pkcs8.der").as_slice(), Format::PemPkcs1, include_bytes!("resources/rsa-2048/private.pkcs1.pem").as_slice()),
    case(include_bytes!("resources/dsa-1024/public.ssh2").as_slice(), Format::DerPkcs8, include_bytes!("resources/dsa-1024/public.pkcs8.der").as_slice()),
    case(include_bytes!("resources/dsa-1024/private.pkcs1.pem").as_slice(), Format::PemPkcs8, include_bytes!("resources/dsa-1024/private.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/ec-p256/public.openssh").as_slice(), Format::PemPkcs8, include_bytes!("resources/ec-p256/public.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/ec-p256/private.pkcs1.pem").as_slice(), Format::DerPkcs8, include_bytes!("resources/ec-p256/private.pkcs8.der").as_slice()),
    case(include_bytes!("resources/ec-p256/private.pkcs8.pem").as_slice(), Format::PemPkcs1, include_bytes!("resources/ec-p256/private.pkcs1.pem").as_slice())
)]
fn test_convert(input: &[u8], format: Format, expected: &[u8]) {
    let key = decode(input).unwrap();
    assert_eq!(encode(&key, format).unwrap().as_bytes(), expected);
}

#[rstest(
    private,
    public,
    case(include_bytes!("resources/rsa-2048/private.pkcs1.pem").as_slice(), include_bytes!("resources/rsa-2048/public.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/dsa-1024/private.pkcs1.pem").as_slice(), include_bytes!("resources/dsa-1024/public.pkcs8.pem").as_slice()),
    case(include_bytes!("resources/ec-p256/private.pkcs8.der").as_slice(), include_bytes!("resources/ec-p256/public.pkcs8.pem").as_slice())
)]
fn test_public_half_of_private_key(private: &[u8], public: &[u8]) {
    let key = decode(private).unwrap().to_public().unwrap();
    assert_eq!(key.key_type(), KeyType::Public);
    assert_eq!(encode(&key, Format::PemPkcs8).unwrap().as_bytes(), public);
}

#[test]
fn test_openssh_comment() {
    let input = include_str!("resources/ec-p256/public.openssh");
    let key = decode(input.as_bytes()).unwrap();

    let bare = key.with_comment(None);
    let line = encode(&bare, Format::OpenSsh).unwrap();
    assert_eq!(
        line.as_text().unwrap(),
        input.replace(&format!(" {}", COMMENT), "")
    );
    // a line without comment decodes back to a key without comment
    assert_eq!(decode(line.as_bytes()).unwrap(), bare);

    let options = keys::EncodeOptions {
        comment: Some("ops@example.com".to_string()),
        ..Default::default()
    };
    let line = keys::encode_with(&key, Format::OpenSsh, &options).unwrap();
    assert!(line.as_text().unwrap().ends_with(" ops@example.com\n"));
}

#[test]
fn test_pem_line_width() {
    let key = decode(include_bytes!("resources/rsa-2048/public.pkcs8.der")).unwrap();
    let options = keys::EncodeOptions {
        pem_line_width: 76,
        ..Default::default()
    };
    let pem = keys::encode_with(&key, Format::PemPkcs8, &options).unwrap();
    let text = pem.as_text().unwrap();
    let body: Vec<&str> = text.lines().filter(|l| !l.starts_with("-----")).collect();
    assert!(body[..body.len() - 1].iter().all(|l| l.len() == 76));
    assert_eq!(decode(pem.as_bytes()).unwrap().parameters(), key.parameters());
}

#[test]
fn test_ssh_blob() {
    let key = decode(include_bytes!("resources/rsa-1024/public.pkcs1.pem")).unwrap();
    let blob = keys::to_ssh_blob(&key).unwrap();
    let decoded = decode(&blob).unwrap();
    assert_eq!(decoded.format(), Format::OpenSsh);
    assert_eq!(decoded.parameters(), key.parameters());
}

#[test]
fn test_key_from_parameters() {
    let parameters: Parameters = [
        (Field::Modulus, BigInt::from(3233)),
        (Field::PublicExponent, BigInt::from(17)),
    ]
    .into_iter()
    .collect();
    let key = Key::new(Algorithm::Rsa, KeyType::Public, Format::OpenSsh, None, parameters)
        .unwrap()
        .with_comment(Some("me@host".to_string()));
    let line = encode(&key, key.format()).unwrap();
    assert_eq!(decode(line.as_bytes()).unwrap(), key);
}

#[test]
fn test_json() {
    let key = decode(include_bytes!("resources/ec-p256/public.openssh")).unwrap();
    let json: serde_json::Value = serde_json::to_value(&key).unwrap();
    assert_eq!(json["algorithm"], "EC");
    assert_eq!(json["type"], "public");
    assert_eq!(json["format"], "openssh");
    assert_eq!(json["curve"], "P-256");
    assert_eq!(json["parameters"]["x"], EC_P256_X);
    assert_eq!(json["parameters"]["y"], EC_P256_Y);
    assert_eq!(json["comment"], COMMENT);
}

#[rstest(
    input,
    case(include_bytes!("resources/rsa-1024/public.pkcs8.der").as_slice()),
    case(include_bytes!("resources/rsa-2048/private.pkcs8.der").as_slice()),
    case(include_bytes!("resources/dsa-1024/private.pkcs8.der").as_slice()),
    case(include_bytes!("resources/ec-p256/public.pkcs8.der").as_slice())
)]
fn test_truncated_der(input: &[u8]) {
    assert_truncations_fail(input);
}

fn assert_truncations_fail(input: &[u8]) {
    for len in 1..input.len() {
        let kind = decode(&input[..len]).unwrap_err().kind();
        // a cut inside the length octets vs a length past the end
        assert!(
            matches!(kind, ErrorKind::TruncatedInput | ErrorKind::MalformedDer),
            "prefix of {} bytes: {:?}",
            len,
            kind
        );
    }
}

#[rstest(
    input,
    algorithm,
    key_type,
    case(include_bytes!("resources/rsa-1024/public.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Public),
    case(include_bytes!("resources/rsa-2048/public.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Public),
    case(include_bytes!("resources/rsa-1024/private.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Private),
    case(include_bytes!("resources/rsa-2048/private.pkcs1.pem").as_slice(), Algorithm::Rsa, KeyType::Private),
    case(include_bytes!("resources/dsa-1024/private.pkcs1.pem").as_slice(), Algorithm::Dsa, KeyType::Private),
    case(include_bytes!("resources/ec-p256/private.pkcs1.pem").as_slice(), Algorithm::Ec, KeyType::Private)
)]
fn test_der_pkcs1(input: &[u8], algorithm: Algorithm, key_type: KeyType) {
    let key = decode(input).unwrap();
    let der = encode(&key, Format::DerPkcs1).unwrap().into_bytes();
    assert_eq!(der[0], 0x30);

    let decoded = decode(&der).unwrap();
    assert_eq!(decoded.algorithm(), algorithm);
    assert_eq!(decoded.key_type(), key_type);
    assert_eq!(decoded.format(), Format::DerPkcs1);
    assert_eq!(decoded.curve(), key.curve());
    assert_eq!(decoded.parameters(), key.parameters());
    assert_eq!(encode(&decoded, Format::DerPkcs1).unwrap().as_bytes(), der);

    assert_truncations_fail(&der);
}

#[rstest(
    input,
    case(include_bytes!("resources/rsa-1024/public.openssh").as_slice()),
    case(include_bytes!("resources/dsa-1024/public.openssh").as_slice()),
    case(include_bytes!("resources/ec-p256/public.openssh").as_slice())
)]
fn test_truncated_ssh_blob(input: &[u8]) {
    let key = decode(input).unwrap();
    let blob = keys::to_ssh_blob(&key).unwrap();
    // 4 byte length plus the algorithm name
    let name_len = 4 + u32::from_be_bytes([blob[0], blob[1], blob[2], blob[3]]) as usize;
    for len in name_len..blob.len() {
        let err = decode(&blob[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput, "prefix of {} bytes", len);
    }
}

#[test]
fn test_trailing_bytes() {
    let mut der = include_bytes!("resources/rsa-1024/public.pkcs8.der").to_vec();
    der.push(0x00);
    assert_eq!(decode(&der).unwrap_err().kind(), ErrorKind::TrailingBytes);

    let key = decode(include_bytes!("resources/rsa-1024/public.openssh")).unwrap();
    let mut blob = keys::to_ssh_blob(&key).unwrap();
    blob.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x01]);
    assert_eq!(decode(&blob).unwrap_err().kind(), ErrorKind::TrailingBytes);
}

#[test]
fn test_unknown_ssh_algorithm() {
    let mut writer = ssh::SshWriter::new();
    writer.put_name("ssh-unknown").put_string(b"opaque");
    let blob = ssh::PublicKeyBlob::try_from(writer.into_inner()).unwrap();

    let err = decode(blob.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownAlgorithmName);

    let line = ssh::OpenSshPublicKey::new(blob, Some("me".to_string())).to_string();
    let err = decode(line.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownAlgorithmName);
}

#[rstest(
    input,
    kind,
    case(b"".as_slice(), ErrorKind::UnknownFormat),
    case(b"not a key".as_slice(), ErrorKind::UnknownFormat),
    case(b"-----BEGIN PUBLIC KEY-----\nMAA=\n-----END RSA PRIVATE KEY-----\n".as_slice(), ErrorKind::MissingEnvelope),
    case(b"-----BEGIN PUBLIC KEY-----\nMAA=\n".as_slice(), ErrorKind::MissingEnvelope),
    case(b"-----BEGIN PUBLIC KEY-----\nM@A=\n-----END PUBLIC KEY-----\n".as_slice(), ErrorKind::MalformedBase64),
    case(b"-----BEGIN CERTIFICATE-----\nMAA=\n-----END CERTIFICATE-----\n".as_slice(), ErrorKind::UnknownFormat),
    // SEQUENCE { INTEGER 5 } has no key layout
    case([0x30, 0x03, 0x02, 0x01, 0x05].as_slice(), ErrorKind::MalformedDer)
)]
fn test_decode_error(input: &[u8], kind: ErrorKind) {
    assert_eq!(decode(input).unwrap_err().kind(), kind);
}

#[rstest(
    input,
    format,
    case(include_bytes!("resources/rsa-1024/private.pkcs1.pem").as_slice(), Format::OpenSsh),
    case(include_bytes!("resources/ec-p256/private.pkcs8.pem").as_slice(), Format::Ssh2),
    case(include_bytes!("resources/dsa-1024/public.openssh").as_slice(), Format::PemPkcs1),
    case(include_bytes!("resources/ec-p256/public.openssh").as_slice(), Format::DerPkcs1)
)]
fn test_unsupported_conversion(input: &[u8], format: Format) {
    let key = decode(input).unwrap();
    assert_eq!(
        encode(&key, format).unwrap_err().kind(),
        ErrorKind::UnsupportedConversion
    );
}

#[test]
fn test_dsa_pkcs8_to_traditional_needs_y() {
    let key = decode(include_bytes!("resources/dsa-1024/private.pkcs8.der")).unwrap();
    assert_eq!(
        encode(&key, Format::PemPkcs1).unwrap_err().kind(),
        ErrorKind::MissingField
    );
}
