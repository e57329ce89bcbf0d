//! RFC 4251 `mpint`: two's-complement, big-endian, with a `0x00` guard byte
//! in front of any magnitude whose top bit is set.
//!
//! Key material is always positive, so zero and negative values are refused
//! in both directions.

use num_bigint::{BigInt, Sign};
use num_traits::Signed;

use crate::error::{Error, Result};

/// Decodes the content of an mpint field. `offset` locates the content in
/// the enclosing buffer and is only used for error reporting.
pub fn decode(content: &[u8], offset: usize) -> Result<BigInt> {
    let magnitude = match content {
        [] | [0x00] => return Err(Error::EmptyMpint { offset }),
        [0x00, 0x00, ..] => return Err(Error::MpintRedundantPadding { offset }),
        [0x00, rest @ ..] => rest,
        [first, ..] if first & 0x80 != 0 => return Err(Error::NegativeMpint { offset }),
        _ => content,
    };
    Ok(BigInt::from_bytes_be(Sign::Plus, magnitude))
}

/// Encodes a positive value, adding exactly one guard byte when needed.
pub fn encode(value: &BigInt) -> Result<Vec<u8>> {
    if !value.is_positive() {
        return Err(Error::NonPositiveMpint);
    }
    let (_, magnitude) = value.to_bytes_be();
    let mut content = Vec::with_capacity(magnitude.len() + 1);
    if magnitude.first().is_some_and(|b| b & 0x80 != 0) {
        content.push(0x00);
    }
    content.extend_from_slice(&magnitude);
    Ok(content)
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use rstest::rstest;

    use super::{decode, encode};
    use kagi::ErrorKind;

    #[rstest(
        input,
        expected,
        case(vec![0x01], BigInt::from(1)),
        case(vec![0x7f], BigInt::from(127)),
        case(vec![0x00, 0x80], BigInt::from(128)),
        case(vec![0x01, 0x00, 0x01], BigInt::from(65537)),
        // a guard in front of a small value is tolerated
        case(vec![0x00, 0x05], BigInt::from(5)),
        case(vec![0x00, 0xff, 0xff], BigInt::from(65535))
    )]
    fn test_decode(input: Vec<u8>, expected: BigInt) {
        assert_eq!(expected, decode(&input, 0).unwrap());
    }

    #[rstest(
        input,
        case(vec![]),
        case(vec![0x00]),
        case(vec![0x00, 0x00, 0x80]),
        case(vec![0x00, 0x00, 0x01]),
        case(vec![0x80]),
        case(vec![0xff, 0x01])
    )]
    fn test_decode_error(input: Vec<u8>) {
        let err = decode(&input, 7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInteger);
        assert!(err.to_string().contains("offset 7"));
    }

    #[rstest(
        input,
        expected,
        case(BigInt::from(1), vec![0x01]),
        case(BigInt::from(127), vec![0x7f]),
        case(BigInt::from(128), vec![0x00, 0x80]),
        case(BigInt::from(0x8000), vec![0x00, 0x80, 0x00]),
        case(BigInt::from(65537), vec![0x01, 0x00, 0x01])
    )]
    fn test_encode(input: BigInt, expected: Vec<u8>) {
        let encoded = encode(&input).unwrap();
        assert_eq!(expected, encoded);
        assert_eq!(input, decode(&encoded, 0).unwrap());
    }

    #[rstest(input, case(BigInt::from(0)), case(BigInt::from(-1)), case(BigInt::from(-128)))]
    fn test_encode_non_positive(input: BigInt) {
        assert_eq!(encode(&input).unwrap_err().kind(), ErrorKind::MalformedInteger);
    }

    #[test]
    fn test_guard_added_once() {
        // every byte has the top bit set; only one guard is prepended
        let value = BigInt::from_bytes_be(num_bigint::Sign::Plus, &[0xff; 128]);
        let encoded = encode(&value).unwrap();
        assert_eq!(encoded.len(), 129);
        assert_eq!(encoded[0], 0x00);
        assert_eq!(encoded[1], 0xff);

        let mut doubled = vec![0x00];
        doubled.extend_from_slice(&encoded);
        assert!(decode(&doubled, 0).is_err());
    }
}
