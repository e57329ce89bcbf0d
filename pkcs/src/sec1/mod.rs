//! SEC1 elliptic curve keys: the ECPrivateKey structure of
//! [RFC 5915](https://datatracker.ietf.org/doc/html/rfc5915), the named
//! curves this crate knows, and the uncompressed point encoding shared by
//! SubjectPublicKeyInfo and SSH blobs.

mod types;

pub use types::{Curve, ECPrivateKey, Version, decode_point, encode_point, to_field_bytes};
