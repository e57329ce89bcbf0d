//! PKCS#1: RSA key syntax from [RFC 8017](https://datatracker.ietf.org/doc/html/rfc8017#appendix-A.1).

mod types;

pub use types::{RSAPrivateKey, RSAPublicKey, Version};
