//! PKCS#8: Private-Key Information Syntax
//!
//! Implements `OneAsymmetricKey` from [RFC 5958](https://datatracker.ietf.org/doc/html/rfc5958),
//! which obsoletes RFC 5208 (PKCS#8 v1.2), and its encrypted container.

mod encrypted;
mod types;

pub use encrypted::EncryptedPrivateKeyInfo;
pub use types::{OneAsymmetricKey, PrivateKeyInfo, Version};
