//! # keys
//!
//! Reads and writes RSA, DSA and EC keys in the formats OpenSSL and OpenSSH
//! produce, all through one [`Key`] model.
//!
//! | Format | Public | Private |
//! |--------|--------|---------|
//! | [`Format::OpenSsh`] | `ssh-rsa AAAA... comment` | - |
//! | [`Format::Ssh2`] | RFC 4716 block | - |
//! | [`Format::PemPkcs8`] / [`Format::DerPkcs8`] | SubjectPublicKeyInfo | PKCS#8 PrivateKeyInfo |
//! | [`Format::PemPkcs1`] / [`Format::DerPkcs1`] | RSAPublicKey (RSA only) | RSA / DSA / EC traditional |
//!
//! Decoding detects the input format. Encoding takes the target explicitly:
//!
//! ```ignore
//! use keys::{Format, decode, encode};
//!
//! let key = decode(include_bytes!("id_rsa.pub"))?;
//! let pem = encode(&key, Format::PemPkcs8)?;
//! println!("{}", pem.as_text().unwrap_or_default());
//! ```
//!
//! Passphrase protected PEM input is handed to a [`Decryptor`] set in
//! [`DecodeOptions`]; without one it fails with
//! [`ErrorKind::EncryptedKey`](kagi::ErrorKind::EncryptedKey).

#![forbid(unsafe_code)]

pub mod dispatch;
pub mod error;
pub mod key;
pub mod mapper;

pub use dispatch::{
    DecodeOptions, Decryptor, Detected, EncodeOptions, Encoded, EncryptedEnvelope, KeyDecoder,
    decode, detect, encode, encode_with, to_ssh_blob,
};
pub use error::{Error, Result};
pub use key::{Algorithm, Curve, Field, Format, Key, KeyType, Parameters};
