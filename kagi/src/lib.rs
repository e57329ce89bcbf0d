//! # kagi
//!
//! Core building blocks for the kagi key codec.
//!
//! ## Overview
//!
//! Every layer of the codec converts one representation into the next:
//! ```text
//! PEM / OpenSSH text → bytes → DER → ASN1Object → PKCS structure → Key
//!                      bytes → SSH wire blob ──────────────────────→ Key
//! ```
//!
//! Each step is expressed with the [`Decoder`](decoder::Decoder) trait, and the
//! reverse direction with [`Encoder`](encoder::Encoder). Marker traits
//! (`DecodableFrom` / `EncodableTo`) restrict which conversions exist, so an
//! invalid pipeline does not compile.
//!
//! All binary parsing goes through [`ByteCursor`](cursor::ByteCursor), which
//! is the single place where reads are bounds-checked.
//!
//! Errors from every crate in the workspace are classified into the
//! [`ErrorKind`] taxonomy.
//!
//! ```ignore
//! use kagi::decoder::Decoder;
//! use der::Der;
//! use asn1::ASN1Object;
//!
//! let bytes = vec![0x30, 0x03, 0x02, 0x01, 0x01];
//! let der: Der = bytes.decode()?;
//! let asn1: ASN1Object = der.decode()?;
//! ```

#![forbid(unsafe_code)]

pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod error;

pub use cursor::{ByteCursor, ByteWriter};
pub use error::{Error, ErrorKind, Result};
