//! Decoder trait for type-safe conversions.
//!
//! A conversion from `T` to `D` is declared in two parts:
//!
//! 1. `DecodableFrom<T>` on the destination marks the pair as valid.
//! 2. `Decoder<T, D>` on the source performs the conversion.
//!
//! ```no_run
//! use kagi::decoder::{DecodableFrom, Decoder};
//!
//! struct Blob(Vec<u8>);
//! struct Name(String);
//!
//! #[derive(Debug)]
//! struct BadName;
//!
//! impl DecodableFrom<Blob> for Name {}
//!
//! impl Decoder<Blob, Name> for Blob {
//!     type Error = BadName;
//!
//!     fn decode(&self) -> Result<Name, Self::Error> {
//!         String::from_utf8(self.0.clone()).map(Name).map_err(|_| BadName)
//!     }
//! }
//! ```

/// Converts `self` (of type `T`) into `D`.
///
/// The destination must implement [`DecodableFrom<T>`], so only
/// conversions that were explicitly declared can be called.
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait: `Self` can be decoded from `T`.
pub trait DecodableFrom<T> {}
