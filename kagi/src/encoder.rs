//! Encoder trait, the reverse of [`Decoder`](crate::decoder::Decoder).

/// Converts `self` (of type `T`) into `E`.
pub trait Encoder<T, E: EncodableTo<T>> {
    type Error;

    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait: `Self` can be produced by encoding a `T`.
pub trait EncodableTo<T> {}
