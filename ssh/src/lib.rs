//! SSH public key encodings: the RFC 4251 wire format used inside key
//! blobs, the single-line OpenSSH format and the RFC 4716 SSH2 file format.

pub mod blob;
pub mod error;
pub mod mpint;
pub mod openssh;
pub mod ssh2;
pub mod wire;

pub use blob::PublicKeyBlob;
pub use openssh::OpenSshPublicKey;
pub use ssh2::Ssh2PublicKey;
pub use wire::{SshReader, SshWriter};
