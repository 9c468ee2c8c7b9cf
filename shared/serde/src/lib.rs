//! # Skein Serde
//! Little-endian byte codec shared by every skein wire format.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod byte_reader;
mod byte_writer;
mod error;
mod impls;
mod serde;

pub use byte_reader::ByteReader;
pub use byte_writer::{ByteCounter, ByteWrite, ByteWriter};
pub use error::SerdeErr;
pub use impls::varint_length;
pub use serde::Serde;

/// Largest datagram skein will ever read off a socket
pub const MTU_SIZE_BYTES: usize = 1500;
