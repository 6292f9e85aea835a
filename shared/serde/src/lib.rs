//! # Replicant Serde
//! Bit-level serialization shared by every crate of the replicant workspace.
//!
//! Values are written least-significant bit first into a growable byte
//! buffer, so a record never needs to be byte aligned until it is handed
//! to the transport.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod error;
mod impls;
mod integer;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use error::SerdeErr;
pub use integer::{
    SerdeInteger, SignedInteger, SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};
pub use serde::{ConstBitLength, Serde};
