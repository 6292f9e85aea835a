use replicant_serde::{BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr};

use crate::ReliabilityClass;

/// The current value of a tracked variable, held as the exact bits that go
/// on the wire. Two values are equal when their bits are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VariableValue {
    bytes: Box<[u8]>,
    bit_length: u32,
}

impl VariableValue {
    /// Encodes a typed value
    pub fn new<T: Serde>(value: &T) -> Self {
        let mut writer = BitWriter::new();
        value.ser(&mut writer);
        let bit_length = writer.bits_written();
        Self {
            bytes: writer.to_bytes().into_boxed_slice(),
            bit_length,
        }
    }

    /// Wraps raw bits. Bits past `bit_length` are cleared so equality only
    /// depends on the payload.
    pub fn from_bits(mut bytes: Vec<u8>, bit_length: u32) -> Self {
        bytes.resize(bit_length.div_ceil(8) as usize, 0);
        let partial = bit_length % 8;
        if partial != 0 {
            if let Some(last) = bytes.last_mut() {
                *last &= (1u8 << partial) - 1;
            }
        }
        Self {
            bytes: bytes.into_boxed_slice(),
            bit_length,
        }
    }

    pub fn bit_length(&self) -> u32 {
        self.bit_length
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the value back into a typed value
    pub fn to<T: Serde>(&self) -> Result<T, SerdeErr> {
        let mut reader = BitReader::new(&self.bytes);
        T::de(&mut reader)
    }

    pub(crate) fn write(&self, writer: &mut dyn BitWrite) {
        writer.write_bits(&self.bytes, self.bit_length);
    }

    pub(crate) fn read(reader: &mut BitReader, bit_length: u32) -> Result<Self, SerdeErr> {
        let bytes = reader.read_bits(bit_length)?;
        Ok(Self {
            bytes: bytes.into_boxed_slice(),
            bit_length,
        })
    }
}

/// Declares one tracked variable slot: which class it is sent on and how many
/// bits its value occupies
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VariableSpec {
    pub class: ReliabilityClass,
    pub bit_length: u32,
}

impl VariableSpec {
    pub fn new(class: ReliabilityClass, bit_length: u32) -> Self {
        Self { class, bit_length }
    }

    pub fn of<T: ConstBitLength>(class: ReliabilityClass) -> Self {
        Self::new(class, T::const_bit_length())
    }
}
