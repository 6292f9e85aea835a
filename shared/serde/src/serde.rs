use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr, BitCounter};

/// A type that can be written into, and read back out of, a bit stream
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the outgoing stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Reads a value out of the incoming stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write for this value
    fn bit_length(&self) -> u32 {
        let mut counter = BitCounter::new();
        self.ser(&mut counter);
        counter.bits_needed()
    }
}

/// Types which always serialize to the same number of bits
pub trait ConstBitLength {
    fn const_bit_length() -> u32;
}
