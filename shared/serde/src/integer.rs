use crate::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

pub type UnsignedInteger<const BITS: u8> = SerdeInteger<false, false, BITS>;
pub type SignedInteger<const BITS: u8> = SerdeInteger<true, false, BITS>;
pub type UnsignedVariableInteger<const BITS: u8> = SerdeInteger<false, true, BITS>;
pub type SignedVariableInteger<const BITS: u8> = SerdeInteger<true, true, BITS>;

/// An integer written with a chosen number of bits.
///
/// Fixed integers always take `BITS` bits (plus a sign bit when signed).
/// Variable integers are written in `BITS`-sized groups, each preceded by a
/// continuation bit, so small values stay small on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct SerdeInteger<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> {
    value: i128,
}

// Non-generic core, keeps monomorphized code small
#[derive(Clone, Copy)]
struct IntegerLayout {
    signed: bool,
    variable: bool,
    bits: u8,
}

impl IntegerLayout {
    fn check(&self, value: i128) {
        if self.bits == 0 || self.bits > 127 {
            panic!("an integer must be written with between 1 and 127 bits");
        }
        if !self.signed && value < 0 {
            panic!("can't encode a negative number with an Unsigned Integer!");
        }
        if !self.variable && value.unsigned_abs() >= 1u128 << self.bits {
            panic!(
                "with {} bits, can't encode a number of magnitude {}",
                self.bits,
                value.unsigned_abs()
            );
        }
    }

    fn write(&self, value: i128, writer: &mut dyn BitWrite) {
        if self.signed {
            writer.write_bit(value < 0);
        }
        let mut magnitude = value.unsigned_abs();

        if !self.variable {
            for _ in 0..self.bits {
                writer.write_bit(magnitude & 1 != 0);
                magnitude >>= 1;
            }
            return;
        }

        loop {
            let proceed = magnitude >= 1u128 << self.bits;
            writer.write_bit(proceed);
            for _ in 0..self.bits {
                writer.write_bit(magnitude & 1 != 0);
                magnitude >>= 1;
            }
            if !proceed {
                return;
            }
        }
    }

    fn read(&self, reader: &mut BitReader) -> Result<i128, SerdeErr> {
        let negative = self.signed && reader.read_bit()?;

        let mut magnitude: u128 = 0;
        let mut shift: u32 = 0;
        loop {
            let proceed = self.variable && reader.read_bit()?;
            for _ in 0..self.bits {
                let bit = reader.read_bit()?;
                if shift >= 127 {
                    if bit {
                        return Err(SerdeErr::ValueOutOfRange {
                            value: i128::MAX,
                            type_name: "SerdeInteger",
                        });
                    }
                } else if bit {
                    magnitude |= 1u128 << shift;
                }
                shift += 1;
            }
            if !proceed {
                break;
            }
        }

        let value = magnitude as i128;
        Ok(if negative { -value } else { value })
    }

    fn bit_length(&self, value: i128) -> u32 {
        let sign_bits = u32::from(self.signed);
        if !self.variable {
            return sign_bits + self.bits as u32;
        }
        let mut magnitude = value.unsigned_abs();
        let mut output = sign_bits;
        loop {
            let proceed = magnitude >= 1u128 << self.bits;
            output += 1 + self.bits as u32;
            magnitude >>= self.bits;
            if !proceed {
                return output;
            }
        }
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> SerdeInteger<SIGNED, VARIABLE, BITS> {
    const LAYOUT: IntegerLayout = IntegerLayout {
        signed: SIGNED,
        variable: VARIABLE,
        bits: BITS,
    };

    /// # Panics
    ///
    /// Panics if the value can not be represented with this layout.
    pub fn new<T: Into<i128>>(value: T) -> Self {
        let value = value.into();
        Self::LAYOUT.check(value);
        Self { value }
    }

    pub fn get(&self) -> i128 {
        self.value
    }

    /// Converts the decoded value into a narrower integer type
    pub fn to<T: TryFrom<i128>>(&self) -> Result<T, SerdeErr> {
        T::try_from(self.value).map_err(|_| SerdeErr::ValueOutOfRange {
            value: self.value,
            type_name: std::any::type_name::<T>(),
        })
    }
}

impl<const SIGNED: bool, const VARIABLE: bool, const BITS: u8> Serde
    for SerdeInteger<SIGNED, VARIABLE, BITS>
{
    fn ser(&self, writer: &mut dyn BitWrite) {
        Self::LAYOUT.write(self.value, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = Self::LAYOUT.read(reader)?;
        Ok(Self { value })
    }

    fn bit_length(&self) -> u32 {
        Self::LAYOUT.bit_length(self.value)
    }
}

impl<const SIGNED: bool, const BITS: u8> ConstBitLength for SerdeInteger<SIGNED, false, BITS> {
    fn const_bit_length() -> u32 {
        u32::from(SIGNED) + BITS as u32
    }
}
