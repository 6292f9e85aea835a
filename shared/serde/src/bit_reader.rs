use crate::error::SerdeErr;

/// Reads bits back out of a buffer produced by `BitWriter`
pub struct BitReader<'b> {
    buffer: &'b [u8],
    bit_index: u32,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            buffer,
            bit_index: 0,
        }
    }

    fn bit_total(&self) -> u32 {
        (self.buffer.len() as u32) * 8
    }

    pub fn bits_read(&self) -> u32 {
        self.bit_index
    }

    /// Bits left in the buffer, including the zero padding of the final byte
    pub fn bits_remaining(&self) -> u32 {
        self.bit_total().saturating_sub(self.bit_index)
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        let bit_total = self.bit_total();
        if self.bit_index >= bit_total {
            return Err(SerdeErr::OutOfBounds {
                bit_index: self.bit_index,
                bit_total,
            });
        }
        let byte = self.buffer[(self.bit_index / 8) as usize];
        let bit = (byte >> (self.bit_index % 8)) & 1 != 0;
        self.bit_index += 1;
        Ok(bit)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        let mut output = 0u8;
        for bit_index in 0..8 {
            if self.read_bit()? {
                output |= 1 << bit_index;
            }
        }
        Ok(output)
    }

    /// Reads `bit_count` bits into a fresh buffer. Unused bits of the final
    /// byte are left as zero.
    pub fn read_bits(&mut self, bit_count: u32) -> Result<Vec<u8>, SerdeErr> {
        let mut output = vec![0u8; bit_count.div_ceil(8) as usize];
        for bit_index in 0..bit_count {
            if self.read_bit()? {
                output[(bit_index / 8) as usize] |= 1 << (bit_index % 8);
            }
        }
        Ok(output)
    }
}
