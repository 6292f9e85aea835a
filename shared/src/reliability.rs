use replicant_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Delivery mode provided by the transport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReliabilityClass {
    /// Guaranteed delivery, in send order
    ReliableOrdered,
    /// Best effort. Every send yields a receipt that is later reported as
    /// delivered or lost, exactly once.
    UnreliableWithReceipt,
}

impl ReliabilityClass {
    /// Session order within a synchronization pass
    pub const ALL: [ReliabilityClass; 2] = [
        ReliabilityClass::ReliableOrdered,
        ReliabilityClass::UnreliableWithReceipt,
    ];

    pub fn has_receipt(&self) -> bool {
        *self == ReliabilityClass::UnreliableWithReceipt
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReliabilityClass::ReliableOrdered => "ReliableOrdered",
            ReliabilityClass::UnreliableWithReceipt => "UnreliableWithReceipt",
        }
    }
}

impl Serde for ReliabilityClass {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.has_receipt().ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            Ok(ReliabilityClass::UnreliableWithReceipt)
        } else {
            Ok(ReliabilityClass::ReliableOrdered)
        }
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for ReliabilityClass {
    fn const_bit_length() -> u32 {
        1
    }
}
