use replicant_serde::{
    BitReader, BitWrite, BitWriter, Serde, SerdeErr, UnsignedInteger, UnsignedVariableInteger,
};

use crate::{RecordError, ReplicaTag};

#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub enum RecordKind {
    // Creates a replica on the receiving side, carries every variable value
    Construction,
    // Receiver kept the replica
    ConstructionAccepted,
    // Receiver refused the replica
    ConstructionRejected,
    // Removes the replica on the receiving side
    Destruction,
    // Changed variables of one reliability class
    Serialize,
}

impl Serde for RecordKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u8 = match self {
            RecordKind::Construction => 0,
            RecordKind::ConstructionAccepted => 1,
            RecordKind::ConstructionRejected => 2,
            RecordKind::Destruction => 3,
            RecordKind::Serialize => 4,
        };
        UnsignedInteger::<3>::new(index).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let index = UnsignedInteger::<3>::de(reader)?.get();
        match index {
            0 => Ok(RecordKind::Construction),
            1 => Ok(RecordKind::ConstructionAccepted),
            2 => Ok(RecordKind::ConstructionRejected),
            3 => Ok(RecordKind::Destruction),
            4 => Ok(RecordKind::Serialize),
            _ => Err(SerdeErr::InvalidDiscriminant {
                type_name: "RecordKind",
                index: index as u8,
            }),
        }
    }

    fn bit_length(&self) -> u32 {
        3
    }
}

/// How a record names its object.
///
/// `Host` carries the writer's handle and is used when the writer constructed
/// the object on this connection. `Remote` carries the reader's handle, for
/// objects the reader constructed. Handles from the two sides never collide
/// this way.
#[derive(Copy, Debug, Clone, Eq, PartialEq, Hash)]
pub enum WireEntity {
    Host(u64),
    Remote(u64),
}

impl WireEntity {
    pub fn id(&self) -> u64 {
        match self {
            WireEntity::Host(id) | WireEntity::Remote(id) => *id,
        }
    }
}

impl Serde for WireEntity {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let is_host = matches!(self, WireEntity::Host(_));
        is_host.ser(writer);
        UnsignedVariableInteger::<7>::new(self.id()).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let is_host = bool::de(reader)?;
        let id = UnsignedVariableInteger::<7>::de(reader)?.to::<u64>()?;
        if is_host {
            Ok(WireEntity::Host(id))
        } else {
            Ok(WireEntity::Remote(id))
        }
    }

    fn bit_length(&self) -> u32 {
        1 + UnsignedVariableInteger::<7>::new(self.id()).bit_length()
    }
}

/// Written at the front of every record
#[derive(Copy, Debug, Clone, Eq, PartialEq)]
pub struct RecordHeader {
    pub kind: RecordKind,
    pub entity: WireEntity,
    pub tag: ReplicaTag,
}

impl RecordHeader {
    pub fn new(kind: RecordKind, entity: WireEntity, tag: ReplicaTag) -> Self {
        Self { kind, entity, tag }
    }
}

impl Serde for RecordHeader {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.kind.ser(writer);
        self.entity.ser(writer);
        self.tag.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let kind = RecordKind::de(reader)?;
        let entity = WireEntity::de(reader)?;
        let tag = ReplicaTag::de(reader)?;
        Ok(Self { kind, entity, tag })
    }

    fn bit_length(&self) -> u32 {
        self.kind.bit_length() + self.entity.bit_length() + self.tag.bit_length()
    }
}

/// Terminates a session: the number of variable slots the writer walked
pub(crate) type VariableCount = UnsignedVariableInteger<3>;

/// Rejects records with a whole unread byte left over
pub(crate) fn check_trailing_bits(reader: &BitReader, tag: ReplicaTag) -> Result<(), RecordError> {
    let bits = reader.bits_remaining();
    if bits >= 8 {
        return Err(RecordError::TrailingBits { tag, bits });
    }
    Ok(())
}

/// A record with nothing after its header
pub fn header_only_record(header: &RecordHeader) -> Vec<u8> {
    let mut writer = BitWriter::new();
    header.ser(&mut writer);
    writer.to_bytes()
}
