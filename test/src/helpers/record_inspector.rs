use replicant_shared::{
    BitReader, ConstructionRecord, DeserializeSession, Protocol, RecordError, RecordHeader,
    RecordKind, ReliabilityClass, Serde, VariableIndex, VariableRead, VariableValue,
};

/// A record decoded against a protocol, for asserting on what went over the wire
#[derive(Clone, Debug)]
pub struct InspectedRecord {
    pub header: RecordHeader,
    /// Set for serialization records
    pub class: Option<ReliabilityClass>,
    /// Slots of a serialization record, in schema order
    pub reads: Vec<VariableRead>,
    /// Snapshot carried by a construction record
    pub values: Vec<VariableValue>,
}

impl InspectedRecord {
    pub fn kind(&self) -> RecordKind {
        self.header.kind
    }

    /// The value sent for `index`, if its present flag was set
    pub fn present(&self, index: VariableIndex) -> Option<&VariableValue> {
        self.reads.iter().find_map(|read| match read {
            VariableRead::Changed(read_index, value) if *read_index == index => Some(value),
            _ => None,
        })
    }

    pub fn is_present(&self, index: VariableIndex) -> bool {
        self.present(index).is_some()
    }

    /// Whether `index` was walked with its present flag cleared
    pub fn is_absent(&self, index: VariableIndex) -> bool {
        self.reads
            .iter()
            .any(|read| matches!(read, VariableRead::Unchanged(read_index) if *read_index == index))
    }
}

pub fn inspect_record(protocol: &Protocol, payload: &[u8]) -> Result<InspectedRecord, RecordError> {
    let mut reader = BitReader::new(payload);
    let header = RecordHeader::de(&mut reader)?;
    let kind = protocol
        .replica_kinds
        .get(&header.tag)
        .ok_or(RecordError::UnknownTag { tag: header.tag })?;

    let mut record = InspectedRecord {
        header,
        class: None,
        reads: Vec::new(),
        values: Vec::new(),
    };
    match header.kind {
        RecordKind::Construction => {
            record.values = ConstructionRecord::read(&mut reader, &kind.schema, header.tag)?;
        }
        RecordKind::Serialize => {
            let (class, reads) = DeserializeSession::read_all(&mut reader, &kind.schema, header.tag)?;
            record.class = Some(class);
            record.reads = reads;
        }
        RecordKind::ConstructionAccepted | RecordKind::ConstructionRejected | RecordKind::Destruction => {}
    }
    Ok(record)
}
