use replicant_serde::{BitWriter, Serde};

use crate::{
    serialization::record::VariableCount, Delta, DeltaSource, HeartbeatPolicy, RecordHeader,
    RecordKind, ReliabilityClass, VariableIndex, VariableValue,
};

/// A variable that went out in a record and must be committed to the delta
/// state once the transport accepts the send
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEmission {
    pub index: VariableIndex,
    pub value: VariableValue,
}

/// A finished serialization record, ready for the transport
#[derive(Clone, Debug)]
pub struct OutgoingRecord {
    pub class: ReliabilityClass,
    pub payload: Vec<u8>,
    pub emissions: Vec<PendingEmission>,
}

impl OutgoingRecord {
    pub fn present_count(&self) -> usize {
        self.emissions.len()
    }

    pub fn indices(&self) -> Vec<VariableIndex> {
        self.emissions.iter().map(|emission| emission.index).collect()
    }
}

/// Batches the variables of one reliability class of one object into a
/// single record for one connection
pub struct SerializeSession {
    class: ReliabilityClass,
    writer: BitWriter,
    written: usize,
    emissions: Vec<PendingEmission>,
}

impl SerializeSession {
    /// Opens a record. `header.kind` is overridden with `Serialize`.
    pub fn begin(class: ReliabilityClass, header: &RecordHeader) -> Self {
        let mut writer = BitWriter::new();
        RecordHeader::new(RecordKind::Serialize, header.entity, header.tag).ser(&mut writer);
        class.ser(&mut writer);
        Self {
            class,
            writer,
            written: 0,
            emissions: Vec::new(),
        }
    }

    pub fn class(&self) -> ReliabilityClass {
        self.class
    }

    /// Appends one variable slot. Must be called for every variable of the
    /// session's class, in schema order. Returns whether it was present.
    pub fn write(
        &mut self,
        source: &dyn DeltaSource,
        index: VariableIndex,
        current: &VariableValue,
    ) -> bool {
        self.written += 1;
        match source.compute_delta(index, current) {
            Delta::Unchanged => {
                false.ser(&mut self.writer);
                false
            }
            Delta::Changed(value) => {
                true.ser(&mut self.writer);
                value.write(&mut self.writer);
                self.emissions.push(PendingEmission { index, value });
                true
            }
        }
    }

    /// Closes the record. Returns None when nothing is present and no
    /// heartbeat is wanted.
    pub fn end(mut self, heartbeat: HeartbeatPolicy) -> Option<OutgoingRecord> {
        if self.emissions.is_empty() && heartbeat == HeartbeatPolicy::OnlyWhenChanged {
            return None;
        }
        VariableCount::new(self.written as u64).ser(&mut self.writer);
        Some(OutgoingRecord {
            class: self.class,
            payload: self.writer.to_bytes(),
            emissions: self.emissions,
        })
    }
}
