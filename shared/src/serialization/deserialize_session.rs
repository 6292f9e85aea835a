use replicant_serde::{BitReader, Serde};

use crate::{
    serialization::record::{check_trailing_bits, VariableCount},
    RecordError, ReliabilityClass, ReplicaSchema, ReplicaTag, VariableIndex, VariableValue,
};

/// What the reader found in one variable slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VariableRead {
    Changed(VariableIndex, VariableValue),
    Unchanged(VariableIndex),
}

impl VariableRead {
    pub fn index(&self) -> VariableIndex {
        match self {
            VariableRead::Changed(index, _) | VariableRead::Unchanged(index) => *index,
        }
    }
}

/// Reads the body of a serialization record, after its header. Nothing should
/// be applied until `end_read` succeeds.
pub struct DeserializeSession<'r, 'b> {
    reader: &'r mut BitReader<'b>,
    schema: &'r ReplicaSchema,
    tag: ReplicaTag,
    class: ReliabilityClass,
    indices: Vec<VariableIndex>,
    next: usize,
}

impl<'r, 'b> DeserializeSession<'r, 'b> {
    pub fn begin_read(
        reader: &'r mut BitReader<'b>,
        schema: &'r ReplicaSchema,
        tag: ReplicaTag,
    ) -> Result<Self, RecordError> {
        let class = ReliabilityClass::de(reader)?;
        let indices = schema.indices_for(class);
        Ok(Self {
            reader,
            schema,
            tag,
            class,
            indices,
            next: 0,
        })
    }

    pub fn class(&self) -> ReliabilityClass {
        self.class
    }

    /// Reads the next slot in schema order, or None once every slot of the
    /// class has been read
    pub fn read_variable(&mut self) -> Result<Option<VariableRead>, RecordError> {
        let Some(index) = self.indices.get(self.next).copied() else {
            return Ok(None);
        };
        self.next += 1;

        let present = bool::de(self.reader)?;
        if !present {
            return Ok(Some(VariableRead::Unchanged(index)));
        }
        let bit_length = self
            .schema
            .spec(index)
            .map(|spec| spec.bit_length)
            .unwrap_or_default();
        let value = VariableValue::read(self.reader, bit_length)?;
        Ok(Some(VariableRead::Changed(index, value)))
    }

    /// Reads the terminator and checks it against the local schema
    pub fn end_read(self) -> Result<(), RecordError> {
        let actual = VariableCount::de(self.reader)?.to::<usize>()?;
        if actual != self.indices.len() || self.next != self.indices.len() {
            return Err(RecordError::VariableCountMismatch {
                tag: self.tag,
                expected: self.indices.len(),
                actual,
            });
        }
        check_trailing_bits(self.reader, self.tag)
    }

    /// Reads a whole record body
    pub fn read_all(
        reader: &'r mut BitReader<'b>,
        schema: &'r ReplicaSchema,
        tag: ReplicaTag,
    ) -> Result<(ReliabilityClass, Vec<VariableRead>), RecordError> {
        let mut session = Self::begin_read(reader, schema, tag)?;
        let class = session.class();
        let mut reads = Vec::new();
        while let Some(read) = session.read_variable()? {
            reads.push(read);
        }
        session.end_read()?;
        Ok((class, reads))
    }
}
