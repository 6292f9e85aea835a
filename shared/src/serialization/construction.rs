use replicant_serde::{BitReader, BitWriter, Serde};

use crate::{
    serialization::record::{check_trailing_bits, VariableCount},
    RecordError, RecordHeader, RecordKind, ReplicaSchema, ReplicaTag, VariableValue,
    WireEntity,
};

/// Construction records carry a full snapshot of the object's variables,
/// with no present flags
pub struct ConstructionRecord;

impl ConstructionRecord {
    pub fn write(entity: WireEntity, tag: ReplicaTag, values: &[VariableValue]) -> Vec<u8> {
        let mut writer = BitWriter::new();
        RecordHeader::new(RecordKind::Construction, entity, tag).ser(&mut writer);
        for value in values {
            value.write(&mut writer);
        }
        VariableCount::new(values.len() as u64).ser(&mut writer);
        writer.to_bytes()
    }

    /// Reads the body that follows a Construction header
    pub fn read(
        reader: &mut BitReader,
        schema: &ReplicaSchema,
        tag: ReplicaTag,
    ) -> Result<Vec<VariableValue>, RecordError> {
        let mut values = Vec::with_capacity(schema.len());
        for spec in schema.variables() {
            values.push(VariableValue::read(reader, spec.bit_length)?);
        }
        let actual = VariableCount::de(reader)?.to::<usize>()?;
        if actual != schema.len() {
            return Err(RecordError::VariableCountMismatch {
                tag,
                expected: schema.len(),
                actual,
            });
        }
        check_trailing_bits(reader, tag)?;
        Ok(values)
    }
}
