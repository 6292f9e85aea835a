use replicant_serde::ConstBitLength;

use crate::{ReliabilityClass, ReplicationError, VariableIndex, VariableSpec, VariableValue};

pub const MAX_VARIABLES: usize = VariableIndex::MAX as usize + 1;

/// How the delta for a reliability class is computed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializeMode {
    /// Every connection keeps its own last-sent value per variable
    PerConnection,
    /// One shared shadow value per variable for all connections. Only valid
    /// for the reliable-ordered class, where every connection receives the
    /// same values.
    Identical,
}

/// The ordered list of variable slots shared by every object of a replica
/// kind. Writer and reader must agree on it exactly: it is not sent on the wire.
#[derive(Clone, Debug)]
pub struct ReplicaSchema {
    variables: Vec<VariableSpec>,
    reliable_mode: SerializeMode,
}

impl ReplicaSchema {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            reliable_mode: SerializeMode::PerConnection,
        }
    }

    pub fn with_variable(mut self, spec: VariableSpec) -> Self {
        self.variables.push(spec);
        self
    }

    pub fn reliable<T: ConstBitLength>(self) -> Self {
        self.with_variable(VariableSpec::of::<T>(ReliabilityClass::ReliableOrdered))
    }

    pub fn unreliable<T: ConstBitLength>(self) -> Self {
        self.with_variable(VariableSpec::of::<T>(ReliabilityClass::UnreliableWithReceipt))
    }

    /// Serialize the reliable-ordered variables against one shared shadow
    pub fn identical_reliable(mut self) -> Self {
        self.reliable_mode = SerializeMode::Identical;
        self
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variables(&self) -> &[VariableSpec] {
        &self.variables
    }

    pub fn spec(&self, index: VariableIndex) -> Option<&VariableSpec> {
        self.variables.get(index as usize)
    }

    pub fn mode_for(&self, class: ReliabilityClass) -> SerializeMode {
        match class {
            ReliabilityClass::ReliableOrdered => self.reliable_mode,
            ReliabilityClass::UnreliableWithReceipt => SerializeMode::PerConnection,
        }
    }

    pub fn has_class(&self, class: ReliabilityClass) -> bool {
        self.variables.iter().any(|spec| spec.class == class)
    }

    /// Indices of the variables sent on `class`, in schema order
    pub fn indices_for(&self, class: ReliabilityClass) -> Vec<VariableIndex> {
        self.variables
            .iter()
            .enumerate()
            .filter(|(_, spec)| spec.class == class)
            .map(|(index, _)| index as VariableIndex)
            .collect()
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.variables.len() <= MAX_VARIABLES
    }

    pub(crate) fn check_value(
        &self,
        kind_name: &str,
        index: VariableIndex,
        value: &VariableValue,
    ) -> Result<(), ReplicationError> {
        let Some(spec) = self.spec(index) else {
            return Err(ReplicationError::VariableIndexOutOfRange {
                kind: kind_name.to_string(),
                index,
                count: self.variables.len(),
            });
        };
        if spec.bit_length != value.bit_length() {
            return Err(ReplicationError::VariableWidthMismatch {
                kind: kind_name.to_string(),
                index,
                expected: spec.bit_length,
                actual: value.bit_length(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_values(
        &self,
        kind_name: &str,
        values: &[VariableValue],
    ) -> Result<(), ReplicationError> {
        if values.len() != self.variables.len() {
            return Err(ReplicationError::InitialValueCountMismatch {
                kind: kind_name.to_string(),
                expected: self.variables.len(),
                actual: values.len(),
            });
        }
        for (index, value) in values.iter().enumerate() {
            self.check_value(kind_name, index as VariableIndex, value)?;
        }
        Ok(())
    }
}

impl Default for ReplicaSchema {
    fn default() -> Self {
        Self::new()
    }
}
