use crate::{Delta, DeltaSource, VariableIndex, VariableValue};

/// One set of last-sent values shared by every connection of an object. Only
/// used for reliable-ordered variables, where every primed connection
/// receives exactly the same records.
#[derive(Clone, Debug)]
pub struct IdenticalShadow {
    values: Vec<Option<VariableValue>>,
}

impl IdenticalShadow {
    pub fn new(variable_count: usize) -> Self {
        Self {
            values: vec![None; variable_count],
        }
    }

    /// True if any of `indices` differs from the shadow
    pub fn has_changes(&self, current: &[VariableValue], indices: &[VariableIndex]) -> bool {
        indices.iter().any(|index| {
            let index = *index as usize;
            match (self.values.get(index), current.get(index)) {
                (Some(shadow), Some(value)) => shadow.as_ref() != Some(value),
                _ => false,
            }
        })
    }

    /// Adopts the current values once a pass has been sent to every primed connection
    pub fn commit(&mut self, current: &[VariableValue], indices: &[VariableIndex]) {
        for index in indices {
            let index = *index as usize;
            if let (Some(slot), Some(value)) = (self.values.get_mut(index), current.get(index)) {
                *slot = Some(value.clone());
            }
        }
    }
}

impl DeltaSource for IdenticalShadow {
    fn compute_delta(&self, index: VariableIndex, current: &VariableValue) -> Delta {
        match self.values.get(index as usize) {
            Some(Some(shadow)) if shadow == current => Delta::Unchanged,
            _ => Delta::Changed(current.clone()),
        }
    }
}
