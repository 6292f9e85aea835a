use crate::{ReceiptId, VariableIndex, VariableValue};

/// Result of comparing a variable's current value against what a connection last received
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    Unchanged,
    Changed(VariableValue),
}

impl Delta {
    pub fn is_changed(&self) -> bool {
        matches!(self, Delta::Changed(_))
    }
}

/// Anything a serialization session can ask "did this variable change?"
pub trait DeltaSource {
    fn compute_delta(&self, index: VariableIndex, current: &VariableValue) -> Delta;
}

/// Treats every variable as changed. Used to prime a connection with a full record.
pub struct FullSnapshot;

impl DeltaSource for FullSnapshot {
    fn compute_delta(&self, _index: VariableIndex, current: &VariableValue) -> Delta {
        Delta::Changed(current.clone())
    }
}

/// Send state of one variable towards one connection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeltaState {
    last_sent: Option<VariableValue>,
    // unreliable send not yet confirmed delivered
    pending_receipt: Option<ReceiptId>,
    // last unreliable send was lost, resend regardless of value
    dirty: bool,
}

impl DeltaState {
    pub fn last_sent(&self) -> Option<&VariableValue> {
        self.last_sent.as_ref()
    }

    pub fn pending_receipt(&self) -> Option<ReceiptId> {
        self.pending_receipt
    }

    pub fn needs_resend(&self) -> bool {
        self.dirty
    }
}

/// Per-connection change tracking for every variable of one object
#[derive(Clone, Debug)]
pub struct DeltaTracker {
    states: Vec<DeltaState>,
}

impl DeltaTracker {
    pub fn new(variable_count: usize) -> Self {
        Self {
            states: vec![DeltaState::default(); variable_count],
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, index: VariableIndex) -> Option<&DeltaState> {
        self.states.get(index as usize)
    }

    /// True while the latest send of the variable went out unreliably and has
    /// not been confirmed delivered
    pub fn is_dirty(&self, index: VariableIndex) -> bool {
        self.state(index)
            .is_some_and(|state| state.dirty || state.pending_receipt.is_some())
    }

    pub fn record_reliable(&mut self, index: VariableIndex, value: VariableValue) {
        if let Some(state) = self.states.get_mut(index as usize) {
            state.last_sent = Some(value);
            state.pending_receipt = None;
            state.dirty = false;
        }
    }

    pub fn record_unreliable(&mut self, index: VariableIndex, value: VariableValue, receipt: ReceiptId) {
        if let Some(state) = self.states.get_mut(index as usize) {
            state.last_sent = Some(value);
            state.pending_receipt = Some(receipt);
            state.dirty = false;
        }
    }

    /// Returns false if `receipt` no longer covers the variable
    pub fn on_delivered(&mut self, index: VariableIndex, receipt: ReceiptId) -> bool {
        match self.states.get_mut(index as usize) {
            Some(state) if state.pending_receipt == Some(receipt) => {
                state.pending_receipt = None;
                state.dirty = false;
                true
            }
            _ => false,
        }
    }

    /// Returns false if `receipt` no longer covers the variable
    pub fn on_lost(&mut self, index: VariableIndex, receipt: ReceiptId) -> bool {
        match self.states.get_mut(index as usize) {
            Some(state) if state.pending_receipt == Some(receipt) => {
                state.pending_receipt = None;
                state.dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Forgets what was sent for `indices`, so they go out again in full
    pub fn reset(&mut self, indices: &[VariableIndex]) {
        for index in indices {
            if let Some(state) = self.states.get_mut(*index as usize) {
                *state = DeltaState::default();
            }
        }
    }
}

impl DeltaSource for DeltaTracker {
    fn compute_delta(&self, index: VariableIndex, current: &VariableValue) -> Delta {
        match self.state(index) {
            Some(state) if !state.dirty && state.last_sent.as_ref() == Some(current) => {
                Delta::Unchanged
            }
            _ => Delta::Changed(current.clone()),
        }
    }
}
