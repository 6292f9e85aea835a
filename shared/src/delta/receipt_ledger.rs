use std::collections::HashMap;

use crate::{ObjectHandle, ReceiptId, VariableIndex};

/// Maps each outstanding unreliable receipt of a connection to the variables
/// whose latest send it covers
#[derive(Default)]
pub struct ReceiptLedger {
    receipts: HashMap<ReceiptId, Vec<(ObjectHandle, VariableIndex)>>,
}

impl ReceiptLedger {
    pub fn new() -> Self {
        Self {
            receipts: HashMap::new(),
        }
    }

    pub fn register(&mut self, receipt: ReceiptId, handle: ObjectHandle, indices: &[VariableIndex]) {
        self.receipts
            .entry(receipt)
            .or_default()
            .extend(indices.iter().map(|index| (handle, *index)));
    }

    /// Removes and returns what `receipt` covered. A receipt resolves once.
    pub fn take(&mut self, receipt: ReceiptId) -> Option<Vec<(ObjectHandle, VariableIndex)>> {
        self.receipts.remove(&receipt)
    }

    pub fn forget_object(&mut self, handle: &ObjectHandle) {
        self.receipts.retain(|_, covered| {
            covered.retain(|(object, _)| object != handle);
            !covered.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}
