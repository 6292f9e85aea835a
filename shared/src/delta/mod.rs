mod delta_tracker;
mod identical_shadow;
mod receipt_ledger;

pub use delta_tracker::{Delta, DeltaSource, DeltaState, DeltaTracker, FullSnapshot};
pub use identical_shadow::IdenticalShadow;
pub use receipt_ledger::ReceiptLedger;
