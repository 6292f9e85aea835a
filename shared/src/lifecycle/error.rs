use thiserror::Error;

use crate::ReplicaState;

/// Errors raised by an illegal lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// The operation is not allowed from the replica's current state
    #[error("Cannot {operation} a replica in state {state}")]
    InvalidTransition {
        operation: &'static str,
        state: ReplicaState,
    },
}
