use thiserror::Error;

use replicant_serde::SerdeErr;

use crate::{ConnectionId, LifecycleError, ObjectHandle, ReplicaTag, TransportError, VariableIndex};

/// Errors returned by the ReplicationManager's host-facing API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicationError {
    /// No live object has the handle
    #[error("{handle} does not exist or has been destroyed")]
    UnknownObject { handle: ObjectHandle },

    /// The connection is not known to the ReplicationManager
    #[error("{connection} is not a known connection")]
    UnknownConnection { connection: ConnectionId },

    /// No replica kind is registered for the tag
    #[error("{tag} is not registered with the Protocol. Must call `add_replica()` during protocol initialization")]
    UnknownKind { tag: ReplicaTag },

    /// The object's values are owned by a remote peer
    #[error("{handle} is not locally authoritative, its variables can only change through replication")]
    NotAuthoritative { handle: ObjectHandle },

    /// Variable index past the end of the kind's schema
    #[error("Variable index {index} is out of range for `{kind}`, which has {count} variables")]
    VariableIndexOutOfRange {
        kind: String,
        index: VariableIndex,
        count: usize,
    },

    /// Value width differs from the schema's declared width
    #[error("Variable {index} of `{kind}` is {expected} bits wide, got a value of {actual} bits")]
    VariableWidthMismatch {
        kind: String,
        index: VariableIndex,
        expected: u32,
        actual: u32,
    },

    /// Initial values do not cover the schema exactly
    #[error("`{kind}` has {expected} variables, {actual} initial values were given")]
    InitialValueCountMismatch {
        kind: String,
        expected: usize,
        actual: usize,
    },

    /// A stored value could not be decoded as the requested type
    #[error("Failed to decode variable: {0}")]
    Serde(#[from] SerdeErr),

    /// Illegal lifecycle transition
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
