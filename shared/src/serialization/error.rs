use thiserror::Error;

use replicant_serde::SerdeErr;

use crate::{RecordKind, ReplicaTag, WireEntity};

/// Errors found while reading a record. Any of them means the two peers
/// disagree about the layout of an object, which is fatal for that object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The record ended early or held an invalid value
    #[error("Malformed record: {0}")]
    Serde(#[from] SerdeErr),

    /// The terminator count does not match the local schema
    #[error("Record for {tag} carries {actual} variables but the local schema expects {expected}")]
    VariableCountMismatch {
        tag: ReplicaTag,
        expected: usize,
        actual: usize,
    },

    /// Bits were left over after the terminator
    #[error("Record for {tag} has {bits} unread bits after its terminator")]
    TrailingBits { tag: ReplicaTag, bits: u32 },

    /// No replica kind is registered under the tag
    #[error("Record references {tag}, which is not registered with the Protocol")]
    UnknownTag { tag: ReplicaTag },

    /// The record's tag differs from the tag of the object it addresses
    #[error("Record tagged {actual} addresses an object of {expected}")]
    TagMismatch {
        expected: ReplicaTag,
        actual: ReplicaTag,
    },

    /// The record names its object in a way its kind does not allow
    #[error("{kind:?} record for {tag} cannot refer to {entity:?}")]
    UnexpectedEntity {
        kind: RecordKind,
        tag: ReplicaTag,
        entity: WireEntity,
    },
}
