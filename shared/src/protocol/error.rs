use thiserror::Error;

use crate::ReplicaTag;

/// Errors that can occur while building a Protocol
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Protocol is locked and cannot be modified
    #[error("Protocol is already locked and cannot be modified. Protocol.lock() has been called and no further changes are allowed")]
    AlreadyLocked,

    /// Two replica kinds were registered with the same wire tag
    #[error("Replica tag {tag} is already registered to kind `{existing}`, cannot register `{name}`")]
    DuplicateTag {
        tag: ReplicaTag,
        existing: String,
        name: String,
    },

    /// A replica kind declares more variables than a record can index
    #[error("Replica kind `{name}` declares {count} variables, at most {max} are supported")]
    TooManyVariables {
        name: String,
        count: usize,
        max: usize,
    },

    /// A variable slot with zero width can never change
    #[error("Replica kind `{name}` declares variable {index} with a width of zero bits")]
    ZeroWidthVariable { name: String, index: usize },
}
