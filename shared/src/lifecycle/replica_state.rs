use std::fmt;

/// Lifecycle of one object on one connection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplicaState {
    /// The connection has no replica
    Absent,
    /// Construction decided, waiting to be sent or accepted
    ConstructionPending,
    /// The replica exists on both sides, variables may be serialized
    Live,
    /// Destruction decided, waiting to be sent
    DestructionPending,
    /// Destroyed. The pair is dropped from bookkeeping.
    Gone,
}

impl ReplicaState {
    pub fn name(&self) -> &'static str {
        match self {
            ReplicaState::Absent => "Absent",
            ReplicaState::ConstructionPending => "ConstructionPending",
            ReplicaState::Live => "Live",
            ReplicaState::DestructionPending => "DestructionPending",
            ReplicaState::Gone => "Gone",
        }
    }
}

impl fmt::Display for ReplicaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
