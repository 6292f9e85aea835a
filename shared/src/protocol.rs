use log::info;

use crate::{ReplicaKind, ReplicaKinds, MAX_VARIABLES};

pub mod error;
pub use error::ProtocolError;

/// The set of replica kinds both peers agree on. Built once, then locked and
/// handed to the ReplicationManager.
#[derive(Clone, Default)]
pub struct Protocol {
    pub replica_kinds: ReplicaKinds,
    locked: bool,
}

impl Protocol {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Registers a replica kind.
    ///
    /// # Panics
    ///
    /// Panics if the protocol is locked or the kind is invalid. Use
    /// `try_add_replica` to handle these cases.
    pub fn add_replica(&mut self, kind: ReplicaKind) -> &mut Self {
        if let Err(error) = self.try_add_replica(kind) {
            panic!("{}", error);
        }
        self
    }

    pub fn try_add_replica(&mut self, kind: ReplicaKind) -> Result<&mut Self, ProtocolError> {
        self.try_check_lock()?;
        if let Some(existing) = self.replica_kinds.get(&kind.tag) {
            return Err(ProtocolError::DuplicateTag {
                tag: kind.tag,
                existing: existing.name.clone(),
                name: kind.name,
            });
        }
        if !kind.schema.is_valid() {
            return Err(ProtocolError::TooManyVariables {
                name: kind.name,
                count: kind.schema.len(),
                max: MAX_VARIABLES,
            });
        }
        if let Some(index) = kind
            .schema
            .variables()
            .iter()
            .position(|spec| spec.bit_length == 0)
        {
            return Err(ProtocolError::ZeroWidthVariable {
                name: kind.name,
                index,
            });
        }
        info!(
            "registered replica kind `{}` as {} with {} variables",
            kind.name,
            kind.tag,
            kind.schema.len()
        );
        self.replica_kinds.insert(kind);
        Ok(self)
    }

    pub fn try_lock(&mut self) -> Result<(), ProtocolError> {
        self.try_check_lock()?;
        self.locked = true;
        Ok(())
    }

    pub fn lock(&mut self) {
        self.check_lock();
        self.locked = true;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Checks if protocol is locked without panicking
    pub fn try_check_lock(&self) -> Result<(), ProtocolError> {
        if self.locked {
            Err(ProtocolError::AlreadyLocked)
        } else {
            Ok(())
        }
    }

    /// Checks if protocol is locked, panics if it is
    pub fn check_lock(&self) {
        if self.locked {
            panic!("Protocol already locked!");
        }
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }
}
