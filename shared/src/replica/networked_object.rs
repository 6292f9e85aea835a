use std::fmt;

use replicant_serde::Serde;

use crate::{ConnectionId, ObjectHandle, ReplicaTag, ReplicationError, VariableIndex, VariableValue};

/// Where an object was created
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Creator {
    /// Created by this peer's host application
    Local,
    /// Constructed on behalf of the peer at the other end of the connection
    Remote(ConnectionId),
}

impl Creator {
    pub fn is_local(&self) -> bool {
        matches!(self, Creator::Local)
    }
}

/// Which side's values win for an object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Authority {
    /// This peer's values are authoritative and get serialized out
    Local,
    /// A peer's values are authoritative; serialization records from it are applied
    Remote,
}

/// An application object whose variables are kept consistent across peers
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkedObject {
    handle: ObjectHandle,
    tag: ReplicaTag,
    values: Vec<VariableValue>,
    creator: Creator,
    authority: Authority,
}

impl NetworkedObject {
    pub fn new(
        handle: ObjectHandle,
        tag: ReplicaTag,
        values: Vec<VariableValue>,
        creator: Creator,
        authority: Authority,
    ) -> Self {
        Self {
            handle,
            tag,
            values,
            creator,
            authority,
        }
    }

    pub fn handle(&self) -> ObjectHandle {
        self.handle
    }

    pub fn tag(&self) -> ReplicaTag {
        self.tag
    }

    pub fn creator(&self) -> Creator {
        self.creator
    }

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn values(&self) -> &[VariableValue] {
        &self.values
    }

    pub fn value(&self, index: VariableIndex) -> Option<&VariableValue> {
        self.values.get(index as usize)
    }

    /// Decodes the variable at `index` as `T`
    pub fn get<T: Serde>(&self, index: VariableIndex) -> Result<T, ReplicationError> {
        let Some(value) = self.value(index) else {
            return Err(ReplicationError::VariableIndexOutOfRange {
                kind: self.tag.to_string(),
                index,
                count: self.values.len(),
            });
        };
        Ok(value.to::<T>()?)
    }

    /// Returns true if the stored value actually changed
    pub(crate) fn set_value(&mut self, index: VariableIndex, value: VariableValue) -> bool {
        match self.values.get_mut(index as usize) {
            Some(slot) if *slot != value => {
                *slot = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_handle(&mut self, handle: ObjectHandle) {
        self.handle = handle;
    }
}

impl fmt::Debug for NetworkedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkedObject")
            .field("handle", &self.handle)
            .field("tag", &self.tag)
            .field("creator", &self.creator)
            .field("authority", &self.authority)
            .field("variables", &self.values.len())
            .finish()
    }
}
