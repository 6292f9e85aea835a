use std::{collections::HashMap, fmt, sync::Arc};

use replicant_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

use crate::{ReplicaBehavior, ReplicaSchema};

/// Identifies a replica kind on the wire. Both sides must register the same
/// tag for the same kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReplicaTag(u16);

impl ReplicaTag {
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ReplicaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self.0)
    }
}

impl Serde for ReplicaTag {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let value = UnsignedVariableInteger::<7>::de(reader)?;
        Ok(Self(value.to::<u16>()?))
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<7>::new(self.0).bit_length()
    }
}

/// When a locally initiated construction counts as Live
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructionConfirmation {
    /// Live as soon as the construction record is sent. Serialization starts
    /// the same tick.
    Optimistic,
    /// Stays pending until the receiver answers with an acceptance
    AwaitAcceptance,
}

/// Everything both peers need to agree on for one kind of networked object
#[derive(Clone)]
pub struct ReplicaKind {
    pub tag: ReplicaTag,
    pub name: String,
    pub schema: ReplicaSchema,
    pub confirmation: ConstructionConfirmation,
    pub behavior: Arc<dyn ReplicaBehavior>,
}

impl ReplicaKind {
    pub fn new<B: ReplicaBehavior + 'static>(
        tag: u16,
        name: &str,
        schema: ReplicaSchema,
        behavior: B,
    ) -> Self {
        Self {
            tag: ReplicaTag::new(tag),
            name: name.to_string(),
            schema,
            confirmation: ConstructionConfirmation::Optimistic,
            behavior: Arc::new(behavior),
        }
    }

    pub fn await_acceptance(mut self) -> Self {
        self.confirmation = ConstructionConfirmation::AwaitAcceptance;
        self
    }
}

impl fmt::Debug for ReplicaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicaKind")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("confirmation", &self.confirmation)
            .finish()
    }
}

/// Lookup table from wire tag to replica kind
#[derive(Clone, Default)]
pub struct ReplicaKinds {
    kinds: HashMap<ReplicaTag, ReplicaKind>,
}

impl ReplicaKinds {
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, kind: ReplicaKind) {
        self.kinds.insert(kind.tag, kind);
    }

    pub fn contains(&self, tag: &ReplicaTag) -> bool {
        self.kinds.contains_key(tag)
    }

    pub fn get(&self, tag: &ReplicaTag) -> Option<&ReplicaKind> {
        self.kinds.get(tag)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplicaKind> {
        self.kinds.values()
    }
}
