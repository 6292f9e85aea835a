use crate::{Authority, ConnectionId, Creator, NetworkedObject, Topology, VariableIndex, VariableValue};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructionDecision {
    Construct,
    Skip,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceptDecision {
    Accept,
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializeDecision {
    Serialize,
    Skip,
}

/// What happens to an object when a connection it is replicated on drops
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopAction {
    /// Forget the replica for that connection, keep the local object
    DropSilently,
    /// Destroy the local object and tell every remaining connection
    DestroyLocally,
}

/// The connection a hook is being asked about, plus this peer's role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionContext {
    pub connection: ConnectionId,
    pub topology: Topology,
}

impl ConnectionContext {
    pub fn new(connection: ConnectionId, topology: Topology) -> Self {
        Self {
            connection,
            topology,
        }
    }

    pub fn is_server(&self) -> bool {
        self.topology == Topology::Server
    }
}

/// Per-kind hooks that the ReplicationManager consults while it ticks.
/// One instance is shared by every object of the kind.
pub trait ReplicaBehavior: Send + Sync {
    /// Should `object` be constructed on `context.connection`?
    fn decide_construction(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> ConstructionDecision;

    /// A peer asked to construct `object` here. The object is already
    /// populated from the construction record but not yet registered.
    fn decide_accept_remote_construction(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> AcceptDecision;

    /// Should a Live replica of `object` on `context.connection` be
    /// serialized this tick?
    fn decide_serialization(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> SerializeDecision;

    /// Called after a remote update changed a variable of `object`
    fn on_variable_changed(
        &self,
        _object: &NetworkedObject,
        _index: VariableIndex,
        _value: &VariableValue,
    ) {
    }

    /// `context.connection` dropped while `object` was replicated on it
    fn on_pop(&self, object: &NetworkedObject, context: &ConnectionContext) -> PopAction;

    /// May `context.connection` update `object`, whose authority is remote?
    /// By default only the connection it was created on, or on a client the
    /// server that serializes the client's own objects.
    fn accepts_update_from(&self, object: &NetworkedObject, context: &ConnectionContext) -> bool {
        match object.creator() {
            Creator::Remote(creator) => creator == context.connection,
            Creator::Local => context.topology == Topology::Client,
        }
    }

    /// Which side holds the authoritative values of an object with the given creator
    fn authority(&self, creator: Creator, topology: Topology) -> Authority;
}

/// Who sends construction records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructionAuthority {
    /// Only a server constructs. A server rejects constructions from clients.
    ServerOnly,
    /// The side that created the object constructs it. A server also
    /// constructs objects it received onto every other connection.
    Origin,
    /// The creating peer constructs it on every connection
    Peer,
}

/// Who sends serialization records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SerializationAuthority {
    /// The creator serializes. A server relays the creator's values onward.
    Creator,
    /// Only a server serializes
    Server,
}

/// Explicit choice of what a dropped connection does to an object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopPolicy {
    /// Destroy the object if the dropped connection created it, otherwise
    /// only forget the replica
    DestroyIfCreator,
    AlwaysDestroy,
    AlwaysDrop,
}

/// The standard hook set, built from three explicit policy choices
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorityPolicy {
    pub construction: ConstructionAuthority,
    pub serialization: SerializationAuthority,
    pub pop: PopPolicy,
}

impl AuthorityPolicy {
    pub fn new(
        construction: ConstructionAuthority,
        serialization: SerializationAuthority,
        pop: PopPolicy,
    ) -> Self {
        Self {
            construction,
            serialization,
            pop,
        }
    }

    /// Server creates, server serializes
    pub fn server_created_server_serialized() -> Self {
        Self::new(
            ConstructionAuthority::ServerOnly,
            SerializationAuthority::Server,
            PopPolicy::DestroyIfCreator,
        )
    }

    /// Server creates, the creating side serializes
    pub fn server_created_client_serialized() -> Self {
        Self::new(
            ConstructionAuthority::ServerOnly,
            SerializationAuthority::Creator,
            PopPolicy::DestroyIfCreator,
        )
    }

    /// Anyone creates, the server serializes
    pub fn client_created_server_serialized() -> Self {
        Self::new(
            ConstructionAuthority::Origin,
            SerializationAuthority::Server,
            PopPolicy::DestroyIfCreator,
        )
    }

    /// Anyone creates, the creator serializes and the server relays
    pub fn client_created_client_serialized() -> Self {
        Self::new(
            ConstructionAuthority::Origin,
            SerializationAuthority::Creator,
            PopPolicy::DestroyIfCreator,
        )
    }

    /// Every peer creates and serializes its own objects
    pub fn peer_to_peer() -> Self {
        Self::new(
            ConstructionAuthority::Peer,
            SerializationAuthority::Creator,
            PopPolicy::DestroyIfCreator,
        )
    }
}

impl ReplicaBehavior for AuthorityPolicy {
    fn decide_construction(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> ConstructionDecision {
        let creator = object.creator();
        // never echo an object back to the connection it came from
        if creator == Creator::Remote(context.connection) {
            return ConstructionDecision::Skip;
        }
        let construct = match self.construction {
            ConstructionAuthority::ServerOnly => context.is_server(),
            ConstructionAuthority::Origin => context.is_server() || creator == Creator::Local,
            ConstructionAuthority::Peer => creator == Creator::Local,
        };
        if construct {
            ConstructionDecision::Construct
        } else {
            ConstructionDecision::Skip
        }
    }

    fn decide_accept_remote_construction(
        &self,
        _object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> AcceptDecision {
        match self.construction {
            ConstructionAuthority::ServerOnly if context.is_server() => AcceptDecision::Reject,
            _ => AcceptDecision::Accept,
        }
    }

    fn decide_serialization(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> SerializeDecision {
        let creator = object.creator();
        let serialize = match self.serialization {
            SerializationAuthority::Creator => {
                creator == Creator::Local
                    || (context.is_server() && creator != Creator::Remote(context.connection))
            }
            SerializationAuthority::Server => context.is_server(),
        };
        if serialize {
            SerializeDecision::Serialize
        } else {
            SerializeDecision::Skip
        }
    }

    fn on_pop(&self, object: &NetworkedObject, context: &ConnectionContext) -> PopAction {
        match self.pop {
            PopPolicy::AlwaysDestroy => PopAction::DestroyLocally,
            PopPolicy::AlwaysDrop => PopAction::DropSilently,
            PopPolicy::DestroyIfCreator => {
                if object.creator() == Creator::Remote(context.connection) {
                    PopAction::DestroyLocally
                } else {
                    PopAction::DropSilently
                }
            }
        }
    }

    fn authority(&self, creator: Creator, topology: Topology) -> Authority {
        let local = match self.serialization {
            SerializationAuthority::Creator => creator == Creator::Local,
            SerializationAuthority::Server => topology == Topology::Server,
        };
        if local {
            Authority::Local
        } else {
            Authority::Remote
        }
    }
}
