use std::{mem, vec::IntoIter};

use log::warn;

use crate::{
    ConnectionId, ObjectHandle, RecordError, ReplicaTag, Tick, TransportError, VariableIndex,
};

/// Everything that happened during one tick of a ReplicationManager
pub struct ReplicationEvents {
    tick: Tick,
    connections: Vec<ConnectionId>,
    disconnections: Vec<(ConnectionId, Vec<ObjectHandle>)>,
    creates: Vec<(ConnectionId, ObjectHandle)>,
    destroys: Vec<(ConnectionId, ObjectHandle)>,
    updates: Vec<(ConnectionId, ObjectHandle, VariableIndex)>,
    accepts: Vec<(ConnectionId, ObjectHandle)>,
    rejects: Vec<(ConnectionId, ObjectHandle)>,
    refusals: Vec<(ConnectionId, ReplicaTag)>,
    send_failures: Vec<(ConnectionId, Option<ObjectHandle>, TransportError)>,
    mismatches: Vec<(ConnectionId, Option<ObjectHandle>, RecordError)>,
    empty: bool,
}

impl ReplicationEvents {
    pub(crate) fn new(tick: Tick) -> Self {
        Self {
            tick,
            connections: Vec::new(),
            disconnections: Vec::new(),
            creates: Vec::new(),
            destroys: Vec::new(),
            updates: Vec::new(),
            accepts: Vec::new(),
            rejects: Vec::new(),
            refusals: Vec::new(),
            send_failures: Vec::new(),
            mismatches: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: ReplicationEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ReplicationEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_connection(&mut self, connection: ConnectionId) {
        self.connections.push(connection);
        self.empty = false;
    }

    pub(crate) fn push_disconnection(&mut self, connection: ConnectionId, destroyed: Vec<ObjectHandle>) {
        self.disconnections.push((connection, destroyed));
        self.empty = false;
    }

    pub(crate) fn push_create(&mut self, connection: ConnectionId, handle: ObjectHandle) {
        self.creates.push((connection, handle));
        self.empty = false;
    }

    pub(crate) fn push_destroy(&mut self, connection: ConnectionId, handle: ObjectHandle) {
        self.destroys.push((connection, handle));
        self.empty = false;
    }

    pub(crate) fn push_update(&mut self, connection: ConnectionId, handle: ObjectHandle, index: VariableIndex) {
        self.updates.push((connection, handle, index));
        self.empty = false;
    }

    pub(crate) fn push_accept(&mut self, connection: ConnectionId, handle: ObjectHandle) {
        self.accepts.push((connection, handle));
        self.empty = false;
    }

    pub(crate) fn push_reject(&mut self, connection: ConnectionId, handle: ObjectHandle) {
        self.rejects.push((connection, handle));
        self.empty = false;
    }

    pub(crate) fn push_refusal(&mut self, connection: ConnectionId, tag: ReplicaTag) {
        self.refusals.push((connection, tag));
        self.empty = false;
    }

    pub(crate) fn push_send_failure(
        &mut self,
        connection: ConnectionId,
        handle: Option<ObjectHandle>,
        error: TransportError,
    ) {
        self.send_failures.push((connection, handle, error));
        self.empty = false;
    }

    pub(crate) fn push_mismatch(
        &mut self,
        connection: ConnectionId,
        handle: Option<ObjectHandle>,
        error: RecordError,
    ) {
        self.mismatches.push((connection, handle, error));
        self.empty = false;
    }
}

impl Drop for ReplicationEvents {
    fn drop(&mut self) {
        if !self.mismatches.is_empty() {
            warn!("Dropped Protocol Mismatch Event(s)! Make sure to handle these through `events.read::<ProtocolMismatchEvent>()`, the peers disagree on a replica layout.");
        }
    }
}

// Event Trait
pub trait ReplicationEvent {
    type Iter;

    fn iter(events: &mut ReplicationEvents) -> Self::Iter;

    fn has(events: &ReplicationEvents) -> bool;
}

macro_rules! replication_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;
        impl ReplicationEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ReplicationEvents) -> Self::Iter {
                let list = mem::take(&mut events.$field);
                IntoIterator::into_iter(list)
            }

            fn has(events: &ReplicationEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

replication_event!(
    /// A connection became known
    ConnectEvent, connections, ConnectionId
);
replication_event!(
    /// A connection dropped, with the objects its pop destroyed locally
    DisconnectEvent, disconnections, (ConnectionId, Vec<ObjectHandle>)
);
replication_event!(
    /// A remote construction was accepted and the object now exists locally
    CreateObjectEvent, creates, (ConnectionId, ObjectHandle)
);
replication_event!(
    /// An object was destroyed because of something a connection did
    DestroyObjectEvent, destroys, (ConnectionId, ObjectHandle)
);
replication_event!(
    /// A remote update changed a variable
    UpdateVariableEvent, updates, (ConnectionId, ObjectHandle, VariableIndex)
);
replication_event!(
    /// A peer accepted a construction we sent
    ConstructionAcceptedEvent, accepts, (ConnectionId, ObjectHandle)
);
replication_event!(
    /// A peer rejected a construction we sent
    ConstructionRejectedEvent, rejects, (ConnectionId, ObjectHandle)
);
replication_event!(
    /// We refused a construction a peer sent
    RemoteConstructionRejectedEvent, refusals, (ConnectionId, ReplicaTag)
);
replication_event!(
    /// A record could not be handed to the transport
    SendFailedEvent, send_failures, (ConnectionId, Option<ObjectHandle>, TransportError)
);
replication_event!(
    /// A record did not match the local layout of its kind
    ProtocolMismatchEvent, mismatches, (ConnectionId, Option<ObjectHandle>, RecordError)
);
