use std::{
    collections::{HashMap, HashSet},
    mem,
    sync::Arc,
};

use log::{debug, info};

use replicant_serde::Serde;

use crate::{
    Authority, Connection, ConnectionContext, ConnectionId, Creator, EventQueue, EventSender,
    HandleGenerator, IdenticalShadow, NetworkedObject, ObjectHandle, Protocol, ReliabilityClass,
    ReplicaKind, ReplicaState, ReplicaTag, ReplicationConfig, ReplicationError,
    ReplicationEvents, SerializeMode, Tick, Transport, TransportEvent, VariableIndex,
    VariableValue,
};

/// A networked object plus the state the coordinator keeps beside it
pub(crate) struct ObjectRecord {
    pub(crate) object: NetworkedObject,
    pub(crate) shadow: Option<IdenticalShadow>,
    pub(crate) destroyed: bool,
}

impl ObjectRecord {
    pub(crate) fn new(object: NetworkedObject, kind: &ReplicaKind) -> Self {
        let shadow = (kind.schema.mode_for(ReliabilityClass::ReliableOrdered)
            == SerializeMode::Identical)
            .then(|| IdenticalShadow::new(kind.schema.len()));
        Self {
            object,
            shadow,
            destroyed: false,
        }
    }
}

/// Replicates networked objects to every known connection. Driven by the
/// host, one `tick` at a time; transport callbacks are queued through an
/// `EventSender` and applied at the start of the next tick.
pub struct ReplicationManager {
    pub(crate) config: ReplicationConfig,
    pub(crate) protocol: Arc<Protocol>,
    pub(crate) objects: HashMap<ObjectHandle, ObjectRecord>,
    pub(crate) connections: HashMap<ConnectionId, Connection>,
    pub(crate) handle_generator: HandleGenerator,
    pub(crate) events: ReplicationEvents,
    event_sender: EventSender,
    event_queue: EventQueue,
    tick: Tick,
}

impl ReplicationManager {
    pub fn new(config: ReplicationConfig, mut protocol: Protocol) -> Self {
        if !protocol.is_locked() {
            protocol.lock();
        }
        let (event_sender, event_queue) = EventQueue::new();
        Self {
            config,
            protocol: Arc::new(protocol),
            objects: HashMap::new(),
            connections: HashMap::new(),
            handle_generator: HandleGenerator::new(),
            events: ReplicationEvents::new(0),
            event_sender,
            event_queue,
            tick: 0,
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Number of ticks run so far
    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Handle for the transport to report connections, records and receipts
    pub fn event_sender(&self) -> EventSender {
        self.event_sender.clone()
    }

    // Connections

    pub fn connections(&self) -> Vec<ConnectionId> {
        let mut connections: Vec<ConnectionId> = self.connections.keys().copied().collect();
        connections.sort();
        connections
    }

    pub fn has_connection(&self, connection: &ConnectionId) -> bool {
        self.connections.contains_key(connection)
    }

    // Objects

    /// Creates an object owned by this peer and returns its handle. Every
    /// value must match the width of its slot in the kind's schema.
    pub fn create_local_object(
        &mut self,
        tag: ReplicaTag,
        initial_values: Vec<VariableValue>,
    ) -> Result<ObjectHandle, ReplicationError> {
        let protocol = Arc::clone(&self.protocol);
        let Some(kind) = protocol.replica_kinds.get(&tag) else {
            return Err(ReplicationError::UnknownKind { tag });
        };
        kind.schema.check_values(&kind.name, &initial_values)?;

        let handle = self.handle_generator.generate();
        let authority = kind
            .behavior
            .authority(Creator::Local, self.config.topology);
        let object = NetworkedObject::new(handle, tag, initial_values, Creator::Local, authority);
        info!("created {} of kind `{}`", handle, kind.name);
        self.objects.insert(handle, ObjectRecord::new(object, kind));
        Ok(handle)
    }

    /// Destroys an object. Every connection that has a replica of it is sent
    /// a destruction record during the following ticks.
    pub fn destroy_local_object(&mut self, handle: &ObjectHandle) -> Result<(), ReplicationError> {
        match self.objects.get_mut(handle) {
            Some(record) if !record.destroyed => {
                record.destroyed = true;
                info!("destroyed {}", handle);
                Ok(())
            }
            _ => Err(ReplicationError::UnknownObject { handle: *handle }),
        }
    }

    /// Changes a variable of a locally authoritative object. Returns true if
    /// the value differed.
    pub fn set_variable(
        &mut self,
        handle: &ObjectHandle,
        index: VariableIndex,
        value: VariableValue,
    ) -> Result<bool, ReplicationError> {
        let record = match self.objects.get_mut(handle) {
            Some(record) if !record.destroyed => record,
            _ => return Err(ReplicationError::UnknownObject { handle: *handle }),
        };
        if record.object.authority() != Authority::Local {
            return Err(ReplicationError::NotAuthoritative { handle: *handle });
        }
        let Some(kind) = self.protocol.replica_kinds.get(&record.object.tag()) else {
            return Err(ReplicationError::UnknownKind {
                tag: record.object.tag(),
            });
        };
        kind.schema.check_value(&kind.name, index, &value)?;
        Ok(record.object.set_value(index, value))
    }

    /// Typed form of `set_variable`
    pub fn set<T: Serde>(
        &mut self,
        handle: &ObjectHandle,
        index: VariableIndex,
        value: &T,
    ) -> Result<bool, ReplicationError> {
        self.set_variable(handle, index, VariableValue::new(value))
    }

    pub fn object(&self, handle: &ObjectHandle) -> Option<&NetworkedObject> {
        self.objects
            .get(handle)
            .filter(|record| !record.destroyed)
            .map(|record| &record.object)
    }

    pub fn has_object(&self, handle: &ObjectHandle) -> bool {
        self.object(handle).is_some()
    }

    /// Every live object, in handle order
    pub fn objects(&self) -> Vec<&NetworkedObject> {
        let mut objects: Vec<&NetworkedObject> = self
            .objects
            .values()
            .filter(|record| !record.destroyed)
            .map(|record| &record.object)
            .collect();
        objects.sort_by_key(|object| object.handle());
        objects
    }

    /// Handles of the live objects this peer created
    pub fn objects_created_locally(&self) -> Vec<ObjectHandle> {
        self.objects()
            .into_iter()
            .filter(|object| object.creator().is_local())
            .map(|object| object.handle())
            .collect()
    }

    /// Lifecycle state of `handle` on `connection`
    pub fn replica_state(&self, handle: &ObjectHandle, connection: &ConnectionId) -> ReplicaState {
        self.connections
            .get(connection)
            .map_or(ReplicaState::Absent, |connection| connection.state(handle))
    }

    /// Asks the construction hook again for a pair whose construction was
    /// rejected
    pub fn reconsider_construction(
        &mut self,
        handle: &ObjectHandle,
        connection: &ConnectionId,
    ) -> Result<(), ReplicationError> {
        if !self.has_object(handle) {
            return Err(ReplicationError::UnknownObject { handle: *handle });
        }
        let Some(connection) = self.connections.get_mut(connection) else {
            return Err(ReplicationError::UnknownConnection {
                connection: *connection,
            });
        };
        if let Some(channel) = connection.channel_mut(handle) {
            channel.reconsider();
        }
        Ok(())
    }

    // Tick

    /// Runs one synchronization pass: applies queued transport events, then
    /// constructs, destroys and serializes every object on every connection.
    pub fn tick(&mut self, transport: &mut dyn Transport) -> ReplicationEvents {
        self.tick = self.tick.wrapping_add(1);
        self.events = ReplicationEvents::new(self.tick);

        for event in self.event_queue.drain() {
            self.apply_transport_event(event, transport);
        }

        let connection_order = self.connection_order();
        let mut handles: Vec<ObjectHandle> = self.objects.keys().copied().collect();
        handles.sort();
        for handle in handles {
            self.replicate_object(&handle, &connection_order, transport);
        }

        self.collect_garbage();

        mem::replace(&mut self.events, ReplicationEvents::new(self.tick))
    }

    fn apply_transport_event(&mut self, event: TransportEvent, transport: &mut dyn Transport) {
        match event {
            TransportEvent::Connected(connection) => self.add_connection(connection),
            TransportEvent::Received {
                connection,
                payload,
            } => self.receive_record(&connection, &payload, transport),
            TransportEvent::ReceiptResolved {
                connection,
                receipt,
                delivered,
            } => {
                let Some(state) = self.connections.get_mut(&connection) else {
                    debug!("receipt {} for unknown {}", receipt, connection);
                    return;
                };
                let affected = state.resolve_receipt(receipt, delivered);
                debug!(
                    "receipt {} on {} {}, {} variables affected",
                    receipt,
                    connection,
                    if delivered { "delivered" } else { "lost" },
                    affected
                );
            }
            TransportEvent::Dropped(connection) => self.pop_connection(&connection),
        }
    }

    fn add_connection(&mut self, connection: ConnectionId) {
        if self.connections.contains_key(&connection) {
            debug!("{} already connected", connection);
            return;
        }
        info!("added {}", connection);
        self.connections
            .insert(connection, Connection::new(connection));
        self.events.push_connection(connection);
    }

    fn connection_order(&self) -> Vec<ConnectionId> {
        let mut order = self.connections();
        if self.config.shuffle_connections {
            fastrand::shuffle(&mut order);
        }
        order
    }

    pub(crate) fn context(&self, connection: ConnectionId) -> ConnectionContext {
        ConnectionContext::new(connection, self.config.topology)
    }

    /// Marks an object destroyed. Its remaining replicas are destroyed on the
    /// following passes.
    pub(crate) fn destroy_object_locally(&mut self, handle: &ObjectHandle) -> bool {
        match self.objects.get_mut(handle) {
            Some(record) if !record.destroyed => {
                record.destroyed = true;
                true
            }
            _ => false,
        }
    }

    // Destroyed objects are dropped once no connection holds a replica of them
    fn collect_garbage(&mut self) {
        let referenced: HashSet<ObjectHandle> = self
            .connections
            .values()
            .flat_map(|connection| connection.handles())
            .collect();
        self.objects
            .retain(|handle, record| !record.destroyed || referenced.contains(handle));
    }
}
