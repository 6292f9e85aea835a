use std::sync::Arc;

use log::{debug, info, warn};

use replicant_serde::{BitReader, Serde};

use super::{outbound::send_record, replication_manager::ObjectRecord};
use crate::{
    header_only_record, AcceptDecision, Authority, ConnectionId, ConstructionRecord, Creator,
    DeserializeSession, NetworkedObject, ObjectHandle, PopAction, RecordError, RecordHeader,
    RecordKind, ReliabilityClass, ReplicaKind, ReplicaState, ReplicationManager,
    Transport, VariableRead, WireEntity,
};

impl ReplicationManager {
    /// Applies one record received from `connection`
    pub(crate) fn receive_record(
        &mut self,
        connection: &ConnectionId,
        payload: &[u8],
        transport: &mut dyn Transport,
    ) {
        if !self.connections.contains_key(connection) {
            debug!("record from unknown {}", connection);
            return;
        }

        let mut reader = BitReader::new(payload);
        let header = match RecordHeader::de(&mut reader) {
            Ok(header) => header,
            Err(error) => {
                self.protocol_mismatch(connection, None, RecordError::from(error));
                return;
            }
        };
        let protocol = Arc::clone(&self.protocol);
        let Some(kind) = protocol.replica_kinds.get(&header.tag) else {
            self.protocol_mismatch(connection, None, RecordError::UnknownTag { tag: header.tag });
            return;
        };

        match header.kind {
            RecordKind::Construction => {
                self.receive_construction(connection, &header, kind, &mut reader, transport)
            }
            RecordKind::ConstructionAccepted => self.receive_acceptance(connection, &header, kind),
            RecordKind::ConstructionRejected => self.receive_rejection(connection, &header),
            RecordKind::Destruction => self.receive_destruction(connection, &header),
            RecordKind::Serialize => self.receive_serialize(connection, &header, kind, &mut reader),
        }
    }

    fn receive_construction(
        &mut self,
        connection_id: &ConnectionId,
        header: &RecordHeader,
        kind: &ReplicaKind,
        reader: &mut BitReader,
        transport: &mut dyn Transport,
    ) {
        let WireEntity::Host(peer_id) = header.entity else {
            self.protocol_mismatch(
                connection_id,
                None,
                RecordError::UnexpectedEntity {
                    kind: header.kind,
                    tag: header.tag,
                    entity: header.entity,
                },
            );
            return;
        };
        let Some(connection) = self.connections.get(connection_id) else {
            return;
        };
        if connection.is_known_remote(peer_id) {
            debug!("duplicate construction of {:?} from {}", header.entity, connection_id);
            return;
        }

        let values = match ConstructionRecord::read(reader, &kind.schema, header.tag) {
            Ok(values) => values,
            Err(error) => {
                self.protocol_mismatch(connection_id, None, error);
                self.reply(connection_id, RecordKind::ConstructionRejected, peer_id, kind, transport);
                return;
            }
        };

        let creator = Creator::Remote(*connection_id);
        let authority = kind.behavior.authority(creator, self.config.topology);
        let mut object = NetworkedObject::new(
            ObjectHandle::from_u64(0),
            header.tag,
            values,
            creator,
            authority,
        );
        let context = self.context(*connection_id);

        if kind
            .behavior
            .decide_accept_remote_construction(&object, &context)
            == AcceptDecision::Reject
        {
            warn!(
                "rejected construction of `{}` {:?} from {}",
                kind.name, header.entity, connection_id
            );
            self.events.push_refusal(*connection_id, header.tag);
            self.reply(connection_id, RecordKind::ConstructionRejected, peer_id, kind, transport);
            return;
        }

        let handle = self.handle_generator.generate();
        object.set_handle(handle);
        let Some(connection) = self.connections.get_mut(connection_id) else {
            return;
        };
        connection.register_remote(peer_id, handle, kind.schema.len());
        self.objects.insert(handle, ObjectRecord::new(object, kind));
        info!(
            "constructed {} of kind `{}` for {}",
            handle, kind.name, connection_id
        );
        self.events.push_create(*connection_id, handle);
        self.reply(connection_id, RecordKind::ConstructionAccepted, peer_id, kind, transport);
    }

    // Answers a construction, naming the object by the constructor's handle
    fn reply(
        &mut self,
        connection: &ConnectionId,
        record_kind: RecordKind,
        peer_id: u64,
        kind: &ReplicaKind,
        transport: &mut dyn Transport,
    ) {
        let header = RecordHeader::new(record_kind, WireEntity::Remote(peer_id), kind.tag);
        send_record(
            transport,
            &mut self.events,
            *connection,
            None,
            &header_only_record(&header),
            ReliabilityClass::ReliableOrdered,
        );
    }

    fn receive_acceptance(
        &mut self,
        connection_id: &ConnectionId,
        header: &RecordHeader,
        kind: &ReplicaKind,
    ) {
        let Some(connection) = self.connections.get_mut(connection_id) else {
            return;
        };
        let Some(handle) = connection.resolve_incoming(&header.entity) else {
            debug!("acceptance of unknown {:?} from {}", header.entity, connection_id);
            return;
        };
        let Some(channel) = connection.channel_mut(&handle) else {
            return;
        };
        let unreliable = kind.schema.indices_for(ReliabilityClass::UnreliableWithReceipt);
        match channel.on_accepted(&unreliable) {
            Ok(_) => {
                debug!("{} accepted {}", connection_id, handle);
                self.events.push_accept(*connection_id, handle);
            }
            Err(error) => debug!("ignoring acceptance of {}: {}", handle, error),
        }
    }

    fn receive_rejection(&mut self, connection_id: &ConnectionId, header: &RecordHeader) {
        let Some(connection) = self.connections.get_mut(connection_id) else {
            return;
        };
        let Some(handle) = connection.resolve_incoming(&header.entity) else {
            debug!("rejection of unknown {:?} from {}", header.entity, connection_id);
            return;
        };
        let Some(channel) = connection.channel_mut(&handle) else {
            return;
        };
        match channel.on_rejected() {
            Ok(()) => {
                warn!("{} rejected construction of {}", connection_id, handle);
                self.events.push_reject(*connection_id, handle);
            }
            Err(error) => debug!("ignoring rejection of {}: {}", handle, error),
        }
    }

    fn receive_destruction(&mut self, connection_id: &ConnectionId, header: &RecordHeader) {
        let Some(connection) = self.connections.get_mut(connection_id) else {
            return;
        };
        // never constructed here: nothing to do
        let Some(handle) = connection.resolve_incoming(&header.entity) else {
            debug!("destruction of unknown {:?} from {}", header.entity, connection_id);
            return;
        };
        let Some(channel) = connection.channel_mut(&handle) else {
            return;
        };
        if matches!(channel.state(), ReplicaState::Absent | ReplicaState::Gone) {
            debug!("destruction of {} from {} which has no replica", handle, connection_id);
            return;
        }

        let owned_by_sender = self
            .objects
            .get(&handle)
            .is_some_and(|record| record.object.creator() == Creator::Remote(*connection_id));
        if owned_by_sender {
            channel.remote_destroyed();
            connection.remove_channel(&handle);
            if self.destroy_object_locally(&handle) {
                info!("{} destroyed {}", connection_id, handle);
                self.events.push_destroy(*connection_id, handle);
            }
        } else {
            // the peer dropped a replica it does not own
            channel.park();
            debug!("{} discarded its replica of {}", connection_id, handle);
        }
    }

    fn receive_serialize(
        &mut self,
        connection_id: &ConnectionId,
        header: &RecordHeader,
        kind: &ReplicaKind,
        reader: &mut BitReader,
    ) {
        let Some(connection) = self.connections.get(connection_id) else {
            return;
        };
        let Some(handle) = connection.resolve_incoming(&header.entity) else {
            debug!("update for unknown {:?} from {}", header.entity, connection_id);
            return;
        };
        if !connection
            .channel(&handle)
            .is_some_and(|channel| channel.is_live())
        {
            debug!("update for {} from {} before it is live", handle, connection_id);
            return;
        }
        let Some(record) = self.objects.get(&handle) else {
            return;
        };
        if record.destroyed {
            debug!("update for destroyed {} from {}", handle, connection_id);
            return;
        }
        if record.object.tag() != header.tag {
            let error = RecordError::TagMismatch {
                expected: record.object.tag(),
                actual: header.tag,
            };
            self.protocol_mismatch(connection_id, Some(handle), error);
            return;
        }
        if record.object.authority() != Authority::Remote {
            warn!(
                "ignoring update for {} from {}, it is locally authoritative",
                handle, connection_id
            );
            return;
        }
        if !kind
            .behavior
            .accepts_update_from(&record.object, &self.context(*connection_id))
        {
            warn!(
                "ignoring update for {} from {}, which does not hold its authority",
                handle, connection_id
            );
            return;
        }

        let reads = match DeserializeSession::read_all(reader, &kind.schema, header.tag) {
            Ok((_, reads)) => reads,
            Err(error) => {
                self.protocol_mismatch(connection_id, Some(handle), error);
                return;
            }
        };

        let Some(record) = self.objects.get_mut(&handle) else {
            return;
        };
        for read in reads {
            let VariableRead::Changed(index, value) = read else {
                continue;
            };
            if record.object.set_value(index, value.clone()) {
                kind.behavior
                    .on_variable_changed(&record.object, index, &value);
                self.events.push_update(*connection_id, handle, index);
            }
        }
    }

    /// A record disagreed with the local layout. The object it addressed, if
    /// any, is torn down locally.
    fn protocol_mismatch(
        &mut self,
        connection: &ConnectionId,
        handle: Option<ObjectHandle>,
        error: RecordError,
    ) {
        match handle {
            Some(handle) => warn!(
                "protocol mismatch on {} from {}: {}, destroying it",
                handle, connection, error
            ),
            None => warn!("protocol mismatch from {}: {}", connection, error),
        }
        if let Some(handle) = handle {
            if self.destroy_object_locally(&handle) {
                self.events.push_destroy(*connection, handle);
            }
        }
        self.events.push_mismatch(*connection, handle, error);
    }

    /// Removes a dropped connection and everything kept for it. Each object
    /// replicated on it is handed to its kind's pop hook.
    pub(crate) fn pop_connection(&mut self, connection_id: &ConnectionId) {
        let Some(connection) = self.connections.remove(connection_id) else {
            debug!("drop of unknown {}", connection_id);
            return;
        };
        info!("dropped {}", connection_id);

        let protocol = Arc::clone(&self.protocol);
        let context = self.context(*connection_id);
        let mut destroyed = Vec::new();
        let mut popped: Vec<ObjectHandle> = connection
            .channels()
            .filter(|(_, channel)| channel.state() != ReplicaState::Absent)
            .map(|(handle, _)| *handle)
            .collect();
        popped.sort();

        for handle in popped {
            let Some(record) = self.objects.get(&handle) else {
                continue;
            };
            if record.destroyed {
                continue;
            }
            let Some(kind) = protocol.replica_kinds.get(&record.object.tag()) else {
                continue;
            };
            if kind.behavior.on_pop(&record.object, &context) == PopAction::DestroyLocally
                && self.destroy_object_locally(&handle)
            {
                info!("{} destroyed by drop of {}", handle, connection_id);
                destroyed.push(handle);
            }
        }

        self.events.push_disconnection(*connection_id, destroyed);
    }
}
