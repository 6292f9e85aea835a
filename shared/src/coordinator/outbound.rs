use std::sync::Arc;

use log::{debug, warn};

use super::replication_manager::ObjectRecord;
use crate::{
    header_only_record, Connection, ConnectionContext, ConnectionId, ConstructionDecision,
    ConstructionRecord, DeltaSource, FullSnapshot, HeartbeatPolicy, LifecycleAction,
    ObjectHandle, ReceiptId, RecordHeader, RecordKind, ReliabilityClass,
    ReplicaKind, ReplicaState, ReplicationEvents, ReplicationManager, SerializeDecision,
    SerializeMode, SerializeSession, Topology, Transport, TransportError, VariableIndex,
};

// Settings shared by every pair of one object in one pass
struct ObjectPass<'k> {
    kind: &'k ReplicaKind,
    topology: Topology,
    heartbeat: HeartbeatPolicy,
    classes: Vec<(ReliabilityClass, SerializeMode, Vec<VariableIndex>)>,
    shadow_changed: bool,
}

impl ReplicationManager {
    /// Runs the lifecycle machine and serialization sessions of one object
    /// against every connection
    pub(crate) fn replicate_object(
        &mut self,
        handle: &ObjectHandle,
        connection_order: &[ConnectionId],
        transport: &mut dyn Transport,
    ) {
        let protocol = Arc::clone(&self.protocol);
        let Some(record) = self.objects.get_mut(handle) else {
            return;
        };
        let Some(kind) = protocol.replica_kinds.get(&record.object.tag()) else {
            return;
        };

        let classes = ReliabilityClass::ALL
            .iter()
            .map(|class| {
                (
                    *class,
                    kind.schema.mode_for(*class),
                    kind.schema.indices_for(*class),
                )
            })
            .filter(|(_, _, indices)| !indices.is_empty())
            .collect();
        let reliable = kind.schema.indices_for(ReliabilityClass::ReliableOrdered);
        let shadow_changed = !record.destroyed
            && record
                .shadow
                .as_ref()
                .is_some_and(|shadow| shadow.has_changes(record.object.values(), &reliable));

        let pass = ObjectPass {
            kind,
            topology: self.config.topology,
            heartbeat: self.config.heartbeat,
            classes,
            shadow_changed,
        };

        for connection_id in connection_order {
            let Some(connection) = self.connections.get_mut(connection_id) else {
                continue;
            };
            pass.replicate_pair(record, connection, transport, &mut self.events);
        }

        if shadow_changed {
            if let Some(shadow) = record.shadow.as_mut() {
                shadow.commit(record.object.values(), &reliable);
            }
        }
    }
}

impl ObjectPass<'_> {
    fn replicate_pair(
        &self,
        record: &ObjectRecord,
        connection: &mut Connection,
        transport: &mut dyn Transport,
        events: &mut ReplicationEvents,
    ) {
        let handle = record.object.handle();
        let context = ConnectionContext::new(connection.id(), self.topology);

        if record.destroyed && connection.channel(&handle).is_none() {
            return;
        }

        let channel = connection.channel_or_insert(handle, self.kind.schema.len());
        match channel.next_action(record.destroyed) {
            LifecycleAction::Construct => {
                self.construct_pair(record, &context, connection, transport, events)
            }
            LifecycleAction::Destroy => self.destroy_pair(&handle, connection, transport, events),
            LifecycleAction::None if record.destroyed => {
                // the peer never heard of the object
                connection.remove_channel(&handle);
            }
            LifecycleAction::Serialize | LifecycleAction::None => {}
        }
        if record.destroyed {
            return;
        }

        // a pair constructed above may serialize in the same tick
        if connection
            .channel(&handle)
            .is_some_and(|channel| channel.is_live())
        {
            self.serialize_pair(record, &context, connection, transport, events);
        }
    }

    fn construct_pair(
        &self,
        record: &ObjectRecord,
        context: &ConnectionContext,
        connection: &mut Connection,
        transport: &mut dyn Transport,
        events: &mut ReplicationEvents,
    ) {
        if self.kind.behavior.decide_construction(&record.object, context)
            == ConstructionDecision::Skip
        {
            return;
        }
        let handle = record.object.handle();
        let Some(channel) = connection.channel_mut(&handle) else {
            return;
        };
        if channel.state() == ReplicaState::Absent {
            if let Err(error) = channel.begin_construction() {
                debug!("{} on {}: {}", handle, context.connection, error);
                return;
            }
        }

        let payload = ConstructionRecord::write(
            channel.wire_entity(),
            self.kind.tag,
            record.object.values(),
        );
        let sent = send_record(
            transport,
            events,
            context.connection,
            Some(handle),
            &payload,
            ReliabilityClass::ReliableOrdered,
        );
        if sent.is_none() {
            channel.abort_construction();
            return;
        }
        if let Err(error) = channel.mark_construction_sent(self.kind.confirmation) {
            debug!("{} on {}: {}", handle, context.connection, error);
            return;
        }
        debug!(
            "sent construction of {} to {}, now {}",
            handle,
            context.connection,
            channel.state()
        );
    }

    fn destroy_pair(
        &self,
        handle: &ObjectHandle,
        connection: &mut Connection,
        transport: &mut dyn Transport,
        events: &mut ReplicationEvents,
    ) {
        let connection_id = connection.id();
        let Some(channel) = connection.channel_mut(handle) else {
            return;
        };
        if channel.begin_destruction() == ReplicaState::Gone {
            connection.remove_channel(handle);
            return;
        }

        let header = RecordHeader::new(RecordKind::Destruction, channel.wire_entity(), self.kind.tag);
        let sent = send_record(
            transport,
            events,
            connection_id,
            Some(*handle),
            &header_only_record(&header),
            ReliabilityClass::ReliableOrdered,
        );
        // a failed send stays DestructionPending and is retried next tick
        if sent.is_none() {
            return;
        }
        if let Err(error) = channel.mark_destruction_sent() {
            debug!("{} on {}: {}", handle, connection_id, error);
        }
        connection.remove_channel(handle);
        debug!("sent destruction of {} to {}", handle, connection_id);
    }

    fn serialize_pair(
        &self,
        record: &ObjectRecord,
        context: &ConnectionContext,
        connection: &mut Connection,
        transport: &mut dyn Transport,
        events: &mut ReplicationEvents,
    ) {
        let handle = record.object.handle();
        let skip = self.kind.behavior.decide_serialization(&record.object, context)
            == SerializeDecision::Skip;

        for (class, mode, indices) in &self.classes {
            let identical = *mode == SerializeMode::Identical;
            let Some(channel) = connection.channel_mut(&handle) else {
                return;
            };
            if skip {
                // missed a shared pass, needs a full record next time
                if identical && self.shadow_changed {
                    channel.set_identical_primed(false);
                }
                continue;
            }

            let header = RecordHeader::new(RecordKind::Serialize, channel.wire_entity(), self.kind.tag);
            let outgoing = {
                let source: &dyn DeltaSource = match (identical, &record.shadow) {
                    (true, Some(shadow)) if channel.is_identical_primed() => shadow,
                    (true, _) => &FullSnapshot,
                    (false, _) => channel.tracker(),
                };
                let mut session = SerializeSession::begin(*class, &header);
                for index in indices {
                    if let Some(value) = record.object.value(*index) {
                        session.write(source, *index, value);
                    }
                }
                session.end(self.heartbeat)
            };
            let Some(outgoing) = outgoing else {
                continue;
            };

            let sent = send_record(
                transport,
                events,
                context.connection,
                Some(handle),
                &outgoing.payload,
                *class,
            );
            match sent {
                Some(receipt) => {
                    if identical {
                        channel.set_identical_primed(true);
                    } else {
                        connection.commit_record(&handle, &outgoing, receipt);
                    }
                }
                None => {
                    // tracker untouched, the values go out again next pass
                    if identical {
                        channel.set_identical_primed(false);
                    }
                }
            }
        }
    }
}

/// Hands a record to the transport. Returns the receipt (None for reliable
/// sends) on success. Failures are logged and reported as events.
pub(crate) fn send_record(
    transport: &mut dyn Transport,
    events: &mut ReplicationEvents,
    connection: ConnectionId,
    handle: Option<ObjectHandle>,
    payload: &[u8],
    class: ReliabilityClass,
) -> Option<Option<ReceiptId>> {
    let result = match transport.send(connection, payload, class) {
        Ok(None) if class.has_receipt() => {
            Err(TransportError::MissingReceipt { connection, class })
        }
        Ok(receipt) if class.has_receipt() => Ok(receipt),
        Ok(_) => Ok(None),
        Err(error) => Err(error),
    };
    match result {
        Ok(receipt) => Some(receipt),
        Err(error) => {
            warn!("failed to send {} record to {}: {}", class.name(), connection, error);
            events.push_send_failure(connection, handle, error);
            None
        }
    }
}
