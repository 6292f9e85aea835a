/// What a peer does with the serialization records it receives: changed
/// variables reach the kind's hook, and a record that disagrees with the
/// local layout tears the object down everywhere

use std::sync::{Arc, Mutex};

use replicant_shared::{
    AcceptDecision, Authority, AuthorityPolicy, BitWriter, ConnectionContext,
    ConstructionDecision, Creator, DestroyObjectEvent, NetworkedObject, PopAction, Protocol,
    ProtocolMismatchEvent, RecordError, RecordHeader, RecordKind, ReliabilityClass,
    ReplicaBehavior, ReplicaKind, ReplicaSchema, ReplicaTag, ReplicationConfig, Serde,
    SerializeDecision, Topology, UnsignedVariableInteger, UpdateVariableEvent, VariableIndex,
    VariableValue, WireEntity,
};
use replicant_test::{protocol, TestNetwork, SAMPLES};

const WATCHED: ReplicaTag = ReplicaTag::new(30);

type ChangeLog = Arc<Mutex<Vec<(VariableIndex, VariableValue)>>>;

/// Peer-to-peer policy that keeps every remote change it is told about
struct WatchedBehavior {
    policy: AuthorityPolicy,
    changes: ChangeLog,
}

impl ReplicaBehavior for WatchedBehavior {
    fn decide_construction(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> ConstructionDecision {
        self.policy.decide_construction(object, context)
    }

    fn decide_accept_remote_construction(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> AcceptDecision {
        self.policy.decide_accept_remote_construction(object, context)
    }

    fn decide_serialization(
        &self,
        object: &NetworkedObject,
        context: &ConnectionContext,
    ) -> SerializeDecision {
        self.policy.decide_serialization(object, context)
    }

    fn on_variable_changed(
        &self,
        object: &NetworkedObject,
        index: VariableIndex,
        value: &VariableValue,
    ) {
        assert_eq!(object.value(index), Some(value));
        self.changes.lock().unwrap().push((index, value.clone()));
    }

    fn on_pop(&self, object: &NetworkedObject, context: &ConnectionContext) -> PopAction {
        self.policy.on_pop(object, context)
    }

    fn authority(&self, creator: Creator, topology: Topology) -> Authority {
        self.policy.authority(creator, topology)
    }
}

fn watched_protocol(changes: ChangeLog) -> Protocol {
    let mut protocol = Protocol::builder();
    protocol.add_replica(ReplicaKind::new(
        WATCHED.value(),
        "Watched",
        ReplicaSchema::new().reliable::<i32>().unreliable::<i32>(),
        WatchedBehavior {
            policy: AuthorityPolicy::peer_to_peer(),
            changes,
        },
    ));
    protocol.build()
}

// One reliable slot plus a second, absent one the receiver's layout lacks
fn serialize_with_extra_variable(entity: WireEntity, tag: ReplicaTag) -> Vec<u8> {
    let mut writer = BitWriter::new();
    RecordHeader::new(RecordKind::Serialize, entity, tag).ser(&mut writer);
    ReliabilityClass::ReliableOrdered.ser(&mut writer);
    true.ser(&mut writer);
    7u32.ser(&mut writer);
    false.ser(&mut writer);
    UnsignedVariableInteger::<3>::new(2u64).ser(&mut writer);
    writer.to_bytes()
}

#[test]
fn remote_changes_reach_the_variable_hook() {
    let _ = env_logger::builder().is_test(true).try_init();
    let host_changes = ChangeLog::default();
    let remote_changes = ChangeLog::default();
    let mut network = TestNetwork::new();
    let host = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        watched_protocol(host_changes.clone()),
    );
    let remote = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        watched_protocol(remote_changes.clone()),
    );
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(
            WATCHED,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.settle(3);
    assert!(remote_changes.lock().unwrap().is_empty());

    network.manager_mut(host).set(&handle, 0, &9i32).unwrap();
    network.manager_mut(host).set(&handle, 1, &-3i32).unwrap();
    network.step(host);
    let mut events = network.step(remote);

    assert_eq!(events.read::<UpdateVariableEvent>().count(), 2);
    let changes = remote_changes.lock().unwrap();
    assert_eq!(changes.len(), 2);
    assert!(changes.contains(&(0, VariableValue::new(&9i32))));
    assert!(changes.contains(&(1, VariableValue::new(&-3i32))));
    assert!(host_changes.lock().unwrap().is_empty());
}

#[test]
fn unchanged_values_do_not_reach_the_variable_hook() {
    let _ = env_logger::builder().is_test(true).try_init();
    let remote_changes = ChangeLog::default();
    let mut network = TestNetwork::new();
    let host = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        watched_protocol(ChangeLog::default()),
    );
    let remote = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        watched_protocol(remote_changes.clone()),
    );
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(
            WATCHED,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.settle(3);

    // set back to the value the remote already holds
    network.manager_mut(host).set(&handle, 0, &1i32).unwrap();
    network.settle(2);

    assert!(remote_changes.lock().unwrap().is_empty());
}

#[test]
fn layout_mismatch_destroys_the_object_everywhere() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (server, client_a, client_b) = (0, 1, 2);
    let mut network = TestNetwork::new();
    network.add_peer(ReplicationConfig::new(Topology::Server), protocol());
    network.add_peer(ReplicationConfig::new(Topology::Client), protocol());
    network.add_peer(ReplicationConfig::new(Topology::Client), protocol());
    network.connect(server, client_a);
    network.connect(server, client_b);
    let handle = network
        .manager_mut(client_a)
        .create_local_object(
            SAMPLES[3],
            vec![VariableValue::new(&1u32), VariableValue::new(&0.5f32)],
        )
        .unwrap();
    network.settle(3);
    let on_server = network.manager(server).objects()[0].handle();
    assert_eq!(network.manager(client_b).objects().len(), 1);

    let payload = serialize_with_extra_variable(WireEntity::Host(handle.to_u64()), SAMPLES[3]);
    network
        .manager(server)
        .event_sender()
        .received(network.id(client_a), payload)
        .unwrap();
    let mut events = network.step(server);

    let mismatches: Vec<_> = events.read::<ProtocolMismatchEvent>().collect();
    assert_eq!(mismatches.len(), 1);
    let (connection, mismatched, error) = &mismatches[0];
    assert_eq!(*connection, network.id(client_a));
    assert_eq!(*mismatched, Some(on_server));
    assert!(matches!(error, RecordError::VariableCountMismatch { .. }));
    assert_eq!(
        events.read::<DestroyObjectEvent>().collect::<Vec<_>>(),
        vec![(network.id(client_a), on_server)]
    );
    assert_eq!(events.read::<UpdateVariableEvent>().count(), 0);
    assert!(!network.manager(server).has_object(&on_server));

    let mut events = network.step(client_b);
    assert_eq!(events.read::<DestroyObjectEvent>().count(), 1);
    assert!(network.manager(client_b).objects().is_empty());
}
