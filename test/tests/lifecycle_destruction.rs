/// Destruction records for objects a connection never constructed are no-ops

use replicant_shared::{
    header_only_record, DestroyObjectEvent, ProtocolMismatchEvent, RecordHeader, RecordKind,
    ReplicaState, ReplicationConfig, Topology, VariableValue, WireEntity,
};
use replicant_test::{assert_replica_state, protocol, TestNetwork, MOVER};

fn network() -> TestNetwork {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    network.connect(0, 1);
    network
}

#[test]
fn destruction_of_unknown_object_is_ignored() {
    let mut network = network();
    let handle = network
        .manager_mut(0)
        .create_local_object(
            MOVER,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.settle(2);

    let sender = network.manager(0).event_sender();
    let from = network.id(1);
    for entity in [WireEntity::Host(99), WireEntity::Remote(99)] {
        let header = RecordHeader::new(RecordKind::Destruction, entity, MOVER);
        sender.received(from, header_only_record(&header)).unwrap();
    }
    let mut events = network.tick(0);

    assert!(!events.has::<DestroyObjectEvent>());
    assert_eq!(events.read::<ProtocolMismatchEvent>().count(), 0);
    assert!(network.manager(0).has_object(&handle));
    assert_replica_state!(network, 0, handle, 1, ReplicaState::Live);
}

#[test]
fn destruction_arriving_twice_is_applied_once() {
    let mut network = network();
    network
        .manager_mut(0)
        .create_local_object(
            MOVER,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.settle(2);
    let handle = network.manager(0).objects()[0].handle();

    network.manager_mut(0).destroy_local_object(&handle).unwrap();
    network.tick(0);
    let destruction = network.peer_mut(0).transport.take_sent();
    assert_eq!(destruction.len(), 1);

    let sender = network.manager(1).event_sender();
    let from = network.id(0);
    sender.received(from, destruction[0].payload.clone()).unwrap();
    sender.received(from, destruction[0].payload.clone()).unwrap();
    let mut events = network.tick(1);

    assert_eq!(events.read::<DestroyObjectEvent>().count(), 1);
    assert!(network.manager(1).objects().is_empty());
}

#[test]
fn object_destroyed_before_construction_sends_nothing() {
    let mut network = network();
    let handle = network
        .manager_mut(0)
        .create_local_object(
            MOVER,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.manager_mut(0).destroy_local_object(&handle).unwrap();

    network.tick(0);

    assert!(network.peer(0).transport.sent().is_empty());
    assert!(network.manager(0).objects().is_empty());
}
