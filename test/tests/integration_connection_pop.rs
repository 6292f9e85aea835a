/// Dropping a connection hands each of its replicas to the kind's pop policy

use replicant_shared::{
    AuthorityPolicy, ConstructionAuthority, DestroyObjectEvent, DisconnectEvent, PopPolicy,
    Protocol, RecordKind, ReplicaKind, ReplicaSchema, ReplicaState, ReplicaTag,
    ReplicationConfig, SerializationAuthority, Topology, VariableValue,
};
use replicant_test::{assert_replica_state, inspect_record, protocol, TestNetwork, MOVER};

const BEACON: ReplicaTag = ReplicaTag::new(1);

fn beacon_protocol(pop: PopPolicy) -> Protocol {
    let mut protocol = Protocol::builder();
    protocol.add_replica(ReplicaKind::new(
        BEACON.value(),
        "Beacon",
        ReplicaSchema::new().reliable::<u16>().unreliable::<u16>(),
        AuthorityPolicy::new(
            ConstructionAuthority::Peer,
            SerializationAuthority::Creator,
            pop,
        ),
    ));
    protocol.build()
}

fn beacon() -> Vec<VariableValue> {
    vec![VariableValue::new(&1u16), VariableValue::new(&2u16)]
}

#[test]
fn pop_with_destroy_removes_the_local_object() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    let host = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        beacon_protocol(PopPolicy::AlwaysDestroy),
    );
    let dropped = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        beacon_protocol(PopPolicy::AlwaysDestroy),
    );
    let bystander = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        beacon_protocol(PopPolicy::AlwaysDestroy),
    );
    network.connect(host, dropped);
    network.connect(host, bystander);
    let handle = network
        .manager_mut(host)
        .create_local_object(BEACON, beacon())
        .unwrap();
    network.settle(3);
    assert_replica_state!(network, host, handle, dropped, ReplicaState::Live);
    assert_eq!(network.manager(bystander).objects().len(), 1);

    let dropped_id = network.id(dropped);
    network
        .manager(host)
        .event_sender()
        .dropped(dropped_id)
        .unwrap();
    let mut events = network.tick(host);

    assert_eq!(
        events.read::<DisconnectEvent>().collect::<Vec<_>>(),
        vec![(dropped_id, vec![handle])]
    );
    assert!(!network.manager(host).has_object(&handle));
    assert!(!network.manager(host).has_connection(&dropped_id));

    // nothing more for the dropped connection, the bystander is told to destroy
    let sent = network.peer(host).transport.sent().to_vec();
    assert!(sent.iter().all(|record| record.connection != dropped_id));
    let kinds: Vec<RecordKind> = sent
        .iter()
        .map(|record| {
            inspect_record(network.manager(host).protocol(), &record.payload)
                .unwrap()
                .kind()
        })
        .collect();
    assert_eq!(kinds, vec![RecordKind::Destruction]);

    network.deliver(host);
    let mut events = network.step(bystander);
    assert_eq!(events.read::<DestroyObjectEvent>().count(), 1);
    assert!(network.manager(bystander).objects().is_empty());
}

#[test]
fn pop_with_drop_keeps_the_local_object() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    let host = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        beacon_protocol(PopPolicy::AlwaysDrop),
    );
    let remote = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        beacon_protocol(PopPolicy::AlwaysDrop),
    );
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(BEACON, beacon())
        .unwrap();
    network.settle(3);
    let replica = network.manager(remote).objects()[0].handle();

    network.disconnect(host, remote);
    let mut host_events = network.tick(host);
    assert!(network.peer(host).transport.sent().is_empty());
    let mut remote_events = network.step(remote);

    assert_eq!(
        host_events.read::<DisconnectEvent>().collect::<Vec<_>>(),
        vec![(network.id(remote), Vec::new())]
    );
    assert!(network.manager(host).has_object(&handle));
    assert!(remote_events.has::<DisconnectEvent>());
    assert!(network.manager(remote).has_object(&replica));
}

#[test]
fn pop_destroys_replicas_created_by_the_dropped_peer() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    let creator = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    let holder = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    network.connect(creator, holder);
    let handle = network
        .manager_mut(creator)
        .create_local_object(
            MOVER,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();
    network.settle(3);
    let replica = network.manager(holder).objects()[0].handle();

    network.disconnect(creator, holder);
    network.settle(1);

    // the holder loses the replica, the creator keeps its object
    assert!(!network.manager(holder).has_object(&replica));
    assert!(network.manager(creator).has_object(&handle));
    assert_eq!(network.manager(creator).objects_created_locally(), vec![handle]);
}
