/// A rejected construction leaves the pair Absent and silent until the host
/// asks for a new construction decision

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use replicant_shared::{
    ConstructionAcceptedEvent, ConstructionRejectedEvent, CreateObjectEvent, ObjectHandle,
    RecordKind, RemoteConstructionRejectedEvent, ReplicaState, ReplicationConfig, Topology,
    VariableValue,
};
use replicant_test::{
    assert_replica_state, gated_protocol, inspect_record, protocol, PeerIndex, TestNetwork,
    AWAITED, GATED,
};

struct Setup {
    network: TestNetwork,
    gate: Arc<AtomicBool>,
    host: PeerIndex,
    remote: PeerIndex,
    handle: ObjectHandle,
}

fn setup() -> Setup {
    let _ = env_logger::builder().is_test(true).try_init();

    let gate = Arc::new(AtomicBool::new(false));
    let mut network = TestNetwork::new();
    let host = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    let remote = network.add_peer(
        ReplicationConfig::new(Topology::Peer),
        gated_protocol(Arc::clone(&gate)),
    );
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(
            GATED,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();

    Setup {
        network,
        gate,
        host,
        remote,
        handle,
    }
}

#[test]
fn rejected_pair_stays_absent_and_silent() {
    let Setup {
        mut network,
        host,
        remote,
        handle,
        ..
    } = setup();

    network.step(host);
    let mut remote_events = network.step(remote);
    assert_eq!(
        remote_events
            .read::<RemoteConstructionRejectedEvent>()
            .collect::<Vec<_>>(),
        vec![(network.id(host), GATED)]
    );
    assert!(network.manager(remote).objects().is_empty());

    let mut host_events = network.tick(host);
    assert_eq!(
        host_events.read::<ConstructionRejectedEvent>().collect::<Vec<_>>(),
        vec![(network.id(remote), handle)]
    );
    assert_replica_state!(network, host, handle, remote, ReplicaState::Absent);

    // nothing is sent for the object, however often it changes
    for value in 10..15 {
        network.manager_mut(host).set(&handle, 0, &value).unwrap();
        network.manager_mut(host).set(&handle, 1, &value).unwrap();
        network.tick(host);
    }
    assert!(network.peer(host).transport.sent().is_empty());
    assert_replica_state!(network, host, handle, remote, ReplicaState::Absent);
}

#[test]
fn reconsidered_pair_is_constructed_again() {
    let Setup {
        mut network,
        gate,
        host,
        remote,
        handle,
    } = setup();
    network.settle(3);
    assert_replica_state!(network, host, handle, remote, ReplicaState::Absent);

    gate.store(true, Ordering::SeqCst);
    network.manager_mut(host).set(&handle, 0, &7i32).unwrap();
    let remote_id = network.id(remote);
    network
        .manager_mut(host)
        .reconsider_construction(&handle, &remote_id)
        .unwrap();

    network.tick(host);
    let kinds: Vec<RecordKind> = network
        .peer(host)
        .transport
        .sent()
        .iter()
        .map(|record| {
            inspect_record(network.manager(host).protocol(), &record.payload)
                .unwrap()
                .kind()
        })
        .collect();
    assert_eq!(kinds.first(), Some(&RecordKind::Construction));
    network.deliver(host);

    let mut remote_events = network.step(remote);
    let created: Vec<_> = remote_events.read::<CreateObjectEvent>().collect();
    assert_eq!(created.len(), 1);
    let replica = created[0].1;
    assert_eq!(
        network.manager(remote).object(&replica).unwrap().get::<i32>(0),
        Ok(7)
    );

    let mut host_events = network.step(host);
    assert!(host_events.read::<ConstructionAcceptedEvent>().count() == 1);
    assert_replica_state!(network, host, handle, remote, ReplicaState::Live);
}

#[test]
fn awaited_construction_serializes_only_after_acceptance() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    let host = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    let remote = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(
            AWAITED,
            vec![VariableValue::new(&1i32), VariableValue::new(&2i32)],
        )
        .unwrap();

    network.tick(host);
    assert_replica_state!(network, host, handle, remote, ReplicaState::ConstructionPending);
    let sent = network.peer(host).transport.sent().to_vec();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        inspect_record(network.manager(host).protocol(), &sent[0].payload)
            .unwrap()
            .kind(),
        RecordKind::Construction
    );
    network.deliver(host);

    // still pending, and still silent, until the answer arrives
    network.manager_mut(host).set(&handle, 0, &3i32).unwrap();
    network.tick(host);
    assert!(network.peer(host).transport.sent().is_empty());

    network.step(remote);
    network.tick(host);
    assert_replica_state!(network, host, handle, remote, ReplicaState::Live);
    let serialized = network
        .peer(host)
        .transport
        .sent()
        .iter()
        .filter_map(|record| inspect_record(network.manager(host).protocol(), &record.payload).ok())
        .find(|record| record.kind() == RecordKind::Serialize && record.is_present(0))
        .expect("a serialize record after acceptance");
    assert_eq!(serialized.present(0), Some(&VariableValue::new(&3i32)));
}
