/// Reliable records for one object are applied in the order they were sent

use replicant_shared::{ReplicationConfig, Topology, UpdateVariableEvent, VariableValue};
use replicant_test::{protocol, TestNetwork, MOVER};

#[test]
fn reliable_updates_apply_in_send_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut network = TestNetwork::new();
    let host = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    let remote = network.add_peer(ReplicationConfig::new(Topology::Peer), protocol());
    network.connect(host, remote);
    let handle = network
        .manager_mut(host)
        .create_local_object(
            MOVER,
            vec![VariableValue::new(&0i32), VariableValue::new(&0i32)],
        )
        .unwrap();
    network.settle(3);
    let replica = network.manager(remote).objects()[0].handle();

    // three ticks worth of reliable records arrive together
    for value in [1i32, 2, 3] {
        network.manager_mut(host).set(&handle, 0, &value).unwrap();
        network.tick(host);
    }
    network.deliver(host);
    let mut events = network.step(remote);

    let updates: Vec<_> = events
        .read::<UpdateVariableEvent>()
        .filter(|(_, handle, index)| *handle == replica && *index == 0)
        .collect();
    assert_eq!(updates.len(), 3);
    assert_eq!(
        network.manager(remote).object(&replica).unwrap().get::<i32>(0),
        Ok(3)
    );
}
