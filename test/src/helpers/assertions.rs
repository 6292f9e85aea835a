/// Assert the lifecycle state of an object on one of a peer's connections
#[macro_export]
macro_rules! assert_replica_state {
    ($network:expr, $peer:expr, $handle:expr, $remote:expr, $state:expr) => {
        let connection = $network.id($remote);
        assert_eq!(
            $network.manager($peer).replica_state(&$handle, &connection),
            $state,
            "replica state of {} on {}",
            $handle,
            connection
        );
    };
}

/// Assert a peer holds an object whose variable decodes to the given value
#[macro_export]
macro_rules! assert_variable {
    ($network:expr, $peer:expr, $handle:expr, $index:expr, $value:expr) => {
        let object = $network
            .manager($peer)
            .object(&$handle)
            .expect("object should exist on peer");
        assert_eq!(object.get($index), Ok($value));
    };
}
