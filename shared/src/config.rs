use std::default::Default;

/// The role this peer plays in the session. Standard authority policies use
/// it to decide who constructs and who serializes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Server,
    Client,
    Peer,
}

/// Whether a serialization record with no present variables is still sent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeartbeatPolicy {
    /// Only send a record if at least one variable changed
    OnlyWhenChanged,
    /// Always send a record, even when every present flag is false
    Always,
}

/// Contains Config properties which will be used by the ReplicationManager
#[derive(Clone, Debug)]
pub struct ReplicationConfig {
    /// Role of this peer
    pub topology: Topology,
    /// Determines whether empty serialization records are sent
    pub heartbeat: HeartbeatPolicy,
    /// Visit connections in a random order every tick, so no connection
    /// is consistently served first
    pub shuffle_connections: bool,
}

impl ReplicationConfig {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Self::default()
        }
    }
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            topology: Topology::Peer,
            heartbeat: HeartbeatPolicy::OnlyWhenChanged,
            shuffle_connections: true,
        }
    }
}
