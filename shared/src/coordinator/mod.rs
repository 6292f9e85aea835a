mod events;
mod inbound;
mod outbound;
mod replication_manager;

pub use events::{
    ConnectEvent, ConstructionAcceptedEvent, ConstructionRejectedEvent, CreateObjectEvent,
    DestroyObjectEvent, DisconnectEvent, ProtocolMismatchEvent, RemoteConstructionRejectedEvent,
    ReplicationEvent, ReplicationEvents, SendFailedEvent, UpdateVariableEvent,
};
pub use replication_manager::ReplicationManager;
