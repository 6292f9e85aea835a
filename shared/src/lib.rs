//! # Replicant Shared
//! Object replication with per-connection delta tracking.
//!
//! A [`ReplicationManager`] keeps copies of networked objects consistent
//! across a set of connections. Each tick it walks every object against every
//! connection, lets the lifecycle state machine decide whether the pair needs a
//! construction or destruction record, and then serializes only the variables
//! that changed since that connection last received them. Variables sent
//! unreliably stay dirty until the transport confirms delivery, and are resent
//! if the send is reported lost.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use replicant_serde::{
    BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, SignedInteger,
    SignedVariableInteger, UnsignedInteger, UnsignedVariableInteger,
};

mod config;
mod connection;
mod coordinator;
mod delta;
mod error;
mod handle_generator;
mod lifecycle;
mod protocol;
mod reliability;
mod replica;
mod serialization;
mod transport;
mod types;

pub use config::{HeartbeatPolicy, ReplicationConfig, Topology};
pub use connection::Connection;
pub use coordinator::{
    ConnectEvent, ConstructionAcceptedEvent, ConstructionRejectedEvent, CreateObjectEvent,
    DestroyObjectEvent, DisconnectEvent, ProtocolMismatchEvent, RemoteConstructionRejectedEvent,
    ReplicationEvent, ReplicationEvents, ReplicationManager, SendFailedEvent,
    UpdateVariableEvent,
};
pub use delta::{
    Delta, DeltaSource, DeltaState, DeltaTracker, FullSnapshot, IdenticalShadow, ReceiptLedger,
};
pub use error::ReplicationError;
pub use handle_generator::HandleGenerator;
pub use lifecycle::{LifecycleAction, LifecycleError, ReplicaChannel, ReplicaOrigin, ReplicaState};
pub use protocol::{Protocol, ProtocolError};
pub use reliability::ReliabilityClass;
pub use replica::{
    AcceptDecision, Authority, AuthorityPolicy, ConnectionContext, ConstructionAuthority,
    ConstructionConfirmation, ConstructionDecision, Creator, NetworkedObject, PopAction,
    PopPolicy, ReplicaBehavior, ReplicaKind, ReplicaKinds, ReplicaSchema, ReplicaTag,
    SerializationAuthority, SerializeDecision, SerializeMode, VariableSpec, VariableValue,
    MAX_VARIABLES,
};
pub use serialization::{
    header_only_record, ConstructionRecord, DeserializeSession, OutgoingRecord, PendingEmission,
    RecordError, RecordHeader, RecordKind, SerializeSession, VariableRead, WireEntity,
};
pub use transport::{EventQueue, EventSender, Transport, TransportError, TransportEvent};
pub use types::{ConnectionId, ObjectHandle, ReceiptId, Tick, VariableIndex};
