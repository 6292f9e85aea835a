mod behavior;
mod networked_object;
mod replica_kind;
mod schema;
mod variable;

pub use behavior::{
    AcceptDecision, AuthorityPolicy, ConnectionContext, ConstructionAuthority,
    ConstructionDecision, PopAction, PopPolicy, ReplicaBehavior, SerializationAuthority,
    SerializeDecision,
};
pub use networked_object::{Authority, Creator, NetworkedObject};
pub use replica_kind::{ConstructionConfirmation, ReplicaKind, ReplicaKinds, ReplicaTag};
pub use schema::{ReplicaSchema, SerializeMode, MAX_VARIABLES};
pub use variable::{VariableSpec, VariableValue};
