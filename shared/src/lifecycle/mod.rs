mod error;
mod replica_channel;
mod replica_state;

pub use error::LifecycleError;
pub use replica_channel::{LifecycleAction, ReplicaChannel, ReplicaOrigin};
pub use replica_state::ReplicaState;
