pub mod local_transport;

pub use helpers::*;
pub use local_transport::{LocalTransport, SentRecord};
pub use test_protocol::{
    gated_protocol, protocol, GatedBehavior, AWAITED, GATED, IDENTICAL, MOVER, SAMPLES,
};
