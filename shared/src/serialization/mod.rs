mod construction;
mod deserialize_session;
mod error;
mod record;
mod serialize_session;

pub use construction::ConstructionRecord;
pub use deserialize_session::{DeserializeSession, VariableRead};
pub use error::RecordError;
pub use record::{header_only_record, RecordHeader, RecordKind, WireEntity};
pub use serialize_session::{OutgoingRecord, PendingEmission, SerializeSession};
