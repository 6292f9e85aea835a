mod error;
mod event_queue;

pub use error::TransportError;
pub use event_queue::{EventQueue, EventSender, TransportEvent};

use crate::{ConnectionId, ReceiptId, ReliabilityClass};

/// The outbound half of the transport collaborator
pub trait Transport {
    /// Sends a record to `connection`. Returns the receipt for
    /// unreliable-with-receipt sends, None for reliable-ordered ones. The
    /// resolution of every receipt must later be reported exactly once
    /// through an `EventSender`.
    fn send(
        &mut self,
        connection: ConnectionId,
        payload: &[u8],
        class: ReliabilityClass,
    ) -> Result<Option<ReceiptId>, TransportError>;
}
