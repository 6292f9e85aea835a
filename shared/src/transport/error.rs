use thiserror::Error;

use crate::{ConnectionId, ReliabilityClass};

/// Errors that can occur when handing records to the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The transport does not know the connection
    #[error("Transport has no connection {connection}")]
    UnknownConnection { connection: ConnectionId },

    /// The send call itself failed
    #[error("Failed to send {bytes} bytes to {connection}: {reason}")]
    SendFailed {
        connection: ConnectionId,
        bytes: usize,
        reason: String,
    },

    /// An unreliable send came back without the receipt it must carry
    #[error("Transport returned no receipt for a {} send to {connection}", .class.name())]
    MissingReceipt {
        connection: ConnectionId,
        class: ReliabilityClass,
    },

    /// The ReplicationManager owning the event queue is gone
    #[error("Replication event queue is closed, the ReplicationManager has been dropped")]
    QueueClosed,
}
