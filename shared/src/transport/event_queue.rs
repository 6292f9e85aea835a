use std::sync::mpsc::{channel, Receiver, Sender};

use crate::{ConnectionId, ReceiptId, TransportError};

/// Something the transport observed, to be applied at the next tick boundary
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Connected(ConnectionId),
    Received {
        connection: ConnectionId,
        payload: Vec<u8>,
    },
    ReceiptResolved {
        connection: ConnectionId,
        receipt: ReceiptId,
        delivered: bool,
    },
    Dropped(ConnectionId),
}

/// Cloneable handle a network thread uses to report transport events
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<TransportEvent>,
}

impl EventSender {
    pub fn send(&self, event: TransportEvent) -> Result<(), TransportError> {
        self.sender
            .send(event)
            .map_err(|_| TransportError::QueueClosed)
    }

    pub fn connected(&self, connection: ConnectionId) -> Result<(), TransportError> {
        self.send(TransportEvent::Connected(connection))
    }

    pub fn received(&self, connection: ConnectionId, payload: Vec<u8>) -> Result<(), TransportError> {
        self.send(TransportEvent::Received {
            connection,
            payload,
        })
    }

    pub fn receipt_resolved(
        &self,
        connection: ConnectionId,
        receipt: ReceiptId,
        delivered: bool,
    ) -> Result<(), TransportError> {
        self.send(TransportEvent::ReceiptResolved {
            connection,
            receipt,
            delivered,
        })
    }

    pub fn dropped(&self, connection: ConnectionId) -> Result<(), TransportError> {
        self.send(TransportEvent::Dropped(connection))
    }
}

/// Tick-side end of the transport event channel
pub struct EventQueue {
    receiver: Receiver<TransportEvent>,
}

impl EventQueue {
    pub fn new() -> (EventSender, Self) {
        let (sender, receiver) = channel();
        (EventSender { sender }, Self { receiver })
    }

    /// Takes every event queued so far, in arrival order
    pub fn drain(&mut self) -> Vec<TransportEvent> {
        self.receiver.try_iter().collect()
    }
}
