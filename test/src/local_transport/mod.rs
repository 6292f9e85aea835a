/// In-memory transport for tests
/// Keeps every record handed to it until the test network routes it

use replicant_shared::{ConnectionId, ReceiptId, ReliabilityClass, Transport, TransportError};

/// One record accepted by a LocalTransport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentRecord {
    pub connection: ConnectionId,
    pub payload: Vec<u8>,
    pub class: ReliabilityClass,
    pub receipt: Option<ReceiptId>,
}

pub struct LocalTransport {
    outbox: Vec<SentRecord>,
    next_receipt: ReceiptId,
    /// While set, every send fails
    pub fail_sends: bool,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self {
            outbox: Vec::new(),
            next_receipt: 0,
            fail_sends: false,
        }
    }

    /// Takes everything sent since the last call, in send order
    pub fn take_sent(&mut self) -> Vec<SentRecord> {
        std::mem::take(&mut self.outbox)
    }

    pub fn sent(&self) -> &[SentRecord] {
        &self.outbox
    }
}

impl Default for LocalTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LocalTransport {
    fn send(
        &mut self,
        connection: ConnectionId,
        payload: &[u8],
        class: ReliabilityClass,
    ) -> Result<Option<ReceiptId>, TransportError> {
        if self.fail_sends {
            return Err(TransportError::SendFailed {
                connection,
                bytes: payload.len(),
                reason: "local transport is failing sends".to_string(),
            });
        }
        let receipt = if class.has_receipt() {
            self.next_receipt = self.next_receipt.wrapping_add(1);
            Some(self.next_receipt)
        } else {
            None
        };
        self.outbox.push(SentRecord {
            connection,
            payload: payload.to_vec(),
            class,
            receipt,
        });
        Ok(receipt)
    }
}
