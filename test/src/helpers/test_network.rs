use log::debug;

use replicant_shared::{
    ConnectionId, Protocol, ReplicationConfig, ReplicationEvents, ReplicationManager,
};

use crate::LocalTransport;

/// Position of a peer in its TestNetwork
pub type PeerIndex = usize;

pub struct TestPeer {
    /// How every other peer addresses this one
    pub id: ConnectionId,
    pub manager: ReplicationManager,
    pub transport: LocalTransport,
}

/// A set of peers wired together through LocalTransports. Records stay in
/// the sender's outbox until `deliver` routes them, so tests control exactly
/// what arrives when.
pub struct TestNetwork {
    peers: Vec<TestPeer>,
    rng: fastrand::Rng,
    loss_rate: f64,
    /// Lose every unreliable record until cleared
    pub lose_unreliable: bool,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self::with_seed(0x5eed)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            peers: Vec::new(),
            rng: fastrand::Rng::with_seed(seed),
            loss_rate: 0.0,
            lose_unreliable: false,
        }
    }

    /// Fraction of unreliable records lost in transit. Reliable records are
    /// always delivered.
    pub fn set_loss_rate(&mut self, loss_rate: f64) {
        self.loss_rate = loss_rate;
    }

    pub fn add_peer(&mut self, config: ReplicationConfig, protocol: Protocol) -> PeerIndex {
        let index = self.peers.len();
        self.peers.push(TestPeer {
            id: ConnectionId::from_u64(index as u64 + 1),
            manager: ReplicationManager::new(config, protocol),
            transport: LocalTransport::new(),
        });
        index
    }

    pub fn peer(&self, index: PeerIndex) -> &TestPeer {
        &self.peers[index]
    }

    pub fn peer_mut(&mut self, index: PeerIndex) -> &mut TestPeer {
        &mut self.peers[index]
    }

    pub fn manager(&self, index: PeerIndex) -> &ReplicationManager {
        &self.peers[index].manager
    }

    pub fn manager_mut(&mut self, index: PeerIndex) -> &mut ReplicationManager {
        &mut self.peers[index].manager
    }

    pub fn id(&self, index: PeerIndex) -> ConnectionId {
        self.peers[index].id
    }

    /// Reports a connection to both peers. Takes effect on their next tick.
    pub fn connect(&mut self, a: PeerIndex, b: PeerIndex) {
        let (id_a, id_b) = (self.id(a), self.id(b));
        self.peers[a].manager.event_sender().connected(id_b).unwrap();
        self.peers[b].manager.event_sender().connected(id_a).unwrap();
    }

    /// Reports a dropped connection to both peers
    pub fn disconnect(&mut self, a: PeerIndex, b: PeerIndex) {
        let (id_a, id_b) = (self.id(a), self.id(b));
        self.peers[a].manager.event_sender().dropped(id_b).unwrap();
        self.peers[b].manager.event_sender().dropped(id_a).unwrap();
    }

    pub fn tick(&mut self, index: PeerIndex) -> ReplicationEvents {
        let peer = &mut self.peers[index];
        peer.manager.tick(&mut peer.transport)
    }

    /// Routes everything `index` has sent. Delivery and loss are reported
    /// back to the sender as receipt outcomes. Returns the number of records
    /// delivered.
    pub fn deliver(&mut self, index: PeerIndex) -> usize {
        let source = self.id(index);
        let sender = self.peers[index].manager.event_sender();
        let mut delivered = 0;

        for record in self.peers[index].transport.take_sent() {
            let lost = record.class.has_receipt()
                && (self.lose_unreliable || self.rng.f64() < self.loss_rate);
            if let Some(receipt) = record.receipt {
                sender
                    .receipt_resolved(record.connection, receipt, !lost)
                    .unwrap();
            }
            if lost {
                debug!("lost {:?} record from {} to {}", record.class, source, record.connection);
                continue;
            }
            let Some(target) = self.peers.iter().find(|peer| peer.id == record.connection) else {
                continue;
            };
            target
                .manager
                .event_sender()
                .received(source, record.payload)
                .unwrap();
            delivered += 1;
        }
        delivered
    }

    /// Ticks a peer and routes what it sent
    pub fn step(&mut self, index: PeerIndex) -> ReplicationEvents {
        let events = self.tick(index);
        self.deliver(index);
        events
    }

    /// Steps every peer once, in index order
    pub fn step_all(&mut self) -> Vec<ReplicationEvents> {
        (0..self.peers.len()).map(|index| self.step(index)).collect()
    }

    /// Steps every peer `rounds` times, dropping the events
    pub fn settle(&mut self, rounds: usize) {
        for _ in 0..rounds {
            self.step_all();
        }
    }
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self::new()
    }
}
