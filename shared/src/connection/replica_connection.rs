use std::collections::{hash_map::Entry, HashMap};

use crate::{
    ConnectionId, ObjectHandle, OutgoingRecord, ReceiptId, ReceiptLedger, ReplicaChannel,
    ReplicaOrigin, ReplicaState, WireEntity,
};

/// Everything this peer knows about one remote peer: the lifecycle and
/// delta state of every object on it, and its outstanding receipts
pub struct Connection {
    id: ConnectionId,
    replicas: HashMap<ObjectHandle, ReplicaChannel>,
    // peer's handle -> local handle, for objects the peer constructed here
    remote_objects: HashMap<u64, ObjectHandle>,
    receipts: ReceiptLedger,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            replicas: HashMap::new(),
            remote_objects: HashMap::new(),
            receipts: ReceiptLedger::new(),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn channel(&self, handle: &ObjectHandle) -> Option<&ReplicaChannel> {
        self.replicas.get(handle)
    }

    pub fn channel_mut(&mut self, handle: &ObjectHandle) -> Option<&mut ReplicaChannel> {
        self.replicas.get_mut(handle)
    }

    /// Returns the pair's channel, creating an Absent one if needed
    pub fn channel_or_insert(
        &mut self,
        handle: ObjectHandle,
        variable_count: usize,
    ) -> &mut ReplicaChannel {
        self.replicas
            .entry(handle)
            .or_insert_with(|| ReplicaChannel::new(handle, variable_count))
    }

    pub fn state(&self, handle: &ObjectHandle) -> ReplicaState {
        self.replicas
            .get(handle)
            .map_or(ReplicaState::Absent, |channel| channel.state())
    }

    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.replicas.keys().copied().collect()
    }

    pub fn channels(&self) -> impl Iterator<Item = (&ObjectHandle, &ReplicaChannel)> {
        self.replicas.iter()
    }

    /// Finds the local object an incoming record refers to
    pub fn resolve_incoming(&self, entity: &WireEntity) -> Option<ObjectHandle> {
        match entity {
            WireEntity::Host(peer_id) => self.remote_objects.get(peer_id).copied(),
            WireEntity::Remote(local_id) => {
                let handle = ObjectHandle::from_u64(*local_id);
                self.replicas
                    .get(&handle)
                    .filter(|channel| channel.origin() == ReplicaOrigin::Local)
                    .map(|_| handle)
            }
        }
    }

    pub fn is_known_remote(&self, peer_id: u64) -> bool {
        self.remote_objects.contains_key(&peer_id)
    }

    /// Registers an object the peer constructed here. Returns false if the
    /// peer's handle is already in use on this connection.
    pub fn register_remote(&mut self, peer_id: u64, handle: ObjectHandle, variable_count: usize) -> bool {
        let Entry::Vacant(entry) = self.remote_objects.entry(peer_id) else {
            return false;
        };
        entry.insert(handle);
        self.replicas
            .insert(handle, ReplicaChannel::from_remote(peer_id, variable_count));
        true
    }

    /// Drops all bookkeeping for the pair
    pub fn remove_channel(&mut self, handle: &ObjectHandle) -> Option<ReplicaChannel> {
        let channel = self.replicas.remove(handle)?;
        if channel.origin() == ReplicaOrigin::Remote {
            self.remote_objects.remove(&channel.wire_entity().id());
        }
        self.receipts.forget_object(handle);
        Some(channel)
    }

    /// Commits a sent record to the pair's per-connection delta state
    pub fn commit_record(
        &mut self,
        handle: &ObjectHandle,
        record: &OutgoingRecord,
        receipt: Option<ReceiptId>,
    ) {
        let Some(channel) = self.replicas.get_mut(handle) else {
            return;
        };
        let tracker = channel.tracker_mut();
        match receipt {
            Some(receipt) => {
                for emission in &record.emissions {
                    tracker.record_unreliable(emission.index, emission.value.clone(), receipt);
                }
                self.receipts.register(receipt, *handle, &record.indices());
            }
            None => {
                for emission in &record.emissions {
                    tracker.record_reliable(emission.index, emission.value.clone());
                }
            }
        }
    }

    /// Applies a delivered/lost report. Returns how many variables it still covered.
    pub fn resolve_receipt(&mut self, receipt: ReceiptId, delivered: bool) -> usize {
        let Some(covered) = self.receipts.take(receipt) else {
            return 0;
        };
        let mut affected = 0;
        for (handle, index) in covered {
            let Some(channel) = self.replicas.get_mut(&handle) else {
                continue;
            };
            let tracker = channel.tracker_mut();
            let applied = if delivered {
                tracker.on_delivered(index, receipt)
            } else {
                tracker.on_lost(index, receipt)
            };
            if applied {
                affected += 1;
            }
        }
        affected
    }

    pub fn outstanding_receipts(&self) -> usize {
        self.receipts.len()
    }
}
