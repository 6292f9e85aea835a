use crate::{
    ConstructionConfirmation, DeltaTracker, LifecycleError, ObjectHandle, ReplicaState,
    VariableIndex, WireEntity,
};

/// Which side sent the construction record for a replica
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicaOrigin {
    Local,
    Remote,
}

/// What the coordinator should do with a pair this tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Ask the construction hook, then send a construction record
    Construct,
    /// Send a destruction record
    Destroy,
    /// Run the serialization sessions
    Serialize,
    None,
}

/// Bookkeeping for one object on one connection
#[derive(Clone, Debug)]
pub struct ReplicaChannel {
    state: ReplicaState,
    origin: ReplicaOrigin,
    wire_entity: WireEntity,
    construction_sent: bool,
    rejected: bool,
    identical_primed: bool,
    tracker: DeltaTracker,
}

impl ReplicaChannel {
    /// A pair that has not been constructed yet
    pub fn new(handle: ObjectHandle, variable_count: usize) -> Self {
        Self {
            state: ReplicaState::Absent,
            origin: ReplicaOrigin::Local,
            wire_entity: WireEntity::Host(handle.to_u64()),
            construction_sent: false,
            rejected: false,
            identical_primed: false,
            tracker: DeltaTracker::new(variable_count),
        }
    }

    /// A pair created by an accepted construction from the peer, which named
    /// the object with its own handle `peer_id`
    pub fn from_remote(peer_id: u64, variable_count: usize) -> Self {
        Self {
            state: ReplicaState::Live,
            origin: ReplicaOrigin::Remote,
            wire_entity: WireEntity::Remote(peer_id),
            construction_sent: false,
            rejected: false,
            identical_primed: false,
            tracker: DeltaTracker::new(variable_count),
        }
    }

    pub fn state(&self) -> ReplicaState {
        self.state
    }

    pub fn origin(&self) -> ReplicaOrigin {
        self.origin
    }

    /// How this side names the object in records it writes
    pub fn wire_entity(&self) -> WireEntity {
        self.wire_entity
    }

    pub fn is_live(&self) -> bool {
        self.state == ReplicaState::Live
    }

    pub fn was_rejected(&self) -> bool {
        self.rejected
    }

    pub fn tracker(&self) -> &DeltaTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DeltaTracker {
        &mut self.tracker
    }

    pub fn is_identical_primed(&self) -> bool {
        self.identical_primed
    }

    pub fn set_identical_primed(&mut self, primed: bool) {
        self.identical_primed = primed;
    }

    /// Decides the next step for this pair. `object_destroyed` is set once the
    /// local object has been destroyed.
    pub fn next_action(&self, object_destroyed: bool) -> LifecycleAction {
        if object_destroyed {
            return match self.state {
                ReplicaState::Live | ReplicaState::DestructionPending => LifecycleAction::Destroy,
                ReplicaState::ConstructionPending if self.construction_sent => {
                    LifecycleAction::Destroy
                }
                _ => LifecycleAction::None,
            };
        }
        match self.state {
            ReplicaState::Absent if !self.rejected => LifecycleAction::Construct,
            ReplicaState::ConstructionPending if !self.construction_sent => {
                LifecycleAction::Construct
            }
            ReplicaState::Live => LifecycleAction::Serialize,
            ReplicaState::DestructionPending => LifecycleAction::Destroy,
            _ => LifecycleAction::None,
        }
    }

    // Construction

    /// Absent -> ConstructionPending, once the construction hook said yes
    pub fn begin_construction(&mut self) -> Result<(), LifecycleError> {
        self.expect(ReplicaState::Absent, "begin construction of")?;
        self.state = ReplicaState::ConstructionPending;
        self.origin = ReplicaOrigin::Local;
        self.construction_sent = false;
        Ok(())
    }

    /// The construction record went out
    pub fn mark_construction_sent(
        &mut self,
        confirmation: ConstructionConfirmation,
    ) -> Result<(), LifecycleError> {
        self.expect(ReplicaState::ConstructionPending, "send construction of")?;
        self.construction_sent = true;
        if confirmation == ConstructionConfirmation::Optimistic {
            self.state = ReplicaState::Live;
        }
        Ok(())
    }

    /// The construction record could not be sent, the pair is retried next tick
    pub fn abort_construction(&mut self) {
        if self.state == ReplicaState::ConstructionPending && !self.construction_sent {
            self.state = ReplicaState::Absent;
        }
    }

    /// The peer accepted our construction. Returns true if the pair just went Live.
    pub fn on_accepted(&mut self, unreliable: &[VariableIndex]) -> Result<bool, LifecycleError> {
        if self.origin != ReplicaOrigin::Local {
            return Err(LifecycleError::InvalidTransition {
                operation: "accept a remotely constructed",
                state: self.state,
            });
        }
        match self.state {
            ReplicaState::ConstructionPending if self.construction_sent => {
                self.state = ReplicaState::Live;
                Ok(true)
            }
            ReplicaState::Live => {
                // unreliable sends may have arrived before the replica existed
                self.tracker.reset(unreliable);
                Ok(false)
            }
            state => Err(LifecycleError::InvalidTransition {
                operation: "accept",
                state,
            }),
        }
    }

    /// The peer rejected our construction. The pair stays Absent until a
    /// new construction decision is requested.
    pub fn on_rejected(&mut self) -> Result<(), LifecycleError> {
        if self.origin != ReplicaOrigin::Local || !self.construction_sent {
            return Err(LifecycleError::InvalidTransition {
                operation: "reject",
                state: self.state,
            });
        }
        match self.state {
            ReplicaState::ConstructionPending | ReplicaState::Live => {
                self.reset_to_absent();
                self.rejected = true;
                Ok(())
            }
            state => Err(LifecycleError::InvalidTransition {
                operation: "reject",
                state,
            }),
        }
    }

    /// The peer discarded a replica it does not own. Parks the pair like a
    /// rejection so it is not constructed again straight away.
    pub fn park(&mut self) {
        self.reset_to_absent();
        self.rejected = true;
    }

    /// Clears a rejection so the construction hook is asked again
    pub fn reconsider(&mut self) {
        self.rejected = false;
    }

    // Destruction

    /// Marks the pair for destruction. Returns the state it ends up in:
    /// pairs the peer never heard of go straight to Gone.
    pub fn begin_destruction(&mut self) -> ReplicaState {
        self.state = match self.state {
            ReplicaState::Live | ReplicaState::DestructionPending => {
                ReplicaState::DestructionPending
            }
            ReplicaState::ConstructionPending if self.construction_sent => {
                ReplicaState::DestructionPending
            }
            _ => ReplicaState::Gone,
        };
        self.state
    }

    /// The destruction record went out
    pub fn mark_destruction_sent(&mut self) -> Result<(), LifecycleError> {
        self.expect(ReplicaState::DestructionPending, "send destruction of")?;
        self.state = ReplicaState::Gone;
        Ok(())
    }

    /// The peer destroyed the replica
    pub fn remote_destroyed(&mut self) {
        self.state = ReplicaState::Gone;
    }

    fn reset_to_absent(&mut self) {
        self.state = ReplicaState::Absent;
        self.construction_sent = false;
        self.identical_primed = false;
        let count = self.tracker.len();
        self.tracker = DeltaTracker::new(count);
    }

    fn expect(&self, state: ReplicaState, operation: &'static str) -> Result<(), LifecycleError> {
        if self.state != state {
            return Err(LifecycleError::InvalidTransition {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }
}
