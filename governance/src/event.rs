//! Notifications emitted by the queue engine.

use serde::Serialize;
use tally_store::ProposalId;
use tally_types::{Address, Timestamp, Weight};

/// Governance events that observers can subscribe to via the [`EventBus`].
///
/// Events are a side channel: nothing in the engine reads them back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GovernanceEvent {
    /// A proposal was admitted into the active or queued slot.
    ProposalCreated {
        id: ProposalId,
        title: String,
        deadline: Timestamp,
        creator: Address,
    },
    /// A ballot was recorded. `choice` is the raw value (0, 1 or 2).
    VoteCast {
        proposal_id: ProposalId,
        voter: Address,
        choice: u8,
        weight: Weight,
    },
    /// The membership token stripped a voter's ballot from the active proposal.
    VotesRemoved {
        voter: Address,
        choice: u8,
        weight: Weight,
    },
}

/// Synchronous fan-out event bus for governance events.
///
/// Listeners are invoked inline, after the emitting operation has committed.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
