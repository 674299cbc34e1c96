//! In-memory proposal store.

use crate::proposal::ProposalStore;
use crate::record::{Proposal, ProposalId, VoteChoice, VoteDetails};
use crate::StoreError;
use std::collections::HashMap;
use tally_types::{Address, Timestamp, Weight};

/// A `HashMap`-backed [`ProposalStore`]. Records live for the lifetime of the
/// store and are never purged.
#[derive(Debug, Default)]
pub struct MemoryProposalStore {
    proposals: HashMap<ProposalId, Proposal>,
}

impl MemoryProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, ordered by id.
    pub fn iter_sorted(&self) -> Vec<&Proposal> {
        let mut all: Vec<_> = self.proposals.values().collect();
        all.sort_by_key(|p| p.id);
        all
    }

    fn get_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, StoreError> {
        self.proposals.get_mut(&id).ok_or(StoreError::NotFound(id))
    }
}

impl ProposalStore for MemoryProposalStore {
    fn get(&self, id: ProposalId) -> Result<&Proposal, StoreError> {
        self.proposals.get(&id).ok_or(StoreError::NotFound(id))
    }

    fn create(
        &mut self,
        id: ProposalId,
        title: String,
        creator: Address,
        deadline: Timestamp,
    ) -> Result<(), StoreError> {
        if self.proposals.contains_key(&id) {
            return Err(StoreError::Duplicate(id));
        }
        self.proposals
            .insert(id, Proposal::new(id, title, creator, deadline));
        Ok(())
    }

    fn record_vote(
        &mut self,
        id: ProposalId,
        voter: &Address,
        choice: VoteChoice,
        weight: Weight,
    ) -> Result<(), StoreError> {
        let proposal = self.get_mut(id)?;
        if let Some(tally) = proposal.weighted_tally_mut(choice) {
            *tally = tally
                .checked_add(weight)
                .ok_or(StoreError::TallyOverflow(id))?;
        }
        proposal.voters.insert(
            voter.clone(),
            VoteDetails {
                has_voted: true,
                choice,
            },
        );
        Ok(())
    }

    fn clear_vote(
        &mut self,
        id: ProposalId,
        voter: &Address,
        weight: Weight,
    ) -> Result<VoteChoice, StoreError> {
        let proposal = self.get_mut(id)?;
        let details = proposal.vote_details(voter);
        if !details.has_voted {
            return Err(StoreError::NoBallot {
                id,
                voter: voter.clone(),
            });
        }
        if let Some(tally) = proposal.weighted_tally_mut(details.choice) {
            *tally = tally
                .checked_sub(weight)
                .ok_or(StoreError::TallyUnderflow {
                    id,
                    tally: *tally,
                    weight,
                })?;
        }
        if let Some(entry) = proposal.voters.get_mut(voter) {
            entry.has_voted = false;
        }
        Ok(details.choice)
    }

    fn len(&self) -> usize {
        self.proposals.len()
    }
}
