//! The proposal store trait.

use crate::record::{Proposal, ProposalId, Tally, VoteChoice, VoteDetails};
use crate::StoreError;
use tally_types::{Address, Timestamp, Weight};

/// Keyed storage for proposal records.
///
/// An id with no record is non-existent. Reads of a missing record through the
/// `*_or_default` helpers see a zero deadline, zero tallies and no ballots, so
/// callers can treat "absent" and "never voted on" uniformly.
///
/// Every mutating method is all-or-nothing: on error the record is unchanged.
pub trait ProposalStore {
    /// Get a proposal by id.
    fn get(&self, id: ProposalId) -> Result<&Proposal, StoreError>;

    /// Insert a new record. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn create(
        &mut self,
        id: ProposalId,
        title: String,
        creator: Address,
        deadline: Timestamp,
    ) -> Result<(), StoreError>;

    /// Mark `voter` as having voted `choice` and add `weight` to the matching
    /// tally. Abstaining ballots record the vote but add nothing.
    fn record_vote(
        &mut self,
        id: ProposalId,
        voter: &Address,
        choice: VoteChoice,
        weight: Weight,
    ) -> Result<(), StoreError>;

    /// Clear `voter`'s ballot and subtract `weight` from the tally matching
    /// their recorded choice. Returns the choice that was cleared.
    fn clear_vote(
        &mut self,
        id: ProposalId,
        voter: &Address,
        weight: Weight,
    ) -> Result<VoteChoice, StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deadline of `id`, or the epoch if no such record exists.
    fn deadline_or_default(&self, id: ProposalId) -> Timestamp {
        self.get(id).map(|p| p.deadline).unwrap_or(Timestamp::EPOCH)
    }

    fn tally_or_default(&self, id: ProposalId) -> Tally {
        self.get(id).map(Proposal::tally).unwrap_or_default()
    }

    fn vote_details_or_default(&self, id: ProposalId, voter: &Address) -> VoteDetails {
        self.get(id)
            .map(|p| p.vote_details(voter))
            .unwrap_or_default()
    }
}
