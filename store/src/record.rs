//! Proposal records and ballots.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_types::{Address, Timestamp, Weight};

/// Proposal identifier. Assigned from a counter starting at 1.
pub type ProposalId = u64;

/// Reserved identifier meaning "no proposal in this slot".
pub const NO_PROPOSAL: ProposalId = 0;

/// A ballot choice. The raw wire values are `0`, `1` and `2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    #[default]
    Against,
    For,
    Abstaining,
}

impl VoteChoice {
    /// Decode a raw choice value; anything outside `0..=2` is rejected.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Against),
            1 => Some(Self::For),
            2 => Some(Self::Abstaining),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> u8 {
        match self {
            Self::Against => 0,
            Self::For => 1,
            Self::Abstaining => 2,
        }
    }

    /// Whether this choice moves a tally. Abstaining is recorded but weightless.
    pub fn is_weighted(&self) -> bool {
        !matches!(self, Self::Abstaining)
    }
}

/// A voter's ballot on one proposal.
///
/// Entries are never deleted; removal only clears `has_voted` and leaves the
/// last choice in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteDetails {
    pub has_voted: bool,
    pub choice: VoteChoice,
}

/// Running vote totals for a proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub votes_for: Weight,
    pub votes_against: Weight,
}

impl Tally {
    /// Strict majority: a tie, including zero to zero, does not pass.
    pub fn passed(&self) -> bool {
        self.votes_for > self.votes_against
    }
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub creator: Address,
    /// Voting closes once `now >= deadline`. Assigned once at creation.
    pub deadline: Timestamp,
    pub votes_for: Weight,
    pub votes_against: Weight,
    pub voters: HashMap<Address, VoteDetails>,
}

impl Proposal {
    pub fn new(id: ProposalId, title: String, creator: Address, deadline: Timestamp) -> Self {
        Self {
            id,
            title,
            creator,
            deadline,
            votes_for: 0,
            votes_against: 0,
            voters: HashMap::new(),
        }
    }

    pub fn tally(&self) -> Tally {
        Tally {
            votes_for: self.votes_for,
            votes_against: self.votes_against,
        }
    }

    /// The voter's ballot, or the unset default if they never voted.
    pub fn vote_details(&self, voter: &Address) -> VoteDetails {
        self.voters.get(voter).copied().unwrap_or_default()
    }

    pub fn is_open(&self, now: Timestamp) -> bool {
        !self.deadline.has_passed(now)
    }

    /// The running total moved by `choice`; `None` for a weightless choice.
    pub(crate) fn weighted_tally_mut(&mut self, choice: VoteChoice) -> Option<&mut Weight> {
        if !choice.is_weighted() {
            return None;
        }
        Some(match choice {
            VoteChoice::For => &mut self.votes_for,
            _ => &mut self.votes_against,
        })
    }
}
