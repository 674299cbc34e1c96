//! Public view of a stored proposal.

use serde::Serialize;
use tally_store::{Proposal, ProposalId};
use tally_types::{Address, Timestamp};

/// The immutable fields of a proposal, as returned by
/// [`QueueEngine::get_proposal`](crate::QueueEngine::get_proposal).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProposalInfo {
    pub id: ProposalId,
    pub title: String,
    pub deadline: Timestamp,
    pub creator: Address,
}

impl From<&Proposal> for ProposalInfo {
    fn from(p: &Proposal) -> Self {
        Self {
            id: p.id,
            title: p.title.clone(),
            deadline: p.deadline,
            creator: p.creator.clone(),
        }
    }
}
