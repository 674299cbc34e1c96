use crate::record::ProposalId;
use tally_types::{Address, Weight};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("proposal {0} already exists")]
    Duplicate(ProposalId),

    #[error("{voter} has no recorded ballot on proposal {id}")]
    NoBallot { id: ProposalId, voter: Address },

    #[error("tally overflow on proposal {0}")]
    TallyOverflow(ProposalId),

    #[error("tally underflow on proposal {id}: cannot subtract {weight} from {tally}")]
    TallyUnderflow {
        id: ProposalId,
        tally: Weight,
        weight: Weight,
    },
}
