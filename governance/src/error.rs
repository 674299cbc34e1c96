use tally_store::{ProposalId, StoreError};
use tally_types::{Address, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("proposal {0} not found")]
    NotFound(ProposalId),

    #[error("{0} holds no membership tokens")]
    NotAMember(Address),

    #[error("queue is full: proposal {queued} is open until {deadline}")]
    QueueFull {
        queued: ProposalId,
        deadline: Timestamp,
    },

    #[error("there is no active proposal")]
    NoActiveProposal,

    #[error("{voter} has already voted on proposal {proposal}")]
    AlreadyVoted {
        voter: Address,
        proposal: ProposalId,
    },

    #[error("invalid vote choice {0}: expected 0 (against), 1 (for) or 2 (abstain)")]
    InvalidChoice(u8),

    #[error("{0} is not the membership token")]
    Unauthorized(Address),

    #[error("{voter} has not voted on proposal {proposal}")]
    HasNotVoted {
        voter: Address,
        proposal: ProposalId,
    },

    #[error("voting on proposal {proposal} is open until {deadline}")]
    VotingStillOpen {
        proposal: ProposalId,
        deadline: Timestamp,
    },

    #[error("voting closed: both the active and queued proposals have expired")]
    VotingClosed,

    #[error("arithmetic overflow computing a deadline or proposal id")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(String),
}
