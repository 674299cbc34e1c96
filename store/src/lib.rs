//! Proposal storage for the tally governance workspace.
//!
//! The store is a pure keyed record store: it knows how to create a record,
//! apply a ballot to it and strip a ballot from it, but it holds no queue or
//! admission policy. The rest of the workspace depends only on the
//! [`ProposalStore`] trait.

pub mod error;
pub mod memory;
pub mod proposal;
pub mod record;

pub use error::StoreError;
pub use memory::MemoryProposalStore;
pub use proposal::ProposalStore;
pub use record::{Proposal, ProposalId, Tally, VoteChoice, VoteDetails, NO_PROPOSAL};
