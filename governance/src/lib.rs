//! Token-weighted governance with a two-slot proposal queue.
//!
//! Holders of a membership token submit proposals and cast ballots weighted by
//! their live token balance. One proposal is active at a time; a second may be
//! queued to open as soon as the active one closes. Queue rotation is lazy:
//! it happens inside [`QueueEngine::propose`] and [`QueueEngine::vote`] by
//! comparing stored deadlines against the clock.
//!
//! Key principle: weight is read from the oracle at the moment of each call,
//! never snapshotted. Removing a ballot subtracts the voter's *current*
//! balance, so a balance change between casting and removal leaves the tally
//! drifted by the difference.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod proposal;
pub mod queue;

pub use config::{GovernanceConfig, DEFAULT_VOTING_PERIOD_SECS};
pub use engine::QueueEngine;
pub use error::GovernanceError;
pub use event::{EventBus, GovernanceEvent};
pub use proposal::ProposalInfo;
pub use queue::{plan_admission, plan_rotation, Admission, AdmissionCase, QueueSlots, SlotDeadlines};
