//! The two-slot proposal pipeline.
//!
//! The pipeline is an active slot plus one queued slot, each holding a
//! proposal id or [`NO_PROPOSAL`]. There is no scheduler: the slots are only
//! re-evaluated when a proposal is submitted or a vote is cast, by comparing
//! stored deadlines against the current time.
//!
//! Both planners here are pure. They decide the next slot contents and the
//! new deadline, and the engine commits the result only once every other
//! check in the same call has passed.

use serde::{Deserialize, Serialize};
use tally_store::{ProposalId, NO_PROPOSAL};
use tally_types::Timestamp;

use crate::GovernanceError;

/// Contents of the active and queued slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSlots {
    pub active: ProposalId,
    pub queued: ProposalId,
}

/// Deadlines of the proposals in each slot. An empty slot reads as the epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlotDeadlines {
    pub active: Timestamp,
    pub queued: Timestamp,
}

/// Which admission rule placed a new proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionCase {
    /// No active proposal: the new one opens immediately.
    Idle,
    /// Active still open: the new one queues behind it.
    ChainAfterActive,
    /// Active closed, queued open: the queued one is promoted and the new one
    /// queues behind the vacating active deadline.
    PromoteQueued,
    /// Both slots closed: the new one opens immediately and the queue is cleared.
    Restart,
}

/// Outcome of [`plan_admission`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Admission {
    pub case: AdmissionCase,
    pub deadline: Timestamp,
    pub slots: QueueSlots,
}

/// Decide where proposal `new_id` lands and what its deadline is.
///
/// The queue-full pre-check is the caller's job; this function only selects
/// among the four mutually exclusive cases.
pub fn plan_admission(
    slots: QueueSlots,
    deadlines: SlotDeadlines,
    new_id: ProposalId,
    now: Timestamp,
    period_secs: u64,
) -> Result<Admission, GovernanceError> {
    let after = |base: Timestamp| {
        base.checked_add_secs(period_secs)
            .ok_or(GovernanceError::Overflow)
    };

    let admission = if slots.active == NO_PROPOSAL {
        Admission {
            case: AdmissionCase::Idle,
            deadline: after(now)?,
            slots: QueueSlots {
                active: new_id,
                queued: slots.queued,
            },
        }
    } else if !deadlines.active.has_passed(now) {
        Admission {
            case: AdmissionCase::ChainAfterActive,
            deadline: after(deadlines.active)?,
            slots: QueueSlots {
                active: slots.active,
                queued: new_id,
            },
        }
    } else if !deadlines.queued.has_passed(now) {
        // Chains onto the vacating active deadline, not the promoted one's.
        Admission {
            case: AdmissionCase::PromoteQueued,
            deadline: after(deadlines.active)?,
            slots: QueueSlots {
                active: slots.queued,
                queued: new_id,
            },
        }
    } else {
        Admission {
            case: AdmissionCase::Restart,
            deadline: after(now)?,
            slots: QueueSlots {
                active: new_id,
                queued: NO_PROPOSAL,
            },
        }
    };
    Ok(admission)
}

/// Resolve which proposal a ballot cast at `now` applies to.
///
/// Returns the slots unchanged while the active proposal is open, promotes
/// the queued proposal once the active one has expired, and fails with
/// [`GovernanceError::VotingClosed`] when both have expired. An empty active
/// slot is the caller's job to reject.
pub fn plan_rotation(
    slots: QueueSlots,
    deadlines: SlotDeadlines,
    now: Timestamp,
) -> Result<QueueSlots, GovernanceError> {
    if !deadlines.active.has_passed(now) {
        return Ok(slots);
    }
    if deadlines.queued.has_passed(now) {
        return Err(GovernanceError::VotingClosed);
    }
    Ok(QueueSlots {
        active: slots.queued,
        queued: NO_PROPOSAL,
    })
}
