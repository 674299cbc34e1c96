//! Core governance engine: proposal admission, lazy rotation, weighted ballots.

use tally_store::{ProposalId, ProposalStore, Tally, VoteChoice, VoteDetails, NO_PROPOSAL};
use tally_types::{Address, Clock, Timestamp, Weight, WeightOracle};
use tracing::{debug, info};

use crate::config::GovernanceConfig;
use crate::error::GovernanceError;
use crate::event::{EventBus, GovernanceEvent};
use crate::proposal::ProposalInfo;
use crate::queue::{plan_admission, plan_rotation, QueueSlots, SlotDeadlines};

/// The queue engine. Owns the two-slot pipeline and the proposal counter.
///
/// Every mutating call is all-or-nothing: each check runs (and every planned
/// slot change is computed) before the store or the slots are written, so a
/// rejected call leaves the engine exactly as it was.
pub struct QueueEngine<S, O, C> {
    config: GovernanceConfig,
    store: S,
    oracle: O,
    clock: C,
    slots: QueueSlots,
    proposal_count: u64,
    events: EventBus,
}

impl<S, O, C> QueueEngine<S, O, C>
where
    S: ProposalStore,
    O: WeightOracle,
    C: Clock,
{
    /// Build an engine over an empty store.
    pub fn new(
        config: GovernanceConfig,
        store: S,
        oracle: O,
        clock: C,
    ) -> Result<Self, GovernanceError> {
        config.validate()?;
        if !store.is_empty() {
            return Err(GovernanceError::Config(
                "proposal store must be empty at construction".into(),
            ));
        }
        info!(
            token = %config.token_address,
            voting_period_secs = config.voting_period_secs,
            "governance queue initialised"
        );
        Ok(Self {
            config,
            store,
            oracle,
            clock,
            slots: QueueSlots::default(),
            proposal_count: 0,
            events: EventBus::new(),
        })
    }

    /// Register a listener for every event emitted from now on.
    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.events.subscribe(listener);
        debug!(listeners = self.events.listener_count(), "event listener subscribed");
    }

    /// Submit a new proposal. Returns its id.
    pub fn propose(
        &mut self,
        caller: &Address,
        title: impl Into<String>,
    ) -> Result<ProposalId, GovernanceError> {
        let now = self.clock.now();
        self.member_weight(caller)?;

        let deadlines = self.slot_deadlines();
        if !deadlines.queued.has_passed(now) {
            debug!(%caller, queued = self.slots.queued, "proposal rejected: queue full");
            return Err(GovernanceError::QueueFull {
                queued: self.slots.queued,
                deadline: deadlines.queued,
            });
        }

        let id = self
            .proposal_count
            .checked_add(1)
            .ok_or(GovernanceError::Overflow)?;
        let admission =
            plan_admission(self.slots, deadlines, id, now, self.config.voting_period_secs)?;

        let title = title.into();
        self.store
            .create(id, title.clone(), caller.clone(), admission.deadline)?;
        self.slots = admission.slots;
        self.proposal_count = id;

        info!(
            id,
            case = ?admission.case,
            deadline = %admission.deadline,
            active = self.slots.active,
            queued = self.slots.queued,
            %caller,
            "proposal admitted"
        );
        self.events.emit(&GovernanceEvent::ProposalCreated {
            id,
            title,
            deadline: admission.deadline,
            creator: caller.clone(),
        });
        Ok(id)
    }

    /// Title, deadline and creator of a stored proposal.
    ///
    /// A record without a creator does not exist.
    pub fn get_proposal(&self, id: ProposalId) -> Result<ProposalInfo, GovernanceError> {
        match self.store.get(id) {
            Ok(proposal) if !proposal.creator.is_unset() => Ok(ProposalInfo::from(proposal)),
            _ => Err(GovernanceError::NotFound(id)),
        }
    }

    /// Cast a ballot on the active proposal, rotating the queue first if the
    /// active proposal has expired.
    ///
    /// `choice` is the raw value: 0 against, 1 for, 2 abstain.
    pub fn vote(&mut self, caller: &Address, choice: u8) -> Result<(), GovernanceError> {
        let now = self.clock.now();
        let weight = self.member_weight(caller)?;
        if self.slots.active == NO_PROPOSAL {
            return Err(GovernanceError::NoActiveProposal);
        }

        let resolved = plan_rotation(self.slots, self.slot_deadlines(), now)?;
        let target = resolved.active;

        if self.store.vote_details_or_default(target, caller).has_voted {
            debug!(%caller, proposal = target, "vote rejected: already voted");
            return Err(GovernanceError::AlreadyVoted {
                voter: caller.clone(),
                proposal: target,
            });
        }
        let parsed =
            VoteChoice::from_raw(choice).ok_or(GovernanceError::InvalidChoice(choice))?;

        self.store.record_vote(target, caller, parsed, weight)?;
        if resolved != self.slots {
            info!(
                expired = self.slots.active,
                active = resolved.active,
                "queued proposal rotated into the active slot"
            );
            self.slots = resolved;
        }

        info!(proposal = target, voter = %caller, choice, weight, "vote cast");
        self.events.emit(&GovernanceEvent::VoteCast {
            proposal_id: target,
            voter: caller.clone(),
            choice,
            weight,
        });
        Ok(())
    }

    /// Strip `voter`'s ballot from the proposal in the active slot.
    ///
    /// Only the membership token may call this. No rotation happens and the
    /// active proposal's own expiry is not checked. The weight subtracted is
    /// the voter's balance *now*, which can differ from the weight added when
    /// the ballot was cast.
    pub fn remove_votes(
        &mut self,
        caller: &Address,
        voter: &Address,
    ) -> Result<(), GovernanceError> {
        if *caller != self.config.token_address {
            debug!(%caller, "vote removal rejected: caller is not the token");
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }
        let target = self.slots.active;
        if !self.store.vote_details_or_default(target, voter).has_voted {
            return Err(GovernanceError::HasNotVoted {
                voter: voter.clone(),
                proposal: target,
            });
        }

        let weight = self.oracle.balance_of(voter);
        let cleared = self.store.clear_vote(target, voter, weight)?;

        info!(proposal = target, %voter, choice = cleared.as_raw(), weight, "votes removed");
        self.events.emit(&GovernanceEvent::VotesRemoved {
            voter: voter.clone(),
            choice: cleared.as_raw(),
            weight,
        });
        Ok(())
    }

    /// Whether a proposal passed (strict majority of weight for).
    ///
    /// Any id can be queried once its deadline has passed; an id with no
    /// record has a zero deadline and always reports `false`.
    pub fn get_result(&self, id: ProposalId) -> Result<bool, GovernanceError> {
        let now = self.clock.now();
        let deadline = self.store.deadline_or_default(id);
        if !deadline.has_passed(now) {
            return Err(GovernanceError::VotingStillOpen {
                proposal: id,
                deadline,
            });
        }
        Ok(self.store.tally_or_default(id).passed())
    }

    pub fn active_id(&self) -> ProposalId {
        self.slots.active
    }

    pub fn queued_id(&self) -> ProposalId {
        self.slots.queued
    }

    pub fn slots(&self) -> QueueSlots {
        self.slots
    }

    /// Number of proposals ever admitted; also the id of the latest one.
    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    pub fn tally(&self, id: ProposalId) -> Tally {
        self.store.tally_or_default(id)
    }

    pub fn vote_details(&self, id: ProposalId, voter: &Address) -> VoteDetails {
        self.store.vote_details_or_default(id, voter)
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn member_weight(&self, caller: &Address) -> Result<Weight, GovernanceError> {
        if caller.is_unset() {
            debug!("rejected: caller identity is unset");
            return Err(GovernanceError::NotAMember(caller.clone()));
        }
        match self.oracle.balance_of(caller) {
            0 => {
                debug!(%caller, "rejected: caller holds no membership tokens");
                Err(GovernanceError::NotAMember(caller.clone()))
            }
            weight => Ok(weight),
        }
    }

    fn slot_deadlines(&self) -> SlotDeadlines {
        SlotDeadlines {
            active: self.store.deadline_or_default(self.slots.active),
            queued: self.store.deadline_or_default(self.slots.queued),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_nullables::{NullBalances, NullClock, NullEventLog};
    use tally_store::{MemoryProposalStore, StoreError};

    const PERIOD: u64 = 1000;
    const TOKEN: &str = "token";

    type Engine = QueueEngine<MemoryProposalStore, NullBalances, NullClock>;

    fn addr(name: &str) -> Address {
        Address::new(name)
    }

    fn make_engine() -> (Engine, NullBalances, NullClock) {
        let balances =
            NullBalances::with_balances([("alice", 50), ("bob", 20), ("carol", 5)]);
        let clock = NullClock::new(0);
        let engine = QueueEngine::new(
            GovernanceConfig::new(TOKEN, PERIOD),
            MemoryProposalStore::new(),
            balances.clone(),
            clock.clone(),
        )
        .unwrap();
        (engine, balances, clock)
    }

    #[test]
    fn first_proposal_becomes_active() {
        let (mut engine, _, _) = make_engine();
        let id = engine.propose(&addr("alice"), "A").unwrap();
        assert_eq!(id, 1);
        assert_eq!(engine.active_id(), 1);
        assert_eq!(engine.queued_id(), NO_PROPOSAL);
        let info = engine.get_proposal(1).unwrap();
        assert_eq!(info.title, "A");
        assert_eq!(info.deadline, Timestamp::new(1000));
        assert_eq!(info.creator, addr("alice"));
    }

    #[test]
    fn non_member_cannot_propose_or_vote() {
        let (mut engine, _, _) = make_engine();
        assert_eq!(
            engine.propose(&addr("mallory"), "X").unwrap_err(),
            GovernanceError::NotAMember(addr("mallory"))
        );
        engine.propose(&addr("alice"), "A").unwrap();
        assert_eq!(
            engine.vote(&addr("mallory"), 1).unwrap_err(),
            GovernanceError::NotAMember(addr("mallory"))
        );
        assert_eq!(engine.proposal_count(), 1);
    }

    #[test]
    fn unset_identity_cannot_create_a_proposal() {
        let (mut engine, balances, _) = make_engine();
        balances.set("", 10);
        assert_eq!(
            engine.propose(&Address::default(), "ghost").unwrap_err(),
            GovernanceError::NotAMember(Address::default())
        );
        assert_eq!(engine.proposal_count(), 0);
        assert_eq!(engine.active_id(), NO_PROPOSAL);
        assert_eq!(engine.get_proposal(1).unwrap_err(), GovernanceError::NotFound(1));

        engine.propose(&addr("alice"), "A").unwrap();
        assert_eq!(
            engine.vote(&Address::default(), 1).unwrap_err(),
            GovernanceError::NotAMember(Address::default())
        );
        assert_eq!(engine.tally(1).votes_for, 0);
    }

    #[test]
    fn third_proposal_while_queue_full_is_rejected() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        clock.set(100);
        assert_eq!(engine.propose(&addr("bob"), "B").unwrap(), 2);
        assert_eq!(engine.get_proposal(2).unwrap().deadline, Timestamp::new(2000));
        clock.set(150);
        let err = engine.propose(&addr("carol"), "C").unwrap_err();
        assert_eq!(
            err,
            GovernanceError::QueueFull {
                queued: 2,
                deadline: Timestamp::new(2000)
            }
        );
        assert_eq!(engine.proposal_count(), 2);
        assert_eq!(engine.get_proposal(3).unwrap_err(), GovernanceError::NotFound(3));
    }

    #[test]
    fn queue_full_holds_even_after_active_expires() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.propose(&addr("alice"), "B").unwrap();
        clock.set(1500);
        assert!(matches!(
            engine.propose(&addr("alice"), "C"),
            Err(GovernanceError::QueueFull { queued: 2, .. })
        ));
    }

    #[test]
    fn proposal_after_everything_expires_restarts_the_pipeline() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.propose(&addr("alice"), "B").unwrap();
        clock.set(2000);
        let id = engine.propose(&addr("bob"), "C").unwrap();
        assert_eq!(id, 3);
        assert_eq!(engine.active_id(), 3);
        assert_eq!(engine.queued_id(), NO_PROPOSAL);
        assert_eq!(engine.get_proposal(3).unwrap().deadline, Timestamp::new(3000));
    }

    #[test]
    fn vote_without_active_proposal_fails() {
        let (mut engine, _, _) = make_engine();
        assert_eq!(
            engine.vote(&addr("alice"), 1).unwrap_err(),
            GovernanceError::NoActiveProposal
        );
    }

    #[test]
    fn vote_adds_live_weight() {
        let (mut engine, balances, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("alice"), 1).unwrap();
        balances.set("bob", 35);
        engine.vote(&addr("bob"), 0).unwrap();
        let tally = engine.tally(1);
        assert_eq!(tally.votes_for, 50);
        assert_eq!(tally.votes_against, 35);
    }

    #[test]
    fn second_vote_is_rejected_without_changing_tally() {
        let (mut engine, _, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("alice"), 1).unwrap();
        assert_eq!(
            engine.vote(&addr("alice"), 0).unwrap_err(),
            GovernanceError::AlreadyVoted {
                voter: addr("alice"),
                proposal: 1
            }
        );
        assert_eq!(engine.tally(1).votes_for, 50);
        assert_eq!(engine.tally(1).votes_against, 0);
    }

    #[test]
    fn already_voted_is_checked_before_choice() {
        let (mut engine, _, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("alice"), 1).unwrap();
        assert!(matches!(
            engine.vote(&addr("alice"), 9),
            Err(GovernanceError::AlreadyVoted { .. })
        ));
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let (mut engine, _, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        assert_eq!(
            engine.vote(&addr("bob"), 3).unwrap_err(),
            GovernanceError::InvalidChoice(3)
        );
        assert!(!engine.vote_details(1, &addr("bob")).has_voted);
    }

    #[test]
    fn abstaining_records_vote_without_weight() {
        let (mut engine, _, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("bob"), 2).unwrap();
        let details = engine.vote_details(1, &addr("bob"));
        assert!(details.has_voted);
        assert_eq!(details.choice, VoteChoice::Abstaining);
        assert_eq!(engine.tally(1), Tally::default());
    }

    #[test]
    fn vote_rotates_expired_active_into_queued() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("bob"), 1).unwrap();
        clock.set(100);
        engine.propose(&addr("alice"), "B").unwrap();
        clock.set(1500);
        engine.vote(&addr("alice"), 1).unwrap();
        assert_eq!(engine.active_id(), 2);
        assert_eq!(engine.queued_id(), NO_PROPOSAL);
        assert_eq!(engine.tally(2).votes_for, 50);
        assert_eq!(engine.tally(1).votes_for, 20);
        assert!(engine.get_result(1).unwrap());
    }

    #[test]
    fn failed_vote_after_expiry_does_not_rotate() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.propose(&addr("alice"), "B").unwrap();
        clock.set(1500);
        assert!(engine.vote(&addr("alice"), 7).is_err());
        assert_eq!(engine.active_id(), 1);
        assert_eq!(engine.queued_id(), 2);
    }

    #[test]
    fn vote_after_both_slots_expire_is_closed() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        clock.set(1000);
        assert_eq!(
            engine.vote(&addr("alice"), 1).unwrap_err(),
            GovernanceError::VotingClosed
        );
        assert_eq!(engine.active_id(), 1);
    }

    #[test]
    fn removal_subtracts_current_balance_and_keeps_drift() {
        let (mut engine, balances, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("alice"), 1).unwrap();
        assert_eq!(engine.tally(1).votes_for, 50);
        balances.set("alice", 30);
        engine.remove_votes(&addr(TOKEN), &addr("alice")).unwrap();
        assert_eq!(engine.tally(1).votes_for, 20);
        assert!(!engine.vote_details(1, &addr("alice")).has_voted);
    }

    #[test]
    fn removal_requires_the_token() {
        let (mut engine, _, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("alice"), 1).unwrap();
        assert_eq!(
            engine.remove_votes(&addr("alice"), &addr("alice")).unwrap_err(),
            GovernanceError::Unauthorized(addr("alice"))
        );
        assert_eq!(engine.tally(1).votes_for, 50);
    }

    #[test]
    fn removal_without_ballot_fails() {
        let (mut engine, _, _) = make_engine();
        assert_eq!(
            engine.remove_votes(&addr(TOKEN), &addr("alice")).unwrap_err(),
            GovernanceError::HasNotVoted {
                voter: addr("alice"),
                proposal: NO_PROPOSAL
            }
        );
        engine.propose(&addr("alice"), "A").unwrap();
        assert!(matches!(
            engine.remove_votes(&addr(TOKEN), &addr("bob")),
            Err(GovernanceError::HasNotVoted { proposal: 1, .. })
        ));
    }

    #[test]
    fn removed_voter_can_vote_again() {
        let (mut engine, balances, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("bob"), 0).unwrap();
        balances.set("bob", 10);
        engine.remove_votes(&addr(TOKEN), &addr("bob")).unwrap();
        assert_eq!(engine.tally(1).votes_against, 10);
        engine.vote(&addr("bob"), 1).unwrap();
        assert_eq!(engine.tally(1).votes_for, 10);
    }

    #[test]
    fn removal_larger_than_tally_fails_atomically() {
        let (mut engine, balances, _) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("carol"), 0).unwrap();
        balances.set("carol", 500);
        let err = engine.remove_votes(&addr(TOKEN), &addr("carol")).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::Store(StoreError::TallyUnderflow { id: 1, .. })
        ));
        assert!(engine.vote_details(1, &addr("carol")).has_voted);
        assert_eq!(engine.tally(1).votes_against, 5);
    }

    #[test]
    fn result_is_unavailable_while_open() {
        let (mut engine, _, clock) = make_engine();
        engine.propose(&addr("alice"), "A").unwrap();
        clock.set(999);
        assert_eq!(
            engine.get_result(1).unwrap_err(),
            GovernanceError::VotingStillOpen {
                proposal: 1,
                deadline: Timestamp::new(1000)
            }
        );
        clock.set(1000);
        assert!(!engine.get_result(1).unwrap());
    }

    #[test]
    fn result_for_unknown_id_is_false() {
        let (engine, _, _) = make_engine();
        assert!(!engine.get_result(42).unwrap());
        assert!(!engine.get_result(NO_PROPOSAL).unwrap());
    }

    #[test]
    fn events_are_emitted_in_order() {
        let (mut engine, balances, _) = make_engine();
        let log = NullEventLog::<GovernanceEvent>::new();
        engine.subscribe(log.listener());

        engine.propose(&addr("alice"), "A").unwrap();
        engine.vote(&addr("bob"), 2).unwrap();
        balances.set("bob", 7);
        engine.remove_votes(&addr(TOKEN), &addr("bob")).unwrap();
        // rejected calls emit nothing
        let _ = engine.vote(&addr("mallory"), 1);

        assert_eq!(
            log.events(),
            vec![
                GovernanceEvent::ProposalCreated {
                    id: 1,
                    title: "A".into(),
                    deadline: Timestamp::new(1000),
                    creator: addr("alice"),
                },
                GovernanceEvent::VoteCast {
                    proposal_id: 1,
                    voter: addr("bob"),
                    choice: 2,
                    weight: 20,
                },
                GovernanceEvent::VotesRemoved {
                    voter: addr("bob"),
                    choice: 2,
                    weight: 7,
                },
            ]
        );
    }

    #[test]
    fn construction_rejects_bad_config_and_used_store() {
        let mut store = MemoryProposalStore::new();
        let err = QueueEngine::new(
            GovernanceConfig::new(TOKEN, 0),
            MemoryProposalStore::new(),
            NullBalances::new(),
            NullClock::new(0),
        )
        .err()
        .unwrap();
        assert!(matches!(err, GovernanceError::Config(_)));

        store
            .create(1, "old".into(), addr("alice"), Timestamp::new(1))
            .unwrap();
        let err = QueueEngine::new(
            GovernanceConfig::new(TOKEN, PERIOD),
            store,
            NullBalances::new(),
            NullClock::new(0),
        )
        .err()
        .unwrap();
        assert!(matches!(err, GovernanceError::Config(_)));
    }
}
