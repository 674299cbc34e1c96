//! Deterministic replay of governance scripts.
//!
//! A script is a TOML document with an optional initial balance table and an
//! ordered list of steps. Each step may move the clock forward to an absolute
//! time (`at`) before running one operation against a fresh engine backed by
//! nullable infrastructure.
//!
//! ```toml
//! [[balances]]
//! holder = "alice"
//! amount = 50
//!
//! [[step]]
//! at = 0
//! op = "propose"
//! caller = "alice"
//! title = "A"
//! ```

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_governance::{
    GovernanceConfig, GovernanceError, GovernanceEvent, ProposalInfo, QueueEngine,
};
use tally_nullables::{NullBalances, NullClock, NullEventLog};
use tally_store::{MemoryProposalStore, ProposalId};
use tally_types::{Address, Clock, Timestamp};
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub balances: Vec<Balance>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub struct Balance {
    pub holder: String,
    pub amount: u64,
}

#[derive(Debug, Deserialize)]
pub struct Step {
    /// Absolute time to move the clock to before running the step.
    pub at: Option<u64>,

    #[serde(flatten)]
    pub action: Action,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    SetBalance { holder: String, amount: u64 },
    Propose { caller: String, title: String },
    Vote { caller: String, choice: u8 },
    RemoveVotes { caller: String, voter: String },
    Result { id: ProposalId },
    Proposal { id: ProposalId },
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Self::SetBalance { .. } => "set_balance",
            Self::Propose { .. } => "propose",
            Self::Vote { .. } => "vote",
            Self::RemoveVotes { .. } => "remove_votes",
            Self::Result { .. } => "result",
            Self::Proposal { .. } => "proposal",
        }
    }
}

impl Script {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("failed to parse replay script")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}

/// One line of replay output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Output {
    Event {
        step: usize,
        at: Timestamp,
        event: GovernanceEvent,
    },
    Result {
        step: usize,
        at: Timestamp,
        id: ProposalId,
        passed: bool,
    },
    Proposal {
        step: usize,
        at: Timestamp,
        proposal: ProposalInfo,
        status: String,
    },
    Rejected {
        step: usize,
        at: Timestamp,
        op: &'static str,
        error: String,
    },
}

type ReplayEngine = QueueEngine<MemoryProposalStore, NullBalances, NullClock>;

pub struct Replay {
    engine: ReplayEngine,
    balances: NullBalances,
    clock: NullClock,
    events: NullEventLog<GovernanceEvent>,
}

impl Replay {
    pub fn new(config: GovernanceConfig) -> anyhow::Result<Self> {
        let balances = NullBalances::new();
        let clock = NullClock::new(0);
        let events = NullEventLog::<GovernanceEvent>::new();
        let mut engine = QueueEngine::new(
            config,
            MemoryProposalStore::new(),
            balances.clone(),
            clock.clone(),
        )?;
        engine.subscribe(events.listener());
        Ok(Self {
            engine,
            balances,
            clock,
            events,
        })
    }

    /// Run every step in order.
    ///
    /// Rejected operations become [`Output::Rejected`] lines, or abort the
    /// replay when `strict` is set. A step whose `at` lies before the current
    /// clock always aborts.
    pub fn run(&mut self, script: &Script, strict: bool) -> anyhow::Result<Vec<Output>> {
        for balance in &script.balances {
            self.balances
                .set(balance.holder.as_str(), u128::from(balance.amount));
        }
        debug!(holders = self.balances.holder_count(), "balances seeded");

        let mut out = Vec::new();
        for (step, Step { at, action }) in script.steps.iter().enumerate() {
            if let Some(at) = *at {
                let now = self.clock.now().as_secs();
                if at < now {
                    bail!("step {step}: time {at} is before the current time {now}");
                }
                self.clock.set(at);
            }
            let at = self.clock.now();

            match self.apply(step, action) {
                Ok(Some(line)) => out.push(line),
                Ok(None) => {}
                Err(e) if strict => {
                    return Err(e).with_context(|| format!("step {step} ({})", action.name()));
                }
                Err(e) => {
                    warn!(step, op = action.name(), error = %e, "step rejected");
                    out.push(Output::Rejected {
                        step,
                        at,
                        op: action.name(),
                        error: e.to_string(),
                    });
                }
            }
            out.extend(
                self.events
                    .take()
                    .into_iter()
                    .map(|event| Output::Event { step, at, event }),
            );
        }

        info!(
            steps = script.steps.len(),
            proposals = self.engine.proposal_count(),
            active = self.engine.active_id(),
            queued = self.engine.queued_id(),
            "replay finished"
        );
        Ok(out)
    }

    fn apply(&mut self, step: usize, action: &Action) -> Result<Option<Output>, GovernanceError> {
        let at = self.clock.now();
        match action {
            Action::SetBalance { holder, amount } => {
                self.balances.set(holder.as_str(), u128::from(*amount));
                Ok(None)
            }
            Action::Propose { caller, title } => {
                self.engine.propose(&Address::new(caller.as_str()), title.as_str())?;
                Ok(None)
            }
            Action::Vote { caller, choice } => {
                self.engine.vote(&Address::new(caller.as_str()), *choice)?;
                Ok(None)
            }
            Action::RemoveVotes { caller, voter } => {
                self.engine.remove_votes(
                    &Address::new(caller.as_str()),
                    &Address::new(voter.as_str()),
                )?;
                Ok(None)
            }
            Action::Result { id } => {
                let passed = self.engine.get_result(*id)?;
                Ok(Some(Output::Result {
                    step,
                    at,
                    id: *id,
                    passed,
                }))
            }
            Action::Proposal { id } => {
                let proposal = self.engine.get_proposal(*id)?;
                let status = tally_utils::describe_deadline(proposal.deadline, at);
                Ok(Some(Output::Proposal {
                    step,
                    at,
                    proposal,
                    status,
                }))
            }
        }
    }
}
