use clmm_keeper_domain::token::TokenId;
use clmm_keeper_domain::value_objects::{Action, TickRange};
use clmm_keeper_protocols::Settlement;
use serde::Serialize;
use std::fmt;

/// Where the control loop currently is within an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopPhase {
    /// Waiting for the next period.
    Idle,
    /// Reading the pair snapshot.
    Fetching,
    /// Running the policy.
    Evaluating,
    /// Submitting a transaction or reading balances.
    Executing,
    /// Blocked on a settlement.
    AwaitingSettlement,
}

impl fmt::Display for LoopPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Evaluating => "evaluating",
            Self::Executing => "executing",
            Self::AwaitingSettlement => "awaiting_settlement",
        };
        f.write_str(name)
    }
}

/// Outcome of one successful iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IterationReport {
    /// Action chosen by the policy.
    pub action: Action,
    /// Tick observed when the snapshot was taken.
    pub tick: i32,
    /// Positions burned by this iteration.
    pub removed: Vec<TokenId>,
    /// Ranges minted by this iteration, lower leg first.
    pub added: Vec<TickRange>,
    /// Settlements in submission order.
    pub settlements: Vec<Settlement>,
}

impl IterationReport {
    pub(crate) fn new(action: Action, tick: i32) -> Self {
        Self {
            action,
            tick,
            removed: Vec::new(),
            added: Vec::new(),
            settlements: Vec::new(),
        }
    }

    /// Returns true if any transaction was settled.
    pub fn changed_positions(&self) -> bool {
        !self.settlements.is_empty()
    }
}
