//! Settled ledger events, recorded in block order.

use chrono::{DateTime, Utc};
use clmm_keeper_domain::token::{TokenAmount, TokenId};
use clmm_keeper_domain::value_objects::TickRange;
use clmm_keeper_protocols::TxHandle;

/// One minted leg with the amounts actually deposited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledLeg {
    pub token_id: TokenId,
    pub range: TickRange,
    pub deposited0: TokenAmount,
    pub deposited1: TokenAmount,
}

/// Something that happened on the simulated chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    /// An add-liquidity transaction settled.
    Added {
        tx: TxHandle,
        block_number: u64,
        timestamp: DateTime<Utc>,
        tick: i32,
        legs: Vec<SettledLeg>,
    },
    /// A remove-liquidity transaction settled.
    Removed {
        tx: TxHandle,
        block_number: u64,
        timestamp: DateTime<Utc>,
        token_ids: Vec<TokenId>,
    },
    /// A transaction reverted at settlement.
    Reverted {
        tx: TxHandle,
        block_number: u64,
        reason: String,
    },
}

impl LedgerEvent {
    /// Returns true for a settled add.
    pub fn is_add(&self) -> bool {
        matches!(self, Self::Added { .. })
    }

    /// Returns true for a settled removal.
    pub fn is_remove(&self) -> bool {
        matches!(self, Self::Removed { .. })
    }

    /// Returns true for a reverted transaction.
    pub fn is_revert(&self) -> bool {
        matches!(self, Self::Reverted { .. })
    }
}
