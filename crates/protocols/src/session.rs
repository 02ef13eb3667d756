use clmm_keeper_domain::token::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one connected gateway session.
///
/// Built once per supervisor cycle by a [`crate::LedgerConnector`] and passed by
/// reference into every gateway call. It is never mutated; reconnecting yields
/// a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Unique id of this session, used to correlate logs.
    pub id: Uuid,
    /// Wallet that owns the positions and signs transactions.
    pub account: Address,
    /// First token of the managed pair.
    pub token0: Address,
    /// Second token of the managed pair.
    pub token1: Address,
    /// When the connector opened the session.
    pub opened_at: DateTime<Utc>,
}

impl GatewaySession {
    /// Creates a new session with a fresh id.
    pub fn new(account: Address, token0: Address, token1: Address) -> Self {
        Self {
            id: Uuid::new_v4(),
            account,
            token0,
            token1,
            opened_at: Utc::now(),
        }
    }
}
