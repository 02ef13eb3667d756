//! Gateway capability traits.

use crate::credentials::Credentials;
use crate::error::GatewayError;
use crate::session::GatewaySession;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clmm_keeper_domain::token::{Address, TokenAmount, TokenId};
use clmm_keeper_domain::value_objects::TickRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a submitted transaction (its hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHandle(pub String);

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One range to mint in an add-liquidity transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityLeg {
    pub range: TickRange,
    /// Maximum token0 the leg may consume.
    pub amount0: TokenAmount,
    /// Maximum token1 the leg may consume.
    pub amount1: TokenAmount,
}

/// Confirmation of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub tx: TxHandle,
    pub block_number: u64,
    pub block_timestamp: DateTime<Utc>,
}

/// Position queries and liquidity-mutating transactions for one pair.
///
/// Reads reflect the chain at call time. Mutations return as soon as the
/// transaction is submitted; callers block on [`LedgerGateway::await_settlement`].
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Current pool price in ticks.
    async fn current_tick(&self, session: &GatewaySession) -> Result<i32, GatewayError>;

    /// Number of position NFTs the session account holds for the pair.
    async fn position_count(&self, session: &GatewaySession) -> Result<usize, GatewayError>;

    /// Ids of the held positions; length equals [`LedgerGateway::position_count`].
    async fn position_ids(&self, session: &GatewaySession) -> Result<Vec<TokenId>, GatewayError>;

    /// Tick bounds of a position.
    async fn position_ticks(
        &self,
        session: &GatewaySession,
        token_id: TokenId,
    ) -> Result<TickRange, GatewayError>;

    /// Block timestamp of the most recent settled add-liquidity transaction,
    /// or `None` if the account never added.
    async fn last_add_timestamp(
        &self,
        session: &GatewaySession,
    ) -> Result<Option<DateTime<Utc>>, GatewayError>;

    /// Wallet balance of `token`.
    async fn token_balance(
        &self,
        session: &GatewaySession,
        token: &Address,
    ) -> Result<TokenAmount, GatewayError>;

    /// Submits one transaction minting every leg.
    async fn add_liquidity(
        &self,
        session: &GatewaySession,
        legs: Vec<LiquidityLeg>,
    ) -> Result<TxHandle, GatewayError>;

    /// Submits one transaction withdrawing and burning every listed position.
    async fn remove_liquidity(
        &self,
        session: &GatewaySession,
        token_ids: Vec<TokenId>,
    ) -> Result<TxHandle, GatewayError>;

    /// Blocks until the transaction is mined. Fails on revert or timeout.
    async fn await_settlement(
        &self,
        session: &GatewaySession,
        tx: &TxHandle,
    ) -> Result<Settlement, GatewayError>;
}

/// Opens gateway sessions.
#[async_trait]
pub trait LedgerConnector: Send + Sync {
    type Gateway: LedgerGateway;

    /// Connects and returns a gateway with the session to use with it.
    async fn connect(
        &self,
        credentials: &Credentials,
        token0: &Address,
        token1: &Address,
    ) -> Result<(Self::Gateway, GatewaySession), GatewayError>;
}

#[async_trait]
impl<G: LedgerGateway + ?Sized> LedgerGateway for std::sync::Arc<G> {
    async fn current_tick(&self, session: &GatewaySession) -> Result<i32, GatewayError> {
        (**self).current_tick(session).await
    }

    async fn position_count(&self, session: &GatewaySession) -> Result<usize, GatewayError> {
        (**self).position_count(session).await
    }

    async fn position_ids(&self, session: &GatewaySession) -> Result<Vec<TokenId>, GatewayError> {
        (**self).position_ids(session).await
    }

    async fn position_ticks(
        &self,
        session: &GatewaySession,
        token_id: TokenId,
    ) -> Result<TickRange, GatewayError> {
        (**self).position_ticks(session, token_id).await
    }

    async fn last_add_timestamp(
        &self,
        session: &GatewaySession,
    ) -> Result<Option<DateTime<Utc>>, GatewayError> {
        (**self).last_add_timestamp(session).await
    }

    async fn token_balance(
        &self,
        session: &GatewaySession,
        token: &Address,
    ) -> Result<TokenAmount, GatewayError> {
        (**self).token_balance(session, token).await
    }

    async fn add_liquidity(
        &self,
        session: &GatewaySession,
        legs: Vec<LiquidityLeg>,
    ) -> Result<TxHandle, GatewayError> {
        (**self).add_liquidity(session, legs).await
    }

    async fn remove_liquidity(
        &self,
        session: &GatewaySession,
        token_ids: Vec<TokenId>,
    ) -> Result<TxHandle, GatewayError> {
        (**self).remove_liquidity(session, token_ids).await
    }

    async fn await_settlement(
        &self,
        session: &GatewaySession,
        tx: &TxHandle,
    ) -> Result<Settlement, GatewayError> {
        (**self).await_settlement(session, tx).await
    }
}
