//! In-memory ledger implementing the gateway traits.
//!
//! Models one pool and one wallet:
//! - a settable current tick
//! - wallet balances of token0 and token1
//! - position NFTs with sequential ids
//! - submitted transactions that only take effect when settled
//!
//! Faults can be injected to exercise crash and revert handling.

use crate::clock::SimClock;
use crate::event::{LedgerEvent, SettledLeg};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use clmm_keeper_domain::entities::Position;
use clmm_keeper_domain::token::{Address, TokenAmount, TokenId};
use clmm_keeper_domain::value_objects::TickRange;
use clmm_keeper_protocols::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration for a simulated ledger.
#[derive(Debug, Clone)]
pub struct SimulatedLedgerConfig {
    /// Wallet that owns positions.
    pub account: Address,
    pub token0: Address,
    pub token1: Address,
    /// Starting pool tick.
    pub initial_tick: i32,
    /// Starting wallet balance of token0.
    pub balance0: TokenAmount,
    /// Starting wallet balance of token1.
    pub balance1: TokenAmount,
    /// Block time source.
    pub clock: SimClock,
    /// Real time a settlement wait takes.
    pub settlement_delay: Duration,
    /// Seconds a manual clock advances per mined block.
    pub block_interval_secs: i64,
}

impl SimulatedLedgerConfig {
    /// Creates a config with a manual clock, no settlement delay and 1 s blocks.
    pub fn new(account: Address, token0: Address, token1: Address, start: DateTime<Utc>) -> Self {
        Self {
            account,
            token0,
            token1,
            initial_tick: 0,
            balance0: TokenAmount::zero(),
            balance1: TokenAmount::zero(),
            clock: SimClock::manual(start),
            settlement_delay: Duration::ZERO,
            block_interval_secs: 1,
        }
    }

    /// Sets the starting tick.
    #[must_use]
    pub fn with_tick(mut self, tick: i32) -> Self {
        self.initial_tick = tick;
        self
    }

    /// Sets the starting balances.
    #[must_use]
    pub fn with_balances(mut self, balance0: TokenAmount, balance1: TokenAmount) -> Self {
        self.balance0 = balance0;
        self.balance1 = balance1;
        self
    }

    /// Sets the block clock.
    #[must_use]
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the settlement delay.
    #[must_use]
    pub fn with_settlement_delay(mut self, delay: Duration) -> Self {
        self.settlement_delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Faults {
    revert_next_add: Option<String>,
    revert_next_remove: Option<String>,
    partial_next_add: bool,
    failing_reads: u32,
    failing_submits: u32,
    failing_connects: u32,
}

#[derive(Debug, Clone)]
struct MintedPosition {
    range: TickRange,
    deposited0: TokenAmount,
    deposited1: TokenAmount,
}

#[derive(Debug, Clone)]
enum PendingTx {
    Add(Vec<LiquidityLeg>),
    Remove(Vec<TokenId>),
}

#[derive(Debug)]
struct LedgerState {
    current_tick: i32,
    balance0: TokenAmount,
    balance1: TokenAmount,
    positions: BTreeMap<TokenId, MintedPosition>,
    next_token_id: u64,
    pending: HashMap<TxHandle, PendingTx>,
    settled: HashMap<TxHandle, Settlement>,
    block_number: u64,
    tx_counter: u64,
    last_add: Option<DateTime<Utc>>,
    events: Vec<LedgerEvent>,
    faults: Faults,
}

impl LedgerState {
    fn next_tx(&mut self) -> TxHandle {
        self.tx_counter += 1;
        TxHandle(format!("0x{:064x}", self.tx_counter))
    }

    fn mint(&mut self, range: TickRange, deposited0: TokenAmount, deposited1: TokenAmount) -> TokenId {
        self.next_token_id += 1;
        let id = TokenId::from(self.next_token_id);
        self.positions.insert(
            id,
            MintedPosition {
                range,
                deposited0,
                deposited1,
            },
        );
        id
    }
}

/// Tokens a leg consumes at the given pool tick.
///
/// Below the price only token1 is held, above it only token0. A leg starting
/// exactly at the current tick needs a negligible amount of token1 and is
/// treated as token0-only.
fn leg_deposits(leg: &LiquidityLeg, tick: i32) -> (TokenAmount, TokenAmount) {
    if leg.range.tick_upper <= tick {
        (TokenAmount::zero(), leg.amount1)
    } else if leg.range.tick_lower >= tick {
        (leg.amount0, TokenAmount::zero())
    } else {
        (leg.amount0, leg.amount1)
    }
}

/// In-memory chain for one pair and one wallet.
pub struct SimulatedLedger {
    config: SimulatedLedgerConfig,
    state: RwLock<LedgerState>,
}

impl SimulatedLedger {
    /// Creates a new ledger.
    pub fn new(config: SimulatedLedgerConfig) -> Self {
        let state = LedgerState {
            current_tick: config.initial_tick,
            balance0: config.balance0,
            balance1: config.balance1,
            positions: BTreeMap::new(),
            next_token_id: 0,
            pending: HashMap::new(),
            settled: HashMap::new(),
            block_number: 0,
            tx_counter: 0,
            last_add: None,
            events: Vec::new(),
            faults: Faults::default(),
        };
        Self {
            config,
            state: RwLock::new(state),
        }
    }

    /// Creates a new ledger behind an `Arc`.
    pub fn shared(config: SimulatedLedgerConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }

    /// Returns the block clock.
    pub fn clock(&self) -> &SimClock {
        &self.config.clock
    }

    /// Opens a session for this ledger's account and pair.
    pub fn session(&self) -> GatewaySession {
        GatewaySession::new(
            self.config.account.clone(),
            self.config.token0.clone(),
            self.config.token1.clone(),
        )
    }

    /// Moves the pool price.
    pub async fn set_tick(&self, tick: i32) {
        self.state.write().await.current_tick = tick;
        debug!(tick, "Simulated pool tick moved");
    }

    /// Returns the current pool tick.
    pub async fn tick(&self) -> i32 {
        self.state.read().await.current_tick
    }

    /// Overwrites a wallet balance.
    pub async fn set_balance(&self, token: &Address, amount: TokenAmount) {
        let mut state = self.state.write().await;
        if token == &self.config.token0 {
            state.balance0 = amount;
        } else if token == &self.config.token1 {
            state.balance1 = amount;
        } else {
            warn!(token = %token, "Ignoring balance for token outside the pair");
        }
    }

    /// Returns the wallet balances of token0 and token1.
    pub async fn balances(&self) -> (TokenAmount, TokenAmount) {
        let state = self.state.read().await;
        (state.balance0, state.balance1)
    }

    /// Open positions in id order.
    pub async fn positions(&self) -> Vec<Position> {
        self.state
            .read()
            .await
            .positions
            .iter()
            .map(|(id, p)| Position::from_range(*id, p.range))
            .collect()
    }

    /// Mints a position without a transaction and without touching balances,
    /// as if another actor had transferred it to the wallet.
    pub async fn inject_position(&self, range: TickRange) -> TokenId {
        let mut state = self.state.write().await;
        state.mint(range, TokenAmount::zero(), TokenAmount::zero())
    }

    /// Overrides the recorded last-add timestamp.
    pub async fn set_last_add(&self, at: Option<DateTime<Utc>>) {
        self.state.write().await.last_add = at;
    }

    /// All settled events in block order.
    pub async fn events(&self) -> Vec<LedgerEvent> {
        self.state.read().await.events.clone()
    }

    /// Returns the number of mined blocks.
    pub async fn block_number(&self) -> u64 {
        self.state.read().await.block_number
    }

    /// Number of submitted transactions still waiting for settlement.
    pub async fn pending_count(&self) -> usize {
        self.state.read().await.pending.len()
    }

    /// Makes the next add-liquidity settlement revert.
    pub async fn revert_next_add(&self, reason: impl Into<String>) {
        self.state.write().await.faults.revert_next_add = Some(reason.into());
    }

    /// Makes the next remove-liquidity settlement revert.
    pub async fn revert_next_remove(&self, reason: impl Into<String>) {
        self.state.write().await.faults.revert_next_remove = Some(reason.into());
    }

    /// Makes the next add-liquidity settlement mint only its first leg and
    /// then fail with a timeout, as if the keeper crashed mid-add.
    pub async fn partial_next_add(&self) {
        self.state.write().await.faults.partial_next_add = true;
    }

    /// Fails the next `n` read calls with an RPC error.
    pub async fn fail_next_reads(&self, n: u32) {
        self.state.write().await.faults.failing_reads = n;
    }

    /// Fails the next `n` transaction submissions with an RPC error.
    pub async fn fail_next_submits(&self, n: u32) {
        self.state.write().await.faults.failing_submits = n;
    }

    /// Fails the next `n` connection attempts.
    pub async fn fail_next_connects(&self, n: u32) {
        self.state.write().await.faults.failing_connects = n;
    }

    fn check_session(&self, session: &GatewaySession) -> Result<(), GatewayError> {
        if session.account != self.config.account {
            return Err(GatewayError::InvalidRequest(format!(
                "session account {} does not own this ledger",
                session.account
            )));
        }
        if session.token0 != self.config.token0 || session.token1 != self.config.token1 {
            return Err(GatewayError::InvalidRequest(
                "session pair does not match the pool".to_string(),
            ));
        }
        Ok(())
    }

    /// Takes the lock for a read, consuming an injected read fault if any.
    async fn read_state(
        &self,
        session: &GatewaySession,
        method: &'static str,
    ) -> Result<tokio::sync::RwLockWriteGuard<'_, LedgerState>, GatewayError> {
        self.check_session(session)?;
        let mut state = self.state.write().await;
        if state.faults.failing_reads > 0 {
            state.faults.failing_reads -= 1;
            return Err(GatewayError::rpc(method, "injected read failure"));
        }
        Ok(state)
    }

    async fn submit(
        &self,
        session: &GatewaySession,
        method: &'static str,
        tx: PendingTx,
    ) -> Result<TxHandle, GatewayError> {
        self.check_session(session)?;
        let mut state = self.state.write().await;
        if state.faults.failing_submits > 0 {
            state.faults.failing_submits -= 1;
            return Err(GatewayError::rpc(method, "injected submit failure"));
        }
        let handle = state.next_tx();
        state.pending.insert(handle.clone(), tx);
        debug!(tx = %handle, method, "Simulated transaction submitted");
        Ok(handle)
    }

    fn settle_add(
        state: &mut LedgerState,
        tx: &TxHandle,
        mut legs: Vec<LiquidityLeg>,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, String> {
        if let Some(reason) = state.faults.revert_next_add.take() {
            return Err(reason);
        }
        let interrupted = std::mem::take(&mut state.faults.partial_next_add);
        if interrupted {
            legs.truncate(1);
        }

        let tick = state.current_tick;
        let deposits: Vec<(TokenAmount, TokenAmount)> =
            legs.iter().map(|leg| leg_deposits(leg, tick)).collect();
        let total0 = deposits
            .iter()
            .fold(TokenAmount::zero(), |acc, (a0, _)| acc.saturating_add(*a0));
        let total1 = deposits
            .iter()
            .fold(TokenAmount::zero(), |acc, (_, a1)| acc.saturating_add(*a1));
        if total0 > state.balance0 || total1 > state.balance1 {
            return Err("insufficient balance".to_string());
        }

        state.balance0 = state.balance0.saturating_sub(total0);
        state.balance1 = state.balance1.saturating_sub(total1);

        let mut settled = Vec::with_capacity(legs.len());
        for (leg, (deposited0, deposited1)) in legs.iter().zip(deposits) {
            let token_id = state.mint(leg.range, deposited0, deposited1);
            settled.push(SettledLeg {
                token_id,
                range: leg.range,
                deposited0,
                deposited1,
            });
        }
        state.last_add = Some(timestamp);
        state.events.push(LedgerEvent::Added {
            tx: tx.clone(),
            block_number: state.block_number,
            timestamp,
            tick,
            legs: settled,
        });
        Ok(interrupted)
    }

    fn settle_remove(
        state: &mut LedgerState,
        tx: &TxHandle,
        token_ids: Vec<TokenId>,
        timestamp: DateTime<Utc>,
    ) -> Result<bool, String> {
        if let Some(reason) = state.faults.revert_next_remove.take() {
            return Err(reason);
        }
        if let Some(missing) = token_ids.iter().find(|id| !state.positions.contains_key(*id)) {
            return Err(format!("position {missing} not owned"));
        }
        for id in &token_ids {
            if let Some(position) = state.positions.remove(id) {
                state.balance0 = state.balance0.saturating_add(position.deposited0);
                state.balance1 = state.balance1.saturating_add(position.deposited1);
            }
        }
        state.events.push(LedgerEvent::Removed {
            tx: tx.clone(),
            block_number: state.block_number,
            timestamp,
            token_ids,
        });
        Ok(false)
    }
}

#[async_trait]
impl LedgerGateway for SimulatedLedger {
    async fn current_tick(&self, session: &GatewaySession) -> Result<i32, GatewayError> {
        Ok(self.read_state(session, "current_tick").await?.current_tick)
    }

    async fn position_count(&self, session: &GatewaySession) -> Result<usize, GatewayError> {
        Ok(self.read_state(session, "position_count").await?.positions.len())
    }

    async fn position_ids(&self, session: &GatewaySession) -> Result<Vec<TokenId>, GatewayError> {
        let state = self.read_state(session, "position_ids").await?;
        Ok(state.positions.keys().copied().collect())
    }

    async fn position_ticks(
        &self,
        session: &GatewaySession,
        token_id: TokenId,
    ) -> Result<TickRange, GatewayError> {
        let state = self.read_state(session, "position_ticks").await?;
        state
            .positions
            .get(&token_id)
            .map(|p| p.range)
            .ok_or(GatewayError::UnknownPosition(token_id))
    }

    async fn last_add_timestamp(
        &self,
        session: &GatewaySession,
    ) -> Result<Option<DateTime<Utc>>, GatewayError> {
        Ok(self.read_state(session, "last_add_timestamp").await?.last_add)
    }

    async fn token_balance(
        &self,
        session: &GatewaySession,
        token: &Address,
    ) -> Result<TokenAmount, GatewayError> {
        let state = self.read_state(session, "token_balance").await?;
        if token == &self.config.token0 {
            Ok(state.balance0)
        } else if token == &self.config.token1 {
            Ok(state.balance1)
        } else {
            Err(GatewayError::InvalidRequest(format!(
                "token {token} is not part of the pair"
            )))
        }
    }

    async fn add_liquidity(
        &self,
        session: &GatewaySession,
        legs: Vec<LiquidityLeg>,
    ) -> Result<TxHandle, GatewayError> {
        if legs.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "add_liquidity needs at least one leg".to_string(),
            ));
        }
        self.submit(session, "add_liquidity", PendingTx::Add(legs)).await
    }

    async fn remove_liquidity(
        &self,
        session: &GatewaySession,
        token_ids: Vec<TokenId>,
    ) -> Result<TxHandle, GatewayError> {
        if token_ids.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "remove_liquidity needs at least one position".to_string(),
            ));
        }
        self.submit(session, "remove_liquidity", PendingTx::Remove(token_ids))
            .await
    }

    async fn await_settlement(
        &self,
        session: &GatewaySession,
        tx: &TxHandle,
    ) -> Result<Settlement, GatewayError> {
        self.check_session(session)?;
        if !self.config.settlement_delay.is_zero() {
            tokio::time::sleep(self.config.settlement_delay).await;
        }

        let mut state = self.state.write().await;
        if let Some(settlement) = state.settled.get(tx) {
            return Ok(settlement.clone());
        }
        let pending = state
            .pending
            .remove(tx)
            .ok_or_else(|| GatewayError::UnknownTransaction(tx.clone()))?;

        state.block_number += 1;
        if self.config.clock.is_manual() {
            self.config
                .clock
                .advance(ChronoDuration::seconds(self.config.block_interval_secs));
        }
        let timestamp = self.config.clock.now();

        let outcome = match pending {
            PendingTx::Add(legs) => Self::settle_add(&mut state, tx, legs, timestamp),
            PendingTx::Remove(ids) => Self::settle_remove(&mut state, tx, ids, timestamp),
        };

        match outcome {
            Ok(false) => {}
            Ok(true) => {
                // First leg landed, the confirmation never arrives.
                warn!(tx = %tx, block = state.block_number, "Simulated settlement interrupted");
                return Err(GatewayError::Timeout { tx: tx.clone() });
            }
            Err(reason) => {
                let block_number = state.block_number;
                state.events.push(LedgerEvent::Reverted {
                    tx: tx.clone(),
                    block_number,
                    reason: reason.clone(),
                });
                warn!(tx = %tx, block = block_number, reason = %reason, "Simulated transaction reverted");
                return Err(GatewayError::Reverted {
                    tx: tx.clone(),
                    reason,
                });
            }
        }

        let settlement = Settlement {
            tx: tx.clone(),
            block_number: state.block_number,
            block_timestamp: timestamp,
        };
        state.settled.insert(tx.clone(), settlement.clone());
        debug!(tx = %tx, block = settlement.block_number, "Simulated transaction settled");
        Ok(settlement)
    }
}

/// Connector handing out sessions on a shared [`SimulatedLedger`].
#[derive(Clone)]
pub struct SimulatedConnector {
    ledger: Arc<SimulatedLedger>,
}

impl SimulatedConnector {
    /// Creates a new connector for `ledger`.
    pub fn new(ledger: Arc<SimulatedLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl LedgerConnector for SimulatedConnector {
    type Gateway = Arc<SimulatedLedger>;

    async fn connect(
        &self,
        credentials: &Credentials,
        token0: &Address,
        token1: &Address,
    ) -> Result<(Self::Gateway, GatewaySession), GatewayError> {
        {
            let mut state = self.ledger.state.write().await;
            if state.faults.failing_connects > 0 {
                state.faults.failing_connects -= 1;
                return Err(GatewayError::Connect("injected connect failure".to_string()));
            }
        }
        if credentials.private_key.is_empty() {
            return Err(GatewayError::Connect("missing private key".to_string()));
        }
        if token0 != &self.ledger.config.token0 || token1 != &self.ledger.config.token1 {
            return Err(GatewayError::Connect(format!(
                "no simulated pool for {token0}/{token1}"
            )));
        }

        let session = self.ledger.session();
        info!(
            session = %session.id,
            account = %session.account,
            "Connected to simulated ledger"
        );
        Ok((self.ledger.clone(), session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn amount(v: u64) -> TokenAmount {
        TokenAmount(U256::from(v))
    }

    fn start() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn ledger() -> SimulatedLedger {
        SimulatedLedger::new(
            SimulatedLedgerConfig::new(addr(9), addr(1), addr(2), start())
                .with_tick(1000)
                .with_balances(amount(1_000), amount(2_000)),
        )
    }

    fn legs(tick: i32, a0: u64, a1: u64) -> Vec<LiquidityLeg> {
        vec![
            LiquidityLeg {
                range: TickRange::new(tick - 500, tick).unwrap(),
                amount0: amount(a0),
                amount1: amount(a1),
            },
            LiquidityLeg {
                range: TickRange::new(tick, tick + 500).unwrap(),
                amount0: amount(a0),
                amount1: amount(a1),
            },
        ]
    }

    #[tokio::test]
    async fn test_add_only_takes_effect_on_settlement() {
        let ledger = ledger();
        let session = ledger.session();

        let tx = ledger
            .add_liquidity(&session, legs(1000, 300, 600))
            .await
            .unwrap();
        assert_eq!(ledger.position_count(&session).await.unwrap(), 0);
        assert_eq!(ledger.pending_count().await, 1);

        let settlement = ledger.await_settlement(&session, &tx).await.unwrap();
        assert_eq!(settlement.block_number, 1);
        assert_eq!(settlement.block_timestamp, start() + ChronoDuration::seconds(1));

        assert_eq!(ledger.position_count(&session).await.unwrap(), 2);
        // Lower leg holds token1 only, upper leg token0 only.
        assert_eq!(ledger.balances().await, (amount(700), amount(1_400)));
        assert_eq!(
            ledger.last_add_timestamp(&session).await.unwrap(),
            Some(settlement.block_timestamp)
        );
    }

    #[tokio::test]
    async fn test_settlement_is_idempotent() {
        let ledger = ledger();
        let session = ledger.session();
        let tx = ledger
            .add_liquidity(&session, legs(1000, 10, 10))
            .await
            .unwrap();
        let first = ledger.await_settlement(&session, &tx).await.unwrap();
        let second = ledger.await_settlement(&session, &tx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ledger.block_number().await, 1);

        let unknown = TxHandle("0xdead".to_string());
        assert!(matches!(
            ledger.await_settlement(&session, &unknown).await,
            Err(GatewayError::UnknownTransaction(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_returns_deposits() {
        let ledger = ledger();
        let session = ledger.session();
        let tx = ledger
            .add_liquidity(&session, legs(1000, 300, 600))
            .await
            .unwrap();
        ledger.await_settlement(&session, &tx).await.unwrap();

        let ids = ledger.position_ids(&session).await.unwrap();
        let tx = ledger.remove_liquidity(&session, ids).await.unwrap();
        ledger.await_settlement(&session, &tx).await.unwrap();

        assert_eq!(ledger.position_count(&session).await.unwrap(), 0);
        assert_eq!(ledger.balances().await, (amount(1_000), amount(2_000)));
        let events = ledger.events().await;
        assert!(events[0].is_add());
        assert!(events[1].is_remove());
    }

    #[tokio::test]
    async fn test_insufficient_balance_reverts_without_effects() {
        let ledger = ledger();
        let session = ledger.session();
        let tx = ledger
            .add_liquidity(&session, legs(1000, 5_000, 10))
            .await
            .unwrap();
        let err = ledger.await_settlement(&session, &tx).await.unwrap_err();
        assert!(matches!(err, GatewayError::Reverted { .. }));
        assert_eq!(ledger.position_count(&session).await.unwrap(), 0);
        assert_eq!(ledger.balances().await, (amount(1_000), amount(2_000)));
        assert!(ledger.events().await[0].is_revert());
    }

    #[tokio::test]
    async fn test_partial_add_mints_one_leg() {
        let ledger = ledger();
        let session = ledger.session();
        ledger.partial_next_add().await;
        let tx = ledger
            .add_liquidity(&session, legs(1000, 10, 10))
            .await
            .unwrap();
        assert!(matches!(
            ledger.await_settlement(&session, &tx).await,
            Err(GatewayError::Timeout { .. })
        ));
        assert_eq!(ledger.position_count(&session).await.unwrap(), 1);
        assert_eq!(ledger.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let ledger = ledger();
        let session = ledger.session();

        ledger.fail_next_reads(1).await;
        assert!(matches!(
            ledger.current_tick(&session).await,
            Err(GatewayError::Rpc { method: "current_tick", .. })
        ));
        assert_eq!(ledger.current_tick(&session).await.unwrap(), 1000);

        ledger.revert_next_remove("paused").await;
        let id = ledger
            .inject_position(TickRange::new(0, 10).unwrap())
            .await;
        let tx = ledger.remove_liquidity(&session, vec![id]).await.unwrap();
        assert!(ledger.await_settlement(&session, &tx).await.is_err());
        assert_eq!(ledger.position_count(&session).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_foreign_session_is_rejected() {
        let ledger = ledger();
        let foreign = GatewaySession::new(addr(7), addr(1), addr(2));
        assert!(matches!(
            ledger.current_tick(&foreign).await,
            Err(GatewayError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_connector_checks_credentials_and_pair() {
        let ledger = Arc::new(ledger());
        let connector = SimulatedConnector::new(ledger.clone());
        let creds = Credentials {
            private_key: SecretString::new("0xabc"),
            rpc_url: String::new(),
        };

        let (gateway, session) = connector.connect(&creds, &addr(1), &addr(2)).await.unwrap();
        assert_eq!(gateway.current_tick(&session).await.unwrap(), 1000);

        assert!(
            connector
                .connect(&Credentials::default(), &addr(1), &addr(2))
                .await
                .is_err()
        );
        assert!(connector.connect(&creds, &addr(1), &addr(3)).await.is_err());

        ledger.fail_next_connects(1).await;
        assert!(connector.connect(&creds, &addr(1), &addr(2)).await.is_err());
        assert!(connector.connect(&creds, &addr(1), &addr(2)).await.is_ok());
    }
}
