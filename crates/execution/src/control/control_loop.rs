use super::{IterationReport, LoopPhase};
use crate::alerts::{Alert, NotificationSink};
use crate::clock::Clock;
use crate::error::{ExecutionError, FetchError, TransactionError, TxKind, error_chain};
use crate::strategy::RebalancePolicy;
use crate::sync::fetch_pair_state;
use clmm_keeper_domain::entities::PairState;
use clmm_keeper_domain::math::price_tick::tick_to_price;
use clmm_keeper_domain::token::TokenId;
use clmm_keeper_domain::value_objects::{Action, InvalidShape, Side, TickRange};
use clmm_keeper_protocols::{GatewaySession, LedgerGateway, LiquidityLeg, Settlement, TxHandle};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Drives one gateway session until it fails or is shut down.
pub struct ControlLoop<G> {
    gateway: G,
    session: GatewaySession,
    policy: RebalancePolicy,
    poll_interval: Duration,
    clock: Arc<dyn Clock>,
    sink: NotificationSink,
    phase: LoopPhase,
    iterations: u64,
}

impl<G: LedgerGateway> ControlLoop<G> {
    /// Creates a loop bound to one session.
    pub fn new(
        gateway: G,
        session: GatewaySession,
        policy: RebalancePolicy,
        poll_interval: Duration,
        clock: Arc<dyn Clock>,
        sink: NotificationSink,
    ) -> Self {
        Self {
            gateway,
            session,
            policy,
            poll_interval,
            clock,
            sink,
            phase: LoopPhase::Idle,
            iterations: 0,
        }
    }

    /// Current phase. After a failed iteration this is the phase that failed.
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Completed iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Runs iterations on the poll interval until one fails.
    pub async fn run(&mut self) -> Result<(), ExecutionError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs iterations until one fails or `shutdown` resolves.
    ///
    /// Shutdown is only observed between iterations; an in-flight iteration
    /// always finishes.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<(), ExecutionError>
    where
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            session = %self.session.id,
            interval_secs = self.poll_interval.as_secs(),
            "Starting control loop"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(
                        session = %self.session.id,
                        iterations = self.iterations,
                        "Control loop stopped"
                    );
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }
            self.run_once().await?;
        }
    }

    /// Fetches, evaluates and executes once.
    pub async fn run_once(&mut self) -> Result<IterationReport, ExecutionError> {
        self.enter(LoopPhase::Fetching);
        let state = fetch_pair_state(&self.gateway, &self.session).await?;

        self.enter(LoopPhase::Evaluating);
        let now = self.clock.now();
        let action = self.policy.evaluate(&state, now);
        let price = tick_to_price(state.current_tick).ok();
        info!(
            tick = state.current_tick,
            price = ?price,
            positions = state.positions.len(),
            action = %action,
            "Evaluated pair"
        );

        let mut report = IterationReport::new(action.clone(), state.current_tick);
        self.execute(&action, &state, &mut report).await?;
        if report.changed_positions() {
            info!(
                removed = report.removed.len(),
                added = report.added.len(),
                settlements = report.settlements.len(),
                "Positions updated"
            );
        }

        self.iterations += 1;
        self.enter(LoopPhase::Idle);
        Ok(report)
    }

    async fn execute(
        &mut self,
        action: &Action,
        state: &PairState,
        report: &mut IterationReport,
    ) -> Result<(), ExecutionError> {
        match action {
            Action::NoOp => {
                debug!(tick = state.current_tick, "Pair in range, nothing to do");
            }
            Action::Liquidate { reason } => {
                warn!(reason = %reason, "Invalid position state, liquidating");
                let outcome = self.remove_all(state, report).await;
                self.report_invalid_state(*reason, state, &outcome).await;
                outcome?;
            }
            Action::AddInitial { .. } | Action::Narrow { .. } | Action::Widen { .. } => {
                let mut tick = state.current_tick;
                if action.requires_removal() {
                    self.remove_all(state, report).await?;
                    // Removal can take blocks; build ranges around the price now.
                    tick = self
                        .gateway
                        .current_tick(&self.session)
                        .await
                        .map_err(FetchError::read("current_tick"))?;
                }
                if let Some((low_ticks, up_ticks, fraction)) = action.add_params() {
                    self.add_legs(tick, low_ticks, up_ticks, fraction, report)
                        .await?;
                }
            }
        }
        Ok(())
    }

    async fn report_invalid_state(
        &self,
        reason: InvalidShape,
        state: &PairState,
        outcome: &Result<(), ExecutionError>,
    ) {
        let ranges: Vec<String> = state.positions.iter().map(|p| p.range().to_string()).collect();
        let pair = format!("{}/{}", state.token0, state.token1);
        let alert = match outcome {
            Ok(()) => Alert::warning(
                "Invalid position state",
                format!("{reason}; removed ranges {ranges:?} for {pair}"),
            ),
            Err(e) => Alert::critical(
                "Invalid position state",
                format!(
                    "{reason}; failed to remove ranges {ranges:?} for {pair}: {}",
                    error_chain(e)
                ),
            ),
        };
        self.sink.send(alert).await;
    }

    async fn remove_all(
        &mut self,
        state: &PairState,
        report: &mut IterationReport,
    ) -> Result<(), ExecutionError> {
        let ids: Vec<TokenId> = state.positions.iter().map(|p| p.token_id).collect();
        if ids.is_empty() {
            return Ok(());
        }

        self.enter(LoopPhase::Executing);
        let tx = self
            .gateway
            .remove_liquidity(&self.session, ids.clone())
            .await
            .map_err(|source| TransactionError::Submit {
                kind: TxKind::Remove,
                source,
            })?;
        let settlement = self.settle(TxKind::Remove, &tx).await?;
        info!(
            tx = %settlement.tx,
            block = settlement.block_number,
            positions = ids.len(),
            "Removed liquidity"
        );
        report.removed = ids;
        report.settlements.push(settlement);

        self.enter(LoopPhase::Executing);
        let leftover = self
            .gateway
            .position_ids(&self.session)
            .await
            .map_err(FetchError::read("position_ids"))?;
        if !leftover.is_empty() {
            return Err(ExecutionError::LeftoverPositions(leftover));
        }
        Ok(())
    }

    async fn add_legs(
        &mut self,
        tick: i32,
        low_ticks: i32,
        up_ticks: i32,
        fraction: Decimal,
        report: &mut IterationReport,
    ) -> Result<(), ExecutionError> {
        self.enter(LoopPhase::Executing);
        let spacing = self.policy.config().tick_spacing;
        let lower = TickRange::for_side(
            Side::Lower,
            tick,
            clamp_width(Side::Lower, low_ticks, spacing),
            spacing,
        )?;
        let upper = TickRange::for_side(
            Side::Upper,
            tick,
            clamp_width(Side::Upper, up_ticks, spacing),
            spacing,
        )?;

        let balance0 = self
            .gateway
            .token_balance(&self.session, &self.session.token0)
            .await
            .map_err(FetchError::read("token_balance"))?;
        let balance1 = self
            .gateway
            .token_balance(&self.session, &self.session.token1)
            .await
            .map_err(FetchError::read("token_balance"))?;
        let amount0 = balance0.fraction(fraction);
        let amount1 = balance1.fraction(fraction);
        if amount0.is_zero() && amount1.is_zero() {
            warn!(
                balance0 = %balance0,
                balance1 = %balance1,
                fraction = %fraction,
                "Nothing to deposit"
            );
            return Err(ExecutionError::InsufficientBalance);
        }

        let legs = vec![
            LiquidityLeg {
                range: lower,
                amount0,
                amount1,
            },
            LiquidityLeg {
                range: upper,
                amount0,
                amount1,
            },
        ];
        let tx = self
            .gateway
            .add_liquidity(&self.session, legs)
            .await
            .map_err(|source| TransactionError::Submit {
                kind: TxKind::Add,
                source,
            })?;
        let settlement = self.settle(TxKind::Add, &tx).await?;
        info!(
            tx = %settlement.tx,
            block = settlement.block_number,
            tick,
            lower = %lower,
            upper = %upper,
            amount0 = %amount0,
            amount1 = %amount1,
            "Added liquidity"
        );
        report.added = vec![lower, upper];
        report.settlements.push(settlement);
        Ok(())
    }

    async fn settle(&mut self, kind: TxKind, tx: &TxHandle) -> Result<Settlement, TransactionError> {
        self.enter(LoopPhase::AwaitingSettlement);
        debug!(tx = %tx, kind = %kind, "Waiting for settlement");
        self.gateway
            .await_settlement(&self.session, tx)
            .await
            .map_err(|source| TransactionError::Settle { kind, source })
    }

    fn enter(&mut self, phase: LoopPhase) {
        if self.phase != phase {
            debug!(from = %self.phase, to = %phase, "Control loop phase");
            self.phase = phase;
        }
    }
}

/// Raises widths below one tick spacing to it.
fn clamp_width(side: Side, width: i32, spacing: i32) -> i32 {
    if width < spacing {
        warn!(
            side = ?side,
            width,
            minimum = spacing,
            "Leg width below tick spacing, clamping"
        );
        spacing
    } else {
        width
    }
}
