//! Two-sided range rebalance policy.
//!
//! The keeper holds one leg just below the price and one just above it.
//! Given a fresh [`PairState`] the policy decides, without side effects:
//!
//! 1. no positions: open both legs at the configured widths
//! 2. a stale pair: re-open both legs narrower
//! 3. price outside the covered span: re-open both legs wider
//! 4. any other shape, including a pair with no known add time: liquidate
//!    everything
//!
//! Staleness is checked before the price, so a stale pair is narrowed even
//! when the price has left its span.

use crate::config::PolicyConfig;
use chrono::{DateTime, Utc};
use clmm_keeper_domain::entities::{PairShape, PairState};
use clmm_keeper_domain::value_objects::Action;

/// Stateless rebalance policy over a [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct RebalancePolicy {
    config: PolicyConfig,
}

impl RebalancePolicy {
    /// Creates a new policy over `config`.
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// Returns the policy parameters.
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decides the next action for `state` at time `now`.
    pub fn evaluate(&self, state: &PairState, now: DateTime<Utc>) -> Action {
        evaluate(state, &self.config, now)
    }
}

/// Decides the next action for `state` at time `now`.
pub fn evaluate(state: &PairState, config: &PolicyConfig, now: DateTime<Utc>) -> Action {
    let fraction = config.position_fraction;
    match state.shape() {
        PairShape::Empty => Action::AddInitial {
            low_ticks: config.low_tick_range,
            up_ticks: config.up_tick_range,
            fraction,
        },
        PairShape::Paired { lower, upper } => {
            let stale = state
                .elapsed_since_add(now)
                .is_some_and(|elapsed| elapsed > config.narrow_interval());
            if stale {
                return Action::Narrow {
                    low_ticks: lower.width().saturating_sub(config.dec_step),
                    up_ticks: upper.width().saturating_sub(config.dec_step),
                    fraction,
                };
            }

            // Touching either outer bound still counts as in range.
            let in_span = state
                .covered_span()
                .is_some_and(|span| span.contains(state.current_tick));
            if !in_span {
                return Action::Widen {
                    low_ticks: lower.width().saturating_add(config.inc_step),
                    up_ticks: upper.width().saturating_add(config.inc_step),
                    fraction,
                };
            }
            Action::NoOp
        }
        PairShape::Invalid(reason) => Action::Liquidate { reason },
    }
}
