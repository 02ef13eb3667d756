use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a snapshot cannot be managed incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvalidShape {
    /// Position count other than 0 or 2.
    PositionCount { count: usize },
    /// Two positions whose ranges overlap.
    Overlapping { lower_end: i32, upper_start: i32 },
    /// Two positions but no recorded add, so their age is unknown.
    MissingAddTime,
}

impl fmt::Display for InvalidShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PositionCount { count } => {
                write!(f, "expected 0 or 2 positions, found {count}")
            }
            Self::Overlapping {
                lower_end,
                upper_start,
            } => write!(
                f,
                "lower leg ends at {lower_end} past upper leg start {upper_start}"
            ),
            Self::MissingAddTime => {
                f.write_str("two positions are open but their add time is unknown")
            }
        }
    }
}

/// Decision produced by the rebalance policy.
///
/// Widths are in ticks and describe each leg relative to the current tick at
/// execution time; `fraction` is the share of each wallet balance to deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Open both legs from an empty state.
    AddInitial {
        low_ticks: i32,
        up_ticks: i32,
        fraction: Decimal,
    },
    /// Re-open both legs tighter after the pair went stale.
    Narrow {
        low_ticks: i32,
        up_ticks: i32,
        fraction: Decimal,
    },
    /// Re-open both legs wider after price left the covered span.
    Widen {
        low_ticks: i32,
        up_ticks: i32,
        fraction: Decimal,
    },
    /// Tear everything down.
    Liquidate { reason: InvalidShape },
    /// Nothing to do.
    NoOp,
}

impl Action {
    /// Returns true if existing positions must be removed first.
    pub fn requires_removal(&self) -> bool {
        matches!(
            self,
            Self::Narrow { .. } | Self::Widen { .. } | Self::Liquidate { .. }
        )
    }

    /// Returns `(low_ticks, up_ticks, fraction)` for actions that add liquidity.
    pub fn add_params(&self) -> Option<(i32, i32, Decimal)> {
        match self {
            Self::AddInitial {
                low_ticks,
                up_ticks,
                fraction,
            }
            | Self::Narrow {
                low_ticks,
                up_ticks,
                fraction,
            }
            | Self::Widen {
                low_ticks,
                up_ticks,
                fraction,
            } => Some((*low_ticks, *up_ticks, *fraction)),
            Self::Liquidate { .. } | Self::NoOp => None,
        }
    }

    /// Returns the snake_case action name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddInitial { .. } => "add_initial",
            Self::Narrow { .. } => "narrow",
            Self::Widen { .. } => "widen",
            Self::Liquidate { .. } => "liquidate",
            Self::NoOp => "noop",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Liquidate { reason } => write!(f, "liquidate ({reason})"),
            Self::NoOp => f.write_str("noop"),
            _ => match self.add_params() {
                Some((low, up, fraction)) => write!(
                    f,
                    "{} low={low} up={up} fraction={fraction}",
                    self.name()
                ),
                None => f.write_str(self.name()),
            },
        }
    }
}
