use crate::entities::Position;
use crate::token::Address;
use crate::value_objects::{InvalidShape, TickRange};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of the pair's on-chain liquidity shape, rebuilt every iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairState {
    pub token0: Address,
    pub token1: Address,
    /// Current pool price in ticks.
    pub current_tick: i32,
    /// Open positions, sorted by `tick_lower` (lower leg first).
    pub positions: Vec<Position>,
    /// When the current pair of positions was added.
    pub last_add_timestamp: Option<DateTime<Utc>>,
}

/// Classification of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairShape<'a> {
    /// No positions.
    Empty,
    /// Lower and upper leg, disjoint and ordered, with a known add time.
    Paired {
        lower: &'a Position,
        upper: &'a Position,
    },
    /// Anything else.
    Invalid(InvalidShape),
}

impl PairState {
    /// Builds a snapshot; positions are ordered by their lower bound.
    pub fn new(
        token0: Address,
        token1: Address,
        current_tick: i32,
        mut positions: Vec<Position>,
        last_add_timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        positions.sort_by_key(|p| (p.tick_lower, p.tick_upper));
        Self {
            token0,
            token1,
            current_tick,
            positions,
            last_add_timestamp,
        }
    }

    /// Classifies the snapshot. A pair without an add time cannot be aged and
    /// is treated as invalid.
    pub fn shape(&self) -> PairShape<'_> {
        match self.positions.as_slice() {
            [] => PairShape::Empty,
            [lower, upper] => {
                if !lower.range().is_below(&upper.range()) {
                    PairShape::Invalid(InvalidShape::Overlapping {
                        lower_end: lower.tick_upper,
                        upper_start: upper.tick_lower,
                    })
                } else if self.last_add_timestamp.is_none() {
                    PairShape::Invalid(InvalidShape::MissingAddTime)
                } else {
                    PairShape::Paired { lower, upper }
                }
            }
            other => PairShape::Invalid(InvalidShape::PositionCount { count: other.len() }),
        }
    }

    /// Time since the last add, if known.
    pub fn elapsed_since_add(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_add_timestamp.map(|added| now - added)
    }

    /// Range from the lowest to the highest tick covered by open positions.
    pub fn covered_span(&self) -> Option<TickRange> {
        let low = self.positions.iter().map(|p| p.tick_lower).min()?;
        let high = self.positions.iter().map(|p| p.tick_upper).max()?;
        TickRange::new(low, high).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenId;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn pos(id: u64, lower: i32, upper: i32) -> Position {
        Position::new(TokenId::from(id), lower, upper).unwrap()
    }

    fn added() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_positions_are_ordered_by_lower_tick() {
        let state = PairState::new(
            addr(1),
            addr(2),
            150,
            vec![pos(2, 200, 700), pos(1, 100, 200)],
            Some(added()),
        );
        assert_eq!(state.positions[0].tick_lower, 100);
        assert_eq!(state.positions[1].tick_lower, 200);
        assert!(matches!(state.shape(), PairShape::Paired { .. }));
        assert_eq!(state.covered_span(), TickRange::new(100, 700).ok());
    }

    #[test]
    fn test_shape_classification() {
        let empty = PairState::new(addr(1), addr(2), 0, vec![], None);
        assert_eq!(empty.shape(), PairShape::Empty);
        assert_eq!(empty.covered_span(), None);

        let single = PairState::new(addr(1), addr(2), 0, vec![pos(1, -10, 10)], None);
        assert_eq!(
            single.shape(),
            PairShape::Invalid(InvalidShape::PositionCount { count: 1 })
        );

        let overlapping = PairState::new(
            addr(1),
            addr(2),
            0,
            vec![pos(1, -10, 10), pos(2, 5, 20)],
            None,
        );
        assert_eq!(
            overlapping.shape(),
            PairShape::Invalid(InvalidShape::Overlapping {
                lower_end: 10,
                upper_start: 5
            })
        );

        let unaged = PairState::new(
            addr(1),
            addr(2),
            0,
            vec![pos(1, -10, 0), pos(2, 0, 10)],
            None,
        );
        assert_eq!(
            unaged.shape(),
            PairShape::Invalid(InvalidShape::MissingAddTime)
        );
    }

    #[test]
    fn test_elapsed_since_add() {
        let state = PairState::new(addr(1), addr(2), 0, vec![], Some(added()));
        let now = added() + Duration::seconds(100);
        assert_eq!(state.elapsed_since_add(now), Some(Duration::seconds(100)));
    }
}
