use crate::errors::DomainError;
use crate::token::TokenId;
use crate::value_objects::TickRange;
use serde::{Deserialize, Serialize};

/// One open liquidity range, owned as a position NFT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Id of the position NFT.
    pub token_id: TokenId,
    /// Inclusive lower bound in ticks.
    pub tick_lower: i32,
    /// Inclusive upper bound in ticks.
    pub tick_upper: i32,
}

impl Position {
    /// Creates a new position, rejecting `tick_lower >= tick_upper`.
    pub fn new(token_id: TokenId, tick_lower: i32, tick_upper: i32) -> Result<Self, DomainError> {
        let range = TickRange::new(tick_lower, tick_upper)?;
        Ok(Self::from_range(token_id, range))
    }

    /// Creates a position from an already validated range.
    pub fn from_range(token_id: TokenId, range: TickRange) -> Self {
        Self {
            token_id,
            tick_lower: range.tick_lower,
            tick_upper: range.tick_upper,
        }
    }

    /// Returns the position's tick range.
    pub fn range(&self) -> TickRange {
        TickRange {
            tick_lower: self.tick_lower,
            tick_upper: self.tick_upper,
        }
    }

    /// Returns the width in ticks.
    pub fn width(&self) -> i32 {
        self.tick_upper - self.tick_lower
    }
}
