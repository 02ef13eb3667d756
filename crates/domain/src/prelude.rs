//! Prelude module for convenient imports.
//!
//! ```rust
//! use clmm_keeper_domain::prelude::*;
//! ```

pub use crate::entities::{PairShape, PairState, Position};
pub use crate::errors::DomainError;
pub use crate::math::price_tick::{MAX_TICK, MIN_TICK, tick_to_price};
pub use crate::token::{Address, TokenAmount, TokenId};
pub use crate::value_objects::{Action, InvalidShape, Side, TickRange};
