//! Domain model for the concentrated-liquidity range keeper.
//!
//! This crate holds the pure value types shared by every other crate:
//! - Token and account addresses, position token ids and raw amounts
//! - Tick math and tick ranges
//! - Positions and the per-iteration pair snapshot
//! - The actions produced by the rebalance policy

/// Domain entities.
pub mod entities;
/// Domain errors.
pub mod errors;
/// Tick and amount math.
pub mod math;
/// Addresses, ids and amounts.
pub mod token;
/// Value objects.
pub mod value_objects;

/// Prelude module for convenient imports.
pub mod prelude;
