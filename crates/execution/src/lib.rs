//! Keeper engine for a two-sided concentrated-liquidity range.
//!
//! This crate provides the runtime that manages one token pair:
//! - Typed configuration with environment overrides
//! - The pure rebalance policy
//! - Pair snapshots read fresh from the gateway every iteration
//! - The control loop state machine
//! - A supervisor that restarts failed sessions
//! - Best-effort alert delivery

/// Prelude module for convenient imports.
pub mod prelude;

/// Alert system.
pub mod alerts;
/// Time source for policy evaluation.
pub mod clock;
/// Keeper configuration.
pub mod config;
/// Control loop.
pub mod control;
/// Error types.
pub mod error;
/// Rebalance policy.
pub mod strategy;
/// Session supervisor.
pub mod supervisor;
/// State synchronization.
pub mod sync;

#[cfg(test)]
mod test_support;
