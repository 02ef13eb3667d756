//! In-process chain simulation.
//!
//! Provides a [`SimulatedLedger`] that implements the keeper's gateway traits
//! against an in-memory pool, plus tick path generators to move its price.
//! Used by tests and by the CLI's paper-trading mode.

/// Simulation clock.
pub mod clock;
/// Settled ledger events.
pub mod event;
/// In-memory ledger and connector.
pub mod ledger;
/// Background price driver.
pub mod market;
/// Tick path generators.
pub mod tick_path;

/// Prelude module for convenient imports.
pub mod prelude;

pub use clock::SimClock;
pub use ledger::{SimulatedConnector, SimulatedLedger, SimulatedLedgerConfig};
