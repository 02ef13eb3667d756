//! Prelude module for convenient imports.

pub use crate::clock::SimClock;
pub use crate::event::{LedgerEvent, SettledLeg};
pub use crate::ledger::{SimulatedConnector, SimulatedLedger, SimulatedLedgerConfig};
pub use crate::market::spawn_tick_driver;
pub use crate::tick_path::{GaussianTickWalk, ReplayTickPath, TickPathGenerator};
