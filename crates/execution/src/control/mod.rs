//! Control loop.
//!
//! One sequential task per pair:
//! - fetch a fresh pair snapshot
//! - evaluate the rebalance policy
//! - execute the resulting action and wait for every settlement
//!
//! Errors abort the iteration and are handed to the supervisor; the loop never
//! retries on its own.

mod control_loop;
mod phase;

pub use control_loop::*;
pub use phase::*;
