//! State synchronization.
//!
//! The keeper caches nothing between iterations: every iteration rebuilds a
//! [`PairState`](clmm_keeper_domain::entities::PairState) from the gateway.

mod snapshot;

pub use snapshot::*;
