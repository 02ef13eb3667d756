//! Rebalance decisions.

mod policy;

pub use policy::*;
