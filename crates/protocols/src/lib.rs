//! Capability interfaces for the chain the keeper acts on.
//!
//! The keeper core never talks to an RPC node directly. It consumes:
//! - [`LedgerGateway`]: position queries and liquidity-mutating transactions
//! - [`LedgerConnector`]: opens a fresh gateway session per supervisor cycle
//!
//! Concrete bindings live outside this crate.

/// Wallet and RPC credentials.
pub mod credentials;
/// Gateway errors.
pub mod error;
/// Gateway and connector traits.
pub mod gateway;
/// Session identity.
pub mod session;

pub use credentials::{Credentials, SecretString};
pub use error::GatewayError;
pub use gateway::{LedgerConnector, LedgerGateway, LiquidityLeg, Settlement, TxHandle};
pub use session::GatewaySession;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::credentials::{Credentials, SecretString};
    pub use crate::error::GatewayError;
    pub use crate::gateway::{LedgerConnector, LedgerGateway, LiquidityLeg, Settlement, TxHandle};
    pub use crate::session::GatewaySession;
}
