use crate::gateway::TxHandle;
use clmm_keeper_domain::token::TokenId;
use thiserror::Error;

/// Failures reported by a gateway implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("rpc call {method} failed: {message}")]
    Rpc { method: &'static str, message: String },

    #[error("transaction {tx} reverted: {reason}")]
    Reverted { tx: TxHandle, reason: String },

    #[error("transaction {tx} was not settled in time")]
    Timeout { tx: TxHandle },

    #[error("unknown position {0}")]
    UnknownPosition(TokenId),

    #[error("unknown transaction {0}")]
    UnknownTransaction(TxHandle),

    #[error("gateway session is disconnected")]
    Disconnected,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("connection failed: {0}")]
    Connect(String),
}

impl GatewayError {
    /// Creates an RPC error for `method`.
    pub fn rpc(method: &'static str, message: impl Into<String>) -> Self {
        Self::Rpc {
            method,
            message: message.into(),
        }
    }
}
