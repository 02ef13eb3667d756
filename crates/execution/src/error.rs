//! Error taxonomy of the control loop and supervisor.
//!
//! Fetch and transaction failures abort the current iteration and are handled
//! only by the supervisor. An invalid position count is not an error: the
//! policy answers it with a liquidation.

use crate::config::ConfigError;
use clmm_keeper_domain::errors::DomainError;
use clmm_keeper_domain::token::TokenId;
use clmm_keeper_protocols::GatewayError;
use std::fmt;
use thiserror::Error;

/// Reading the pair's state failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {call}")]
    Read {
        call: &'static str,
        #[source]
        source: GatewayError,
    },

    #[error("position count {count} disagrees with {ids} listed ids")]
    Inconsistent { count: usize, ids: usize },
}

impl FetchError {
    pub(crate) fn read(call: &'static str) -> impl FnOnce(GatewayError) -> Self {
        move |source| Self::Read { call, source }
    }
}

/// Which liquidity operation a transaction belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Add,
    Remove,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("add-liquidity"),
            Self::Remove => f.write_str("remove-liquidity"),
        }
    }
}

/// Submitting or settling a transaction failed.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("failed to submit {kind} transaction")]
    Submit {
        kind: TxKind,
        #[source]
        source: GatewayError,
    },

    #[error("{kind} transaction did not settle")]
    Settle {
        kind: TxKind,
        #[source]
        source: GatewayError,
    },
}

impl TransactionError {
    /// Returns the operation the transaction belonged to.
    pub fn kind(&self) -> TxKind {
        match self {
            Self::Submit { kind, .. } | Self::Settle { kind, .. } => *kind,
        }
    }

    /// Returns true if the chain rejected the transaction.
    pub fn is_revert(&self) -> bool {
        matches!(
            self,
            Self::Settle {
                source: GatewayError::Reverted { .. },
                ..
            }
        )
    }
}

/// Any failure inside one control loop iteration.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("wallet holds neither token0 nor token1")]
    InsufficientBalance,

    #[error("cannot build ranges around the current tick")]
    Range(#[from] DomainError),

    #[error("positions {0:?} are still open after liquidation")]
    LeftoverPositions(Vec<TokenId>),
}

/// Supervisor termination reasons.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("refusing to start with an invalid configuration")]
    Config(#[from] ConfigError),

    #[error("gave up after {restarts} consecutive failed sessions; last error: {last_error}")]
    RestartLimit { restarts: u32, last_error: String },
}

/// Renders an error and its sources, one per line.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_keeper_protocols::TxHandle;

    #[test]
    fn test_error_chain_lists_sources() {
        let err = ExecutionError::from(TransactionError::Settle {
            kind: TxKind::Remove,
            source: GatewayError::Reverted {
                tx: TxHandle("0xabc".to_string()),
                reason: "STF".to_string(),
            },
        });
        let chain = error_chain(&err);
        assert_eq!(
            chain,
            "remove-liquidity transaction did not settle\n  caused by: transaction 0xabc reverted: STF"
        );
    }

    #[test]
    fn test_revert_detection() {
        let reverted = TransactionError::Settle {
            kind: TxKind::Add,
            source: GatewayError::Reverted {
                tx: TxHandle("0x1".to_string()),
                reason: "x".to_string(),
            },
        };
        assert!(reverted.is_revert());
        assert_eq!(reverted.kind(), TxKind::Add);

        let timeout = TransactionError::Settle {
            kind: TxKind::Add,
            source: GatewayError::Timeout {
                tx: TxHandle("0x1".to_string()),
            },
        };
        assert!(!timeout.is_revert());
    }
}
