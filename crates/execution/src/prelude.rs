//! Prelude module for convenient imports.
//!
//! ```rust
//! use clmm_keeper_execution::prelude::*;
//! ```

pub use crate::alerts::{
    Alert, AlertLevel, ConsoleNotifier, MultiNotifier, NotificationSink, Notifier, NotifyError,
    WebhookNotifier,
};
pub use crate::clock::{Clock, SystemClock};
pub use crate::config::{ConfigError, KeeperConfig, NotificationConfig, PolicyConfig, RuntimeConfig};
pub use crate::control::{ControlLoop, IterationReport, LoopPhase};
pub use crate::error::{
    ExecutionError, FetchError, SupervisorError, TransactionError, TxKind, error_chain,
};
pub use crate::strategy::{RebalancePolicy, evaluate};
pub use crate::supervisor::{SessionError, Supervisor};
pub use crate::sync::fetch_pair_state;
