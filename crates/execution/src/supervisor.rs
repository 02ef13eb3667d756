//! Session supervisor.
//!
//! The only place that retries. Every failure, whether connecting or inside
//! the control loop, ends the session; after a fixed backoff a brand-new
//! session is opened and the pair state is re-derived from the chain.

use crate::alerts::{Alert, NotificationSink};
use crate::clock::{Clock, SystemClock};
use crate::config::KeeperConfig;
use crate::control::{ControlLoop, LoopPhase};
use crate::error::{ExecutionError, SupervisorError, error_chain};
use crate::strategy::RebalancePolicy;
use clmm_keeper_protocols::{GatewayError, LedgerConnector};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a session ended.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open a gateway session")]
    Connect(#[source] GatewayError),

    #[error("control loop failed while {phase} after {iterations} iterations")]
    Loop {
        phase: LoopPhase,
        iterations: u64,
        #[source]
        source: ExecutionError,
    },
}

impl SessionError {
    /// Returns true if the session completed at least one iteration.
    fn made_progress(&self) -> bool {
        matches!(self, Self::Loop { iterations, .. } if *iterations > 0)
    }
}

/// Restarts the control loop on a fresh session after every failure.
pub struct Supervisor<C> {
    connector: C,
    config: KeeperConfig,
    sink: NotificationSink,
    clock: Arc<dyn Clock>,
    sessions: u64,
}

impl<C: LedgerConnector> Supervisor<C> {
    /// Creates a new supervisor using the system clock.
    pub fn new(connector: C, config: KeeperConfig, sink: NotificationSink) -> Self {
        Self {
            connector,
            config,
            sink,
            clock: Arc::new(SystemClock),
            sessions: 0,
        }
    }

    /// Replaces the clock handed to each control loop.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sessions opened so far.
    pub fn sessions(&self) -> u64 {
        self.sessions
    }

    /// Runs until the restart limit is hit.
    pub async fn run(&mut self) -> Result<(), SupervisorError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs until `shutdown` resolves or the restart limit is hit.
    pub async fn run_until<S>(&mut self, shutdown: S) -> Result<(), SupervisorError>
    where
        S: Future<Output = ()>,
    {
        self.config.validate()?;
        tokio::pin!(shutdown);

        let backoff = self.config.runtime.restart_backoff();
        let max_restarts = self.config.runtime.max_restarts;
        let mut restarts: u32 = 0;

        info!(
            token0 = %self.config.token0,
            token1 = %self.config.token1,
            backoff_secs = backoff.as_secs(),
            max_restarts = ?max_restarts,
            "Starting supervisor"
        );

        loop {
            self.sessions += 1;
            let err = match self.run_session(shutdown.as_mut()).await {
                Ok(()) => {
                    info!(sessions = self.sessions, "Supervisor stopped");
                    return Ok(());
                }
                Err(e) => e,
            };

            if err.made_progress() {
                restarts = 0;
            }
            restarts = restarts.saturating_add(1);
            let chain = error_chain(&err);
            error!(
                session = self.sessions,
                restarts,
                error = %chain,
                "Keeper session failed"
            );
            self.sink
                .send(Alert::critical("Keeper session failed", chain.clone()))
                .await;

            if let Some(limit) = max_restarts
                && restarts > limit
            {
                error!(restarts, limit, "Restart limit reached, giving up");
                self.sink
                    .send(Alert::critical(
                        "Keeper stopped",
                        format!("gave up after {restarts} consecutive failed sessions"),
                    ))
                    .await;
                return Err(SupervisorError::RestartLimit {
                    restarts,
                    last_error: chain,
                });
            }

            warn!(
                backoff_secs = backoff.as_secs(),
                restarts, "Restarting after backoff"
            );
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => {
                    info!(sessions = self.sessions, "Supervisor stopped during backoff");
                    return Ok(());
                }
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    async fn run_session<S>(&mut self, shutdown: Pin<&mut S>) -> Result<(), SessionError>
    where
        S: Future<Output = ()>,
    {
        let (gateway, session) = self
            .connector
            .connect(
                &self.config.credentials,
                &self.config.token0,
                &self.config.token1,
            )
            .await
            .map_err(SessionError::Connect)?;
        info!(
            session = %session.id,
            number = self.sessions,
            account = %session.account,
            "Opened gateway session"
        );

        let mut control = ControlLoop::new(
            gateway,
            session,
            RebalancePolicy::new(self.config.policy.clone()),
            self.config.runtime.poll_interval(),
            self.clock.clone(),
            self.sink.clone(),
        );
        let outcome = control.run_until(shutdown).await;
        outcome.map_err(|source| SessionError::Loop {
            phase: control.phase(),
            iterations: control.iterations(),
            source,
        })
    }
}
