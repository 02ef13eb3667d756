//! Shared fixtures for unit tests.

use crate::alerts::{Alert, Notifier, NotifyError};
use crate::clock::Clock;
use crate::config::KeeperConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clmm_keeper_domain::token::{Address, TokenAmount};
use clmm_keeper_protocols::SecretString;
use clmm_keeper_simulation::{SimClock, SimulatedLedger, SimulatedLedgerConfig};
use primitive_types::U256;
use std::sync::{Arc, Mutex};

impl Clock for SimClock {
    fn now(&self) -> DateTime<Utc> {
        SimClock::now(self)
    }
}

pub(crate) fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

pub(crate) fn amount(v: u64) -> TokenAmount {
    TokenAmount(U256::from(v))
}

pub(crate) fn start() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

/// Ledger for account `addr(9)` on the pair `addr(1)`/`addr(2)`.
pub(crate) fn ledger(tick: i32, balance0: TokenAmount, balance1: TokenAmount) -> Arc<SimulatedLedger> {
    SimulatedLedger::shared(
        SimulatedLedgerConfig::new(addr(9), addr(1), addr(2), start())
            .with_tick(tick)
            .with_balances(balance0, balance1),
    )
}

/// Valid config for the test pair with a 1 s poll and no backoff.
pub(crate) fn keeper_config() -> KeeperConfig {
    let mut config = KeeperConfig::new(addr(1), addr(2));
    config.credentials.private_key = SecretString::new("0x01");
    config.runtime.poll_interval_secs = 1;
    config.runtime.restart_backoff_secs = 0;
    config
}

/// Keeps every alert it receives.
#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<Alert>>>,
}

impl RecordingNotifier {
    pub(crate) fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        self.alerts.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Rejects every alert.
pub(crate) struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _alert: &Alert) -> Result<(), NotifyError> {
        Err(NotifyError::Api("channel_not_found".to_string()))
    }
}
