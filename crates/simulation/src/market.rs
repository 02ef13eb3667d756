//! Background task moving the simulated pool price.

use crate::ledger::SimulatedLedger;
use crate::tick_path::TickPathGenerator;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

/// Spawns a task that applies the next tick of `path` every `period`.
///
/// The task runs until aborted through the returned handle.
pub fn spawn_tick_driver<P>(
    ledger: Arc<SimulatedLedger>,
    mut path: P,
    period: Duration,
) -> JoinHandle<()>
where
    P: TickPathGenerator + 'static,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; keep the starting price for one period.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let tick = path.next_tick();
            ledger.set_tick(tick).await;
            debug!(tick, "Market moved");
        }
    })
}
