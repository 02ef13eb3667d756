use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// Time source for simulated blocks.
///
/// `wall()` follows the system clock; `manual(start)` only moves when
/// [`SimClock::advance`] is called. Clones share the same manual time.
#[derive(Debug, Clone)]
pub struct SimClock {
    manual: Option<Arc<Mutex<DateTime<Utc>>>>,
}

impl SimClock {
    /// Creates a clock that follows system time.
    pub fn wall() -> Self {
        Self { manual: None }
    }

    /// Creates a clock frozen at `start`.
    pub fn manual(start: DateTime<Utc>) -> Self {
        Self {
            manual: Some(Arc::new(Mutex::new(start))),
        }
    }

    /// Returns the current block time.
    pub fn now(&self) -> DateTime<Utc> {
        match &self.manual {
            Some(time) => *time.lock().unwrap_or_else(|e| e.into_inner()),
            None => Utc::now(),
        }
    }

    /// Moves manual time forward. No-op for the wall clock.
    pub fn advance(&self, by: Duration) {
        if let Some(time) = &self.manual {
            let mut guard = time.lock().unwrap_or_else(|e| e.into_inner());
            *guard += by;
        }
    }

    /// Returns true if time only moves through `advance`.
    pub fn is_manual(&self) -> bool {
        self.manual.is_some()
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::wall()
    }
}
