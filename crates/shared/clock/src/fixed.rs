use chrono::Duration;
use mexbt_core::Timestamp;
use mexbt_ports::Clock;
use std::sync::RwLock;

/// A clock that only moves when told to
///
/// Used to test anything time-dependent (cache expiry, ticker periods)
/// without sleeping.
#[derive(Debug)]
pub struct FixedClock {
    current_time: RwLock<Timestamp>,
}

impl FixedClock {
    pub fn new(time: Timestamp) -> Self {
        Self {
            current_time: RwLock::new(time),
        }
    }

    /// Move time forward (or back, with a negative duration)
    pub fn advance(&self, duration: Duration) {
        let mut time = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *time += duration;
    }

    pub fn set(&self, time: Timestamp) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = time;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self
            .current_time
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn name(&self) -> &str {
        "FixedClock"
    }
}
