use chrono::Utc;
use mexbt_core::Timestamp;
use mexbt_ports::Clock;

/// Wall-clock time in UTC
///
/// Ticker freshness is judged against this clock in production; exchange
/// server times are not corrected for drift.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
