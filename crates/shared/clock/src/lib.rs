//! mexbt Clock
//!
//! Time sources behind the [`Clock`] port:
//! - [`SystemClock`]: wall time, for production
//! - [`FixedClock`]: manually advanced time, for deterministic tests

mod fixed;
mod system;

pub use fixed::FixedClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use mexbt_ports::Clock;
