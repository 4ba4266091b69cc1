//! mexbt Ports
//!
//! Port definitions (traits) for mexbt.
//! These define the boundaries between the domain and exchange adapters.

mod clock;
mod error;
mod source;

pub use clock::Clock;
pub use error::{SourceError, SourceResult};
pub use source::{ActiveParticipant, Credentials, MarketDataSource};
