//! mexbt Registry
//!
//! Wires the domain together from a JSON configuration:
//! - `RegistryConfig`: currencies, exchanges with their markets and ticker
//!   fields, cache settings
//! - `Registry`: lookups, one ticker stream per exchange, data sources
//!   registered by exchange adapters
//! - `TickerCache`: the latest ticker per market, refetched once stale

pub mod cache;
pub mod config;
pub mod error;
pub mod registry;

pub use cache::TickerCache;
pub use config::{CacheConfig, ExchangeConfig, MarketConfig, RegistryConfig, TickerConfig};
pub use error::{ConfigError, ConfigResult, RegistryError, RegistryResult};
pub use registry::Registry;
