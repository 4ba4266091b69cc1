//! Error types for the registry crate

use mexbt_core::{CurrencyError, MarketError};
use mexbt_ports::SourceError;
use mexbt_pubsub::SubscriptionError;
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid currency config: {0}")]
    InvalidCurrency(String),

    #[error("Invalid exchange config: {0}")]
    InvalidExchange(String),

    #[error("Invalid market config: {0}")]
    InvalidMarket(String),

    #[error("Invalid ticker config for {exchange}: {reason}")]
    InvalidTicker { exchange: String, reason: String },
}

/// Registry lookup and wiring errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    #[error("Unknown market: {0}")]
    UnknownMarket(String),

    #[error("A source is already registered for {0}")]
    DuplicateSource(String),

    #[error("No source registered for {0}")]
    NoSource(String),

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;
