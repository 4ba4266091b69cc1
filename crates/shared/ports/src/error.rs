use mexbt_core::MarketError;
use thiserror::Error;

/// Errors reported by market data sources and active participants
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Not supported by this source: {0}")]
    NotSupported(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Order already closed: {0}")]
    OrderAlreadyClosed(String),

    #[error("Order execution failed: {0}")]
    Execution(String),

    #[error(transparent)]
    Market(#[from] MarketError),
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;
