//! mexbt Core Domain
//!
//! Exchange-independent types for talking to cryptocurrency markets: the
//! currency algebra (currencies, exact exchange rates, amounts) and the
//! market entities built on it (markets, orders, tickers, order books).
//! This crate does no I/O.

pub mod entities;
pub mod error;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Markets
    Market,
    MarketList,
    MarketQuery,
    // Market data
    Order,
    OrderBuilder,
    Orderbook,
    Side,
    Ticker,
    TickerFields,
    TickerSchema,
};
pub use error::{
    CurrencyError, CurrencyResult, MarketError, MarketResult, NumericError, NumericResult,
};
pub use values::{
    Amount, Currency, CurrencyPair, ExchangeRate, NumericInput, PrecisionPolicy, Rational,
    Timestamp,
};
