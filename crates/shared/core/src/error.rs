//! Error types for the core crate

use thiserror::Error;

use crate::values::{Currency, CurrencyPair};

/// Numeric conversion errors (building exact rationals from inputs)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Can't parse {0:?} as an exact number")]
    Unparseable(String),

    #[error("{0} is not a finite number")]
    NonFinite(f64),

    #[error("{0} (f64) is not an exact numeric input")]
    PrecisionLoss(f64),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Exchange rates must be positive, got {0}")]
    NonPositiveRate(String),
}

/// Currency algebra errors
///
/// These are always caller errors (an operation between incompatible
/// currencies), never transient conditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurrencyError {
    #[error("{pair} cannot handle currency {currency}")]
    WrongCurrency { pair: CurrencyPair, currency: Currency },

    #[error("Can't create a pair with the same currency: {0}")]
    SameCurrency(Currency),

    #[error("The pairs have no common currencies ({left}, {right})")]
    NoCommonCurrency { left: CurrencyPair, right: CurrencyPair },

    #[error("Both pairs have the same two currencies {0}")]
    BothCurrenciesShared(CurrencyPair),

    #[error("Can't combine amounts in different currencies: {left} and {right}")]
    MismatchedCurrencies { left: Currency, right: Currency },

    #[error("Can't combine exchange rates on different pairs: {left} and {right}")]
    MismatchedPairs { left: CurrencyPair, right: CurrencyPair },

    #[error("Can't compare exchange rates on different pairs: {left} and {right}")]
    Incomparable { left: CurrencyPair, right: CurrencyPair },

    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Market entity errors (tickers, orders, order books, market lookup)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Missing/extra fields for {schema} ticker: missing {missing:?}, extra {extra:?}")]
    FieldMismatch {
        schema: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },

    #[error("Invalid ticker schema {schema}: {reason}")]
    InvalidSchema { schema: String, reason: String },

    #[error("Ticker field {field} is not quoted on market {market}")]
    RateOffMarket { field: String, market: String },

    #[error("Crossed ticker: bid {bid} is not below ask {ask}")]
    CrossedTicker { bid: String, ask: String },

    #[error("Bid rates are not strictly descending at index {index}")]
    UnsortedBids { index: usize },

    #[error("Ask rates are not strictly ascending at index {index}")]
    UnsortedAsks { index: usize },

    #[error("Crossed book: best bid {bid} is not below best ask {ask}")]
    CrossedBook { bid: String, ask: String },

    #[error("Order at index {index} is on the wrong side of the book (expected {expected})")]
    WrongSide { index: usize, expected: String },

    #[error("Order at index {index} on the {side} side has no exchange rate")]
    NotALimitOrder { index: usize, side: String },

    #[error("Market is not set on order {0}")]
    MarketNotSet(String),

    #[error("Market order {0} has no exchange rate until filled")]
    MarketOrderHasNoRate(String),

    #[error("Order amounts can't be negative: {0}")]
    NegativeAmount(String),

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("No markets found for {0}")]
    NoMatch(String),

    #[error("{count} markets found for {query}, expected one")]
    AmbiguousMatch { query: String, count: usize },

    #[error(transparent)]
    Currency(#[from] CurrencyError),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}

pub type NumericResult<T> = std::result::Result<T, NumericError>;
pub type CurrencyResult<T> = std::result::Result<T, CurrencyError>;
pub type MarketResult<T> = std::result::Result<T, MarketError>;
