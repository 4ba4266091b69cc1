//! Currency algebra: currencies, pairs, exchange rates and amounts
//!
//! All values are immutable; every operation returns a new value. Anything
//! that mixes incompatible currencies fails with a [`CurrencyError`](crate::CurrencyError)
//! instead of coercing.

use chrono::{DateTime, Utc};

mod amount;
mod currency;
pub mod numeric;
mod rate;

pub use amount::Amount;
pub use currency::{Currency, CurrencyPair};
pub use numeric::{NumericInput, PrecisionPolicy, Rational};
pub use rate::ExchangeRate;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;
