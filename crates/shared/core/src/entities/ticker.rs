use chrono::TimeDelta;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use super::Market;
use crate::error::{MarketError, MarketResult};
use crate::values::{Amount, ExchangeRate, NumericInput, Timestamp};

pub const BID: &str = "bid";
pub const ASK: &str = "ask";

/// Default aggregation window for high/low/volume style fields
pub const DEFAULT_PERIOD_SECS: u64 = 24 * 60 * 60;

fn default_period_secs() -> u64 {
    DEFAULT_PERIOD_SECS
}

/// The set of fields a ticker variant carries
///
/// Every schema has at least `bid` and `ask` rate fields. Rate fields hold
/// exchange rates on the ticker's market, number fields hold plain decimals
/// (volumes and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerSchema {
    pub name: String,
    pub rate_fields: Vec<String>,
    #[serde(default)]
    pub number_fields: Vec<String>,
    /// Window (seconds) that aggregated fields refer to
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

impl TickerSchema {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        rate_fields: impl IntoIterator<Item = S>,
        number_fields: impl IntoIterator<Item = S>,
    ) -> MarketResult<Self> {
        let schema = Self {
            name: name.into(),
            rate_fields: rate_fields.into_iter().map(Into::into).collect(),
            number_fields: number_fields.into_iter().map(Into::into).collect(),
            period_secs: DEFAULT_PERIOD_SECS,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn with_period_secs(mut self, period_secs: u64) -> Self {
        self.period_secs = period_secs;
        self
    }

    /// Just bid and ask
    pub fn basic() -> Self {
        Self::preset("basic", &[BID, ASK], &[])
    }

    pub fn poloniex() -> Self {
        Self::preset("poloniex", &[BID, ASK, "last", "high", "low"], &[])
    }

    pub fn bitstamp() -> Self {
        Self::preset(
            "bitstamp",
            &[BID, ASK, "last", "high", "low", "vwap", "open"],
            &["volume"],
        )
    }

    fn preset(name: &str, rates: &[&str], numbers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            rate_fields: rates.iter().map(|s| s.to_string()).collect(),
            number_fields: numbers.iter().map(|s| s.to_string()).collect(),
            period_secs: DEFAULT_PERIOD_SECS,
        }
    }

    pub fn validate(&self) -> MarketResult<()> {
        let invalid = |reason: String| MarketError::InvalidSchema {
            schema: self.name.clone(),
            reason,
        };

        for required in [BID, ASK] {
            if !self.is_rate_field(required) {
                return Err(invalid(format!("missing rate field {}", required)));
            }
        }

        let mut seen = BTreeSet::new();
        for field in self.fields() {
            if field.is_empty() {
                return Err(invalid("empty field name".to_string()));
            }
            if !seen.insert(field) {
                return Err(invalid(format!("field {} declared twice", field)));
            }
        }
        Ok(())
    }

    pub fn period(&self) -> TimeDelta {
        i64::try_from(self.period_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    pub fn is_rate_field(&self, field: &str) -> bool {
        self.rate_fields.iter().any(|f| f == field)
    }

    pub fn is_number_field(&self, field: &str) -> bool {
        self.number_fields.iter().any(|f| f == field)
    }

    /// All field names, rate fields first
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rate_fields
            .iter()
            .chain(self.number_fields.iter())
            .map(String::as_str)
    }
}

/// Field values for [`Ticker::new`]
#[derive(Debug, Clone, Default)]
pub struct TickerFields {
    rates: BTreeMap<String, ExchangeRate>,
    numbers: BTreeMap<String, Decimal>,
}

impl TickerFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(mut self, name: impl Into<String>, rate: ExchangeRate) -> Self {
        self.rates.insert(name.into(), rate);
        self
    }

    pub fn number(mut self, name: impl Into<String>, value: Decimal) -> Self {
        self.numbers.insert(name.into(), value);
        self
    }
}

/// A ticker datapoint for one market
///
/// Carries exactly the fields of its schema, and the bid is always below
/// the ask.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    #[serde(skip)]
    schema: Arc<TickerSchema>,
    market: Market,
    /// Preferably the server time, in UTC
    time: Timestamp,
    rates: BTreeMap<String, ExchangeRate>,
    numbers: BTreeMap<String, Decimal>,
}

impl Ticker {
    pub fn new(
        schema: Arc<TickerSchema>,
        market: Market,
        time: Timestamp,
        fields: TickerFields,
    ) -> MarketResult<Self> {
        schema.validate()?;
        let TickerFields { rates, numbers } = fields;

        let missing: Vec<String> = schema
            .rate_fields
            .iter()
            .filter(|f| !rates.contains_key(*f))
            .chain(schema.number_fields.iter().filter(|f| !numbers.contains_key(*f)))
            .cloned()
            .collect();
        let extra: Vec<String> = rates
            .keys()
            .filter(|f| !schema.is_rate_field(f))
            .chain(numbers.keys().filter(|f| !schema.is_number_field(f)))
            .cloned()
            .collect();
        if !missing.is_empty() || !extra.is_empty() {
            return Err(MarketError::FieldMismatch {
                schema: schema.name.clone(),
                missing,
                extra,
            });
        }

        for (field, rate) in &rates {
            if !rate.currencies().same_currencies(market.currencies()) {
                return Err(MarketError::RateOffMarket {
                    field: field.clone(),
                    market: market.full_name(),
                });
            }
        }

        if let (Some(bid), Some(ask)) = (rates.get(BID), rates.get(ASK)) {
            let base = market.base();
            if bid.per(base)?.try_cmp(&ask.per(base)?)? != Ordering::Less {
                return Err(MarketError::CrossedTicker {
                    bid: bid.to_string(),
                    ask: ask.to_string(),
                });
            }
        }

        Ok(Self {
            schema,
            market,
            time,
            rates,
            numbers,
        })
    }

    /// Build a ticker from raw quotes, the way exchange adapters do
    ///
    /// Rate fields become `market.create_rate(value)`; number fields are
    /// parsed as exact decimals.
    pub fn from_quotes<K, V>(
        schema: Arc<TickerSchema>,
        market: Market,
        time: Timestamp,
        quotes: impl IntoIterator<Item = (K, V)>,
    ) -> MarketResult<Self>
    where
        K: Into<String>,
        V: Into<NumericInput>,
    {
        let mut fields = TickerFields::new();
        let mut seen = BTreeSet::new();
        let mut repeated = Vec::new();
        for (name, value) in quotes {
            let name = name.into();
            if !seen.insert(name.clone()) {
                repeated.push(name);
                continue;
            }
            let value = value.into();
            fields = if schema.is_number_field(&name) {
                fields.number(name, value.to_decimal()?)
            } else {
                // unknown names land here and get reported as extra fields
                let rate = market.create_rate(value)?;
                fields.rate(name, rate)
            };
        }
        if !repeated.is_empty() {
            return Err(MarketError::FieldMismatch {
                schema: schema.name.clone(),
                missing: Vec::new(),
                extra: repeated,
            });
        }
        Self::new(schema, market, time, fields)
    }

    pub fn schema(&self) -> &TickerSchema {
        &self.schema
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn time(&self) -> &Timestamp {
        &self.time
    }

    pub fn bid(&self) -> &ExchangeRate {
        // presence checked in new()
        &self.rates[BID]
    }

    pub fn ask(&self) -> &ExchangeRate {
        &self.rates[ASK]
    }

    pub fn rate(&self, field: &str) -> Option<&ExchangeRate> {
        self.rates.get(field)
    }

    pub fn number(&self, field: &str) -> Option<&Decimal> {
        self.numbers.get(field)
    }

    pub fn rates(&self) -> &BTreeMap<String, ExchangeRate> {
        &self.rates
    }

    pub fn numbers(&self) -> &BTreeMap<String, Decimal> {
        &self.numbers
    }

    /// Ask minus bid, in the market's counter currency per base unit
    pub fn spread(&self) -> MarketResult<Amount> {
        let base = self.market.base();
        let bid = self.bid().per(base)?;
        let ask = self.ask().per(base)?;
        let spread = ask.rate() - bid.rate();
        Ok(Amount::from_rational(spread, self.market.counter().clone()))
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Ticker({}, {}", self.market, self.time)?;
        for (name, rate) in &self.rates {
            write!(f, ", {}: {}", name, rate)?;
        }
        for (name, number) in &self.numbers {
            write!(f, ", {}: {}", name, number)?;
        }
        write!(f, ")>")
    }
}
