//! Configuration loading
//!
//! Supports JSON configuration files for:
//! - Currencies known to the system
//! - Exchanges, each with its markets and ticker field set
//! - Ticker cache settings

use mexbt_core::TickerSchema;
use mexbt_core::entities::ticker::{ASK, BID, DEFAULT_PERIOD_SECS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Currency codes (e.g., "BTC", "USD")
    #[serde(default)]
    pub currencies: Vec<String>,

    /// Exchanges and their markets
    #[serde(default)]
    pub exchanges: Vec<ExchangeConfig>,

    /// Ticker cache settings
    #[serde(default)]
    pub cache: CacheConfig,
}

impl RegistryConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Parse configuration from JSON string
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Bitstamp and Poloniex with their usual BTC markets
    pub fn with_default_exchanges() -> Self {
        let currencies = ["BTC", "USD", "EUR", "USDT", "ETH", "LTC"]
            .iter()
            .map(|c| c.to_string())
            .collect();

        let exchanges = vec![
            ExchangeConfig {
                name: "Bitstamp".to_string(),
                ticker: TickerConfig::from_schema(&TickerSchema::bitstamp()),
                markets: vec![
                    MarketConfig::new("BTC", "USD").with_code("btcusd"),
                    MarketConfig::new("BTC", "EUR").with_code("btceur"),
                ],
            },
            ExchangeConfig {
                name: "Poloniex".to_string(),
                ticker: TickerConfig::from_schema(&TickerSchema::poloniex()),
                markets: vec![
                    MarketConfig::new("BTC", "USDT"),
                    MarketConfig::new("ETH", "BTC"),
                    MarketConfig::new("LTC", "BTC"),
                ],
            },
        ];

        Self {
            currencies,
            exchanges,
            ..Default::default()
        }
    }

    /// Checks everything a registry needs to be built from this config
    pub fn validate(&self) -> ConfigResult<()> {
        let mut currencies = HashSet::new();
        for code in &self.currencies {
            if code.trim().is_empty() {
                return Err(ConfigError::InvalidCurrency(
                    "empty currency code".to_string(),
                ));
            }
            if !currencies.insert(code.as_str()) {
                return Err(ConfigError::InvalidCurrency(format!(
                    "{} declared twice",
                    code
                )));
            }
        }

        let mut exchange_names = HashSet::new();
        for exchange in &self.exchanges {
            if exchange.name.trim().is_empty() {
                return Err(ConfigError::InvalidExchange(
                    "empty exchange name".to_string(),
                ));
            }
            // exchange lookups are case-insensitive
            if !exchange_names.insert(exchange.name.to_lowercase()) {
                return Err(ConfigError::InvalidExchange(format!(
                    "{} declared twice",
                    exchange.name
                )));
            }
            exchange
                .ticker
                .to_schema(&exchange.name)
                .validate()
                .map_err(|e| ConfigError::InvalidTicker {
                    exchange: exchange.name.clone(),
                    reason: e.to_string(),
                })?;
            exchange.validate_markets(&currencies)?;
        }
        Ok(())
    }
}

/// One exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    pub name: String,
    /// Fields of this exchange's tickers
    #[serde(default)]
    pub ticker: TickerConfig,
    #[serde(default)]
    pub markets: Vec<MarketConfig>,
}

impl ExchangeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: TickerConfig::default(),
            markets: Vec::new(),
        }
    }

    pub fn with_market(mut self, market: MarketConfig) -> Self {
        self.markets.push(market);
        self
    }

    fn validate_markets(&self, currencies: &HashSet<&str>) -> ConfigResult<()> {
        let mut pairs = HashSet::new();
        let mut codes = HashSet::new();
        for market in &self.markets {
            let label = format!("{} {}/{}", self.name, market.base, market.counter);
            for code in [&market.base, &market.counter] {
                if !currencies.contains(code.as_str()) {
                    return Err(ConfigError::InvalidMarket(format!(
                        "{}: currency {} is not declared",
                        label, code
                    )));
                }
            }
            if market.base == market.counter {
                return Err(ConfigError::InvalidMarket(format!(
                    "{}: base and counter are the same",
                    label
                )));
            }
            if !pairs.insert((&market.base, &market.counter)) {
                return Err(ConfigError::InvalidMarket(format!("{} declared twice", label)));
            }
            if !codes.insert(market.code()) {
                return Err(ConfigError::InvalidMarket(format!(
                    "{}: code {} already used",
                    label,
                    market.code()
                )));
            }
        }
        Ok(())
    }
}

/// Ticker field set of an exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerConfig {
    #[serde(default = "default_rate_fields")]
    pub rate_fields: Vec<String>,
    #[serde(default)]
    pub number_fields: Vec<String>,
    /// Aggregation window of high/low/volume style fields
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
}

fn default_rate_fields() -> Vec<String> {
    vec![BID.to_string(), ASK.to_string()]
}

fn default_period_secs() -> u64 {
    DEFAULT_PERIOD_SECS
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            rate_fields: default_rate_fields(),
            number_fields: Vec::new(),
            period_secs: default_period_secs(),
        }
    }
}

impl TickerConfig {
    pub fn from_schema(schema: &TickerSchema) -> Self {
        Self {
            rate_fields: schema.rate_fields.clone(),
            number_fields: schema.number_fields.clone(),
            period_secs: schema.period_secs,
        }
    }

    /// The schema, named after the exchange; not validated
    pub fn to_schema(&self, exchange: &str) -> TickerSchema {
        TickerSchema {
            name: exchange.to_string(),
            rate_fields: self.rate_fields.clone(),
            number_fields: self.number_fields.clone(),
            period_secs: self.period_secs,
        }
    }
}

/// One market on an exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Base currency (e.g., "BTC")
    pub base: String,
    /// Counter currency (e.g., "USD")
    pub counter: String,
    /// Exchange pair code; defaults to `COUNTER_BASE`
    #[serde(default)]
    pub code: Option<String>,
}

impl MarketConfig {
    pub fn new(base: &str, counter: &str) -> Self {
        Self {
            base: base.to_string(),
            counter: counter.to_string(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| format!("{}_{}", self.counter, self.base))
    }
}

/// Ticker cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long a fetched ticker is served before refetching
    #[serde(default = "default_ticker_max_age_ms")]
    pub ticker_max_age_ms: u64,
}

fn default_ticker_max_age_ms() -> u64 {
    1000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ticker_max_age_ms: default_ticker_max_age_ms(),
        }
    }
}
