//! Exchange/market registry built from configuration

use log::info;
use mexbt_clock::SystemClock;
use mexbt_core::{Currency, Market, MarketList, MarketQuery, Orderbook, Ticker, TickerSchema};
use mexbt_ports::{Clock, MarketDataSource};
use mexbt_pubsub::{MultitopicPublisher, Subscription, Topic, Topics};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::cache::TickerCache;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};

struct ExchangeEntry {
    name: String,
    schema: Arc<TickerSchema>,
    markets: MarketList,
    tickers: MultitopicPublisher<Ticker>,
}

/// Everything known about the configured exchanges
///
/// Holds the currencies and markets, one ticker stream per exchange (topics
/// are market codes), the data sources registered by exchange adapters, and
/// the ticker cache that `ticker` reads through.
pub struct Registry {
    currencies: BTreeMap<String, Currency>,
    exchanges: Vec<ExchangeEntry>,
    markets: MarketList,
    sources: HashMap<Market, Box<dyn MarketDataSource>>,
    cache: TickerCache,
}

impl Registry {
    pub fn from_config(config: &RegistryConfig) -> RegistryResult<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    /// Build with a specific clock; the cache ages entries by it
    pub fn from_config_with_clock(
        config: &RegistryConfig,
        clock: Arc<dyn Clock>,
    ) -> RegistryResult<Self> {
        config.validate()?;

        let currencies: BTreeMap<String, Currency> = config
            .currencies
            .iter()
            .map(|code| (code.clone(), Currency::new(code.as_str())))
            .collect();

        let mut exchanges = Vec::with_capacity(config.exchanges.len());
        for exchange in &config.exchanges {
            let mut markets = Vec::with_capacity(exchange.markets.len());
            for market in &exchange.markets {
                let base = Self::lookup_currency(&currencies, &market.base)?;
                let counter = Self::lookup_currency(&currencies, &market.counter)?;
                markets.push(Market::new(exchange.name.as_str(), base, counter)?.with_code(market.code()));
            }
            exchanges.push(ExchangeEntry {
                name: exchange.name.clone(),
                schema: Arc::new(exchange.ticker.to_schema(&exchange.name)),
                markets: MarketList::new(markets),
                tickers: MultitopicPublisher::with_name(format!("{} tickers", exchange.name)),
            });
        }

        let markets: MarketList = exchanges
            .iter()
            .flat_map(|e| e.markets.iter().cloned())
            .collect();

        info!(
            "Registry loaded: {} currencies, {} exchanges, {} markets (clock: {})",
            currencies.len(),
            exchanges.len(),
            markets.len(),
            clock.name()
        );

        Ok(Self {
            currencies,
            exchanges,
            markets,
            sources: HashMap::new(),
            cache: TickerCache::from_config(&config.cache, clock),
        })
    }

    fn lookup_currency(currencies: &BTreeMap<String, Currency>, code: &str) -> RegistryResult<Currency> {
        currencies
            .get(code)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownCurrency(code.to_string()))
    }

    fn exchange(&self, name: &str) -> RegistryResult<&ExchangeEntry> {
        self.exchanges
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RegistryError::UnknownExchange(name.to_string()))
    }

    fn check_known(&self, market: &Market) -> RegistryResult<()> {
        if self.markets.iter().any(|m| m == market) {
            Ok(())
        } else {
            Err(RegistryError::UnknownMarket(market.full_name()))
        }
    }

    pub fn currency(&self, code: &str) -> RegistryResult<Currency> {
        Self::lookup_currency(&self.currencies, code)
    }

    /// Every configured currency, by code
    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }

    /// Every market on every exchange
    pub fn markets(&self) -> &MarketList {
        &self.markets
    }

    /// Markets matching `query`
    pub fn find_markets(&self, query: &MarketQuery) -> MarketList {
        self.markets.find(query)
    }

    /// Exchange names, in configuration order
    pub fn exchanges(&self) -> Vec<&str> {
        self.exchanges.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn exchange_markets(&self, exchange: &str) -> RegistryResult<&MarketList> {
        Ok(&self.exchange(exchange)?.markets)
    }

    pub fn ticker_schema(&self, exchange: &str) -> RegistryResult<Arc<TickerSchema>> {
        Ok(Arc::clone(&self.exchange(exchange)?.schema))
    }

    /// The exchange's ticker stream; topics are market codes
    pub fn ticker_stream(&self, exchange: &str) -> RegistryResult<MultitopicPublisher<Ticker>> {
        Ok(self.exchange(exchange)?.tickers.clone())
    }

    /// Look a market up by its exchange-side code
    pub fn market_for_code(&self, exchange: &str, code: &str) -> RegistryResult<&Market> {
        self.exchange(exchange)?
            .markets
            .iter()
            .find(|m| m.code() == code)
            .ok_or_else(|| RegistryError::UnknownMarket(format!("{} {}", exchange, code)))
    }

    /// Register the data source of one market
    ///
    /// If the source streams tickers, its stream feeds the exchange's ticker
    /// stream under the market's topic, and is active only while someone
    /// listens there.
    pub fn register_source(&mut self, source: Box<dyn MarketDataSource>) -> RegistryResult<()> {
        let market = source.market().clone();
        self.check_known(&market)?;
        if self.sources.contains_key(&market) {
            return Err(RegistryError::DuplicateSource(market.full_name()));
        }

        if let Some(stream) = source.ticker_stream() {
            let tickers = &self.exchange(market.exchange())?.tickers;
            for topic in [Topics::for_market(&market), Topic::All] {
                let channel = tickers.topic_publisher(topic);
                let link = stream.subscribe(&channel, false);
                if channel.active() {
                    link.start()?;
                }
            }
        }

        info!("Registered source for {}", market.full_name());
        self.sources.insert(market, source);
        Ok(())
    }

    fn source(&self, market: &Market) -> RegistryResult<&dyn MarketDataSource> {
        self.check_known(market)?;
        self.sources
            .get(market)
            .map(|s| s.as_ref())
            .ok_or_else(|| RegistryError::NoSource(market.full_name()))
    }

    /// The latest ticker, from the cache if fresh enough
    pub fn ticker(&self, market: &Market) -> RegistryResult<Ticker> {
        let source = self.source(market)?;
        Ok(self.cache.get_or_fetch(market, || source.ticker())?)
    }

    /// Order books are never cached
    pub fn orderbook(&self, market: &Market) -> RegistryResult<Orderbook> {
        Ok(self.source(market)?.orderbook()?)
    }

    /// Keep the ticker cache fed from an exchange's stream
    ///
    /// Starting the returned subscription activates the stream, and with it
    /// any streaming sources of that exchange.
    pub fn track_tickers(&self, exchange: &str) -> RegistryResult<Subscription<Ticker>> {
        let entry = self.exchange(exchange)?;
        info!("Caching tickers streamed by {}", entry.name);
        Ok(self.cache.attach(&entry.tickers))
    }

    pub fn cache(&self) -> &TickerCache {
        &self.cache
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("currencies", &self.currencies.len())
            .field("exchanges", &self.exchanges())
            .field("markets", &self.markets.len())
            .field("sources", &self.sources.len())
            .field("cache", &self.cache)
            .finish()
    }
}
