//! Integration test: registry wiring of sources, streams and the cache
//!
//! Uses a fake exchange whose sources count how often they are polled, and
//! a fixed clock to drive cache expiry.

use chrono::{TimeDelta, TimeZone, Utc};
use mexbt_clock::FixedClock;
use mexbt_core::{Market, Orderbook, Ticker};
use mexbt_ports::{MarketDataSource, SourceError, SourceResult};
use mexbt_pubsub::testing::Recorder;
use mexbt_pubsub::{Publisher, Topic};
use mexbt_registry::{Registry, RegistryConfig, RegistryError};
use std::cell::Cell;
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

const CONFIG: &str = r#"{
    "currencies": ["BTC", "USD", "EUR"],
    "exchanges": [
        {
            "name": "Testex",
            "markets": [
                { "base": "BTC", "counter": "USD" },
                { "base": "BTC", "counter": "EUR", "code": "btceur" }
            ]
        }
    ],
    "cache": { "ticker_max_age_ms": 500 }
}"#;

struct FakeSource {
    market: Market,
    bid: Rc<Cell<i64>>,
    polls: Rc<Cell<usize>>,
    stream: Option<Publisher<Ticker>>,
}

impl FakeSource {
    fn new(market: &Market) -> Self {
        Self {
            market: market.clone(),
            bid: Rc::new(Cell::new(999)),
            polls: Rc::new(Cell::new(0)),
            stream: None,
        }
    }

    fn streaming(market: &Market, stream: &Publisher<Ticker>) -> Self {
        Self {
            stream: Some(stream.clone()),
            ..Self::new(market)
        }
    }
}

impl MarketDataSource for FakeSource {
    fn market(&self) -> &Market {
        &self.market
    }

    fn ticker(&self) -> SourceResult<Ticker> {
        self.polls.set(self.polls.get() + 1);
        Ok(quote(&self.market, self.bid.get()))
    }

    fn orderbook(&self) -> SourceResult<Orderbook> {
        Err(SourceError::NotSupported("order books".to_string()))
    }

    fn ticker_stream(&self) -> Option<Publisher<Ticker>> {
        self.stream.clone()
    }
}

fn quote(market: &Market, bid: i64) -> Ticker {
    Ticker::from_quotes(
        Arc::new(mexbt_core::TickerSchema::basic()),
        market.clone(),
        Utc.with_ymd_and_hms(2017, 1, 1, 12, 0, 0).unwrap(),
        [("bid", bid), ("ask", 1001)],
    )
    .unwrap()
}

fn setup() -> (Arc<FixedClock>, Registry) {
    let _ = env_logger::try_init();

    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2017, 1, 1, 12, 0, 0).unwrap()));
    let config = RegistryConfig::from_json(CONFIG).unwrap();
    let registry = Registry::from_config_with_clock(&config, clock.clone()).unwrap();
    (clock, registry)
}

#[test]
fn test_load_from_file() {
    let _ = env_logger::try_init();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();

    let config = RegistryConfig::from_file(file.path()).unwrap();
    let registry = Registry::from_config(&config).unwrap();
    assert_eq!(registry.exchanges(), vec!["Testex"]);
    assert_eq!(registry.markets().len(), 2);
    assert_eq!(registry.market_for_code("testex", "USD_BTC").unwrap().full_name(), "Testex BTC/USD");
    assert_eq!(registry.cache().max_age(), TimeDelta::milliseconds(500));
}

#[test]
fn test_ticker_is_cached_until_stale() {
    let (clock, mut registry) = setup();
    let market = registry.market_for_code("Testex", "USD_BTC").unwrap().clone();

    let source = FakeSource::new(&market);
    let (bid, polls) = (source.bid.clone(), source.polls.clone());
    registry.register_source(Box::new(source)).unwrap();

    let first = registry.ticker(&market).unwrap();
    assert_eq!(first.bid(), &market.create_rate(999).unwrap());

    bid.set(995);
    clock.advance(TimeDelta::milliseconds(500));
    assert_eq!(registry.ticker(&market).unwrap(), first);
    assert_eq!(polls.get(), 1);

    clock.advance(TimeDelta::milliseconds(1));
    let second = registry.ticker(&market).unwrap();
    assert_eq!(second.bid(), &market.create_rate(995).unwrap());
    assert_eq!(polls.get(), 2);
}

#[test]
fn test_register_source_checks_market() {
    let (_clock, mut registry) = setup();
    let market = registry.market_for_code("Testex", "btceur").unwrap().clone();

    registry.register_source(Box::new(FakeSource::new(&market))).unwrap();
    assert!(matches!(
        registry.register_source(Box::new(FakeSource::new(&market))),
        Err(RegistryError::DuplicateSource(_))
    ));

    // same currencies, but not the configured pair code
    let renamed = market.clone().with_code("BTC-EUR");
    assert!(matches!(
        registry.register_source(Box::new(FakeSource::new(&renamed))),
        Err(RegistryError::UnknownMarket(_))
    ));

    assert!(matches!(
        registry.orderbook(&market),
        Err(RegistryError::Source(SourceError::NotSupported(_)))
    ));
}

#[test]
fn test_streamed_tickers_refresh_cache() {
    let (clock, mut registry) = setup();
    let market = registry.market_for_code("Testex", "USD_BTC").unwrap().clone();

    let upstream = Publisher::with_name("Testex USD_BTC feed");
    let source = FakeSource::streaming(&market, &upstream);
    let polls = source.polls.clone();
    registry.register_source(Box::new(source)).unwrap();
    assert!(!upstream.active());

    let stream = registry.ticker_stream("Testex").unwrap();
    let tracking = registry.track_tickers("Testex").unwrap();
    assert!(upstream.active());
    // the cache listens on the catch-all channel, not the base
    assert_eq!(tracking.publisher().name(), "Testex tickers [[ALL TOPICS]]");
    assert_eq!(stream.topic_publisher(Topic::All).num_subscriptions(), 1);
    assert_eq!(stream.num_subscriptions(), 1);

    upstream.send(&quote(&market, 990));
    clock.advance(TimeDelta::milliseconds(400));
    assert_eq!(registry.ticker(&market).unwrap(), quote(&market, 990));
    assert_eq!(polls.get(), 0);

    // each streamed ticker restarts the clock
    upstream.send(&quote(&market, 992));
    clock.advance(TimeDelta::milliseconds(400));
    assert_eq!(registry.ticker(&market).unwrap(), quote(&market, 992));
    assert_eq!(polls.get(), 0);

    // tickers sent by topic reach the cache through the catch-all too
    stream.send(&quote(&market, 993), market.code());
    assert_eq!(registry.ticker(&market).unwrap(), quote(&market, 993));

    tracking.stop().unwrap();
    assert!(!upstream.active());
}

#[test]
fn test_topic_listener_activates_source_stream() {
    let (_clock, mut registry) = setup();
    let usd = registry.market_for_code("Testex", "USD_BTC").unwrap().clone();
    let eur = registry.market_for_code("Testex", "btceur").unwrap().clone();

    let stream = registry.ticker_stream("Testex").unwrap();
    let recorder = Recorder::new();
    let listening = stream.subscribe(recorder.subscriber(), usd.code(), true);

    // registered while the topic already has a listener
    let usd_feed = Publisher::with_name("usd feed");
    registry.register_source(Box::new(FakeSource::streaming(&usd, &usd_feed))).unwrap();
    assert!(usd_feed.active());

    let eur_feed = Publisher::with_name("eur feed");
    registry.register_source(Box::new(FakeSource::streaming(&eur, &eur_feed))).unwrap();
    assert!(!eur_feed.active());

    usd_feed.send(&quote(&usd, 998));
    eur_feed.send(&quote(&eur, 998));
    assert_eq!(recorder.calls(), vec![quote(&usd, 998)]);

    listening.stop().unwrap();
    assert!(!usd_feed.active());
    assert!(!stream.active());
}
