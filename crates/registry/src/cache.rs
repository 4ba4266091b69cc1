//! Short-lived ticker cache

use chrono::TimeDelta;
use log::debug;
use mexbt_core::{Market, Ticker, Timestamp};
use mexbt_ports::Clock;
use mexbt_pubsub::{MultitopicPublisher, Subscriber, Subscription, Topic};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::config::CacheConfig;

struct CachedTicker {
    fetched_at: Timestamp,
    ticker: Ticker,
}

/// Most recent ticker per market, served while younger than `max_age`
///
/// Entries are aged by when they were stored (the clock's time), not by the
/// exchange timestamp inside the ticker. Clones share the same entries.
#[derive(Clone)]
pub struct TickerCache {
    entries: Rc<RefCell<HashMap<Market, CachedTicker>>>,
    clock: Arc<dyn Clock>,
    max_age: TimeDelta,
}

impl TickerCache {
    pub fn new(clock: Arc<dyn Clock>, max_age: TimeDelta) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            clock,
            max_age,
        }
    }

    pub fn from_config(config: &CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let max_age = i64::try_from(config.ticker_max_age_ms)
            .ok()
            .and_then(TimeDelta::try_milliseconds)
            .unwrap_or(TimeDelta::MAX);
        Self::new(clock, max_age)
    }

    pub fn max_age(&self) -> TimeDelta {
        self.max_age
    }

    /// Store `ticker` as the latest for its market
    pub fn insert(&self, ticker: Ticker) {
        let fetched_at = self.clock.now();
        self.entries
            .borrow_mut()
            .insert(ticker.market().clone(), CachedTicker { fetched_at, ticker });
    }

    /// The cached ticker for `market`, unless it has expired
    pub fn get(&self, market: &Market) -> Option<Ticker> {
        let entries = self.entries.borrow();
        let Some(entry) = entries.get(market) else {
            debug!("Ticker cache miss for {}", market.full_name());
            return None;
        };

        let age = self.clock.now() - entry.fetched_at;
        if age > self.max_age {
            debug!(
                "Ticker for {} expired ({}ms old)",
                market.full_name(),
                age.num_milliseconds()
            );
            return None;
        }

        debug!("Ticker cache hit for {}", market.full_name());
        Some(entry.ticker.clone())
    }

    /// The cached ticker, or a fresh one from `fetch` (which is then cached)
    pub fn get_or_fetch<E>(
        &self,
        market: &Market,
        fetch: impl FnOnce() -> Result<Ticker, E>,
    ) -> Result<Ticker, E> {
        if let Some(ticker) = self.get(market) {
            return Ok(ticker);
        }
        let ticker = fetch()?;
        self.insert(ticker.clone());
        Ok(ticker)
    }

    /// Keep the cache fed from every topic of a ticker stream
    ///
    /// The returned subscription is started, which activates the stream.
    pub fn attach(&self, stream: &MultitopicPublisher<Ticker>) -> Subscription<Ticker> {
        let cache = self.clone();
        stream.subscribe(
            Subscriber::callback(move |ticker: &Ticker| cache.insert(ticker.clone())),
            Topic::All,
            true,
        )
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl fmt::Debug for TickerCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickerCache")
            .field("clock", &self.clock.name())
            .field("max_age_ms", &self.max_age.num_milliseconds())
            .field("entries", &self.entries.try_borrow().map(|e| e.len()).unwrap_or(0))
            .finish()
    }
}
