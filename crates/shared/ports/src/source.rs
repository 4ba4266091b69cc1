use mexbt_core::{Market, Order, Orderbook, Ticker};
use mexbt_pubsub::Publisher;
use std::fmt;

use crate::error::{SourceError, SourceResult};

/// API credentials for an exchange account
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
    /// Some exchanges also want an account/client id
    pub client_id: Option<String>,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Port for reading market data from one market on one exchange
///
/// Implemented per exchange by adapters (HTTP pollers, websocket clients).
/// Optional capabilities have defaults that report them as unsupported.
pub trait MarketDataSource {
    fn market(&self) -> &Market;

    /// The most recent ticker
    fn ticker(&self) -> SourceResult<Ticker>;

    fn orderbook(&self) -> SourceResult<Orderbook>;

    /// Log in, returning a participant that can trade on this market
    fn authenticate(&self, credentials: &Credentials) -> SourceResult<Box<dyn ActiveParticipant>> {
        let _ = credentials;
        Err(SourceError::NotSupported(format!(
            "trading on {}",
            self.market()
        )))
    }

    /// Live tickers for this market, if the exchange streams them
    fn ticker_stream(&self) -> Option<Publisher<Ticker>> {
        None
    }
}

/// Port for a market participant under the user's control
pub trait ActiveParticipant {
    fn market(&self) -> &Market;

    /// Place `order`, returning it as accepted by the exchange
    fn place_order(&mut self, order: &Order) -> SourceResult<Order>;

    /// Fails with `OrderAlreadyClosed` if the order is no longer open
    fn cancel_order(&mut self, order: &Order) -> SourceResult<()>;

    fn open_orders(&self) -> SourceResult<Vec<Order>>;
}
