use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{Market, Side};
use crate::error::{MarketError, MarketResult};
use crate::values::{Amount, ExchangeRate, Timestamp};

/// An offer to sell `from_amount` at an exchange rate
///
/// Without a rate this is a market order, executed at whatever rate is
/// available. Equality and hashing only consider the amount, rate and
/// market; entity and timestamp are context.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    from_amount: Amount,
    rate: Option<ExchangeRate>,
    market: Option<Market>,
    entity: Option<String>,
    timestamp: Option<Timestamp>,
}

impl Order {
    pub fn builder(from_amount: Amount) -> OrderBuilder {
        OrderBuilder::new(from_amount)
    }

    /// A limit order on no particular market
    pub fn limit(from_amount: Amount, rate: ExchangeRate) -> MarketResult<Self> {
        Self::builder(from_amount).rate(rate).build()
    }

    pub fn from_amount(&self) -> &Amount {
        &self.from_amount
    }

    /// `None` for market orders
    pub fn rate(&self) -> Option<&ExchangeRate> {
        self.rate.as_ref()
    }

    /// The market, failing if it was never set
    pub fn market(&self) -> MarketResult<&Market> {
        self.market
            .as_ref()
            .ok_or_else(|| MarketError::MarketNotSet(self.to_string()))
    }

    pub fn market_opt(&self) -> Option<&Market> {
        self.market.as_ref()
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    pub fn is_market_order(&self) -> bool {
        self.rate.is_none()
    }

    pub fn side(&self) -> MarketResult<Side> {
        Ok(self.market()?.side_of(self.from_amount.currency())?)
    }

    /// Buying the market's base currency (paying counter)
    pub fn is_bid(&self) -> MarketResult<bool> {
        Ok(self.from_amount.currency() == self.market()?.counter())
    }

    /// Selling the market's base currency (for counter)
    pub fn is_ask(&self) -> MarketResult<bool> {
        Ok(self.from_amount.currency() == self.market()?.base())
    }

    /// What the order receives if filled at its rate
    pub fn to_amount(&self) -> MarketResult<Amount> {
        let rate = self
            .rate
            .as_ref()
            .ok_or_else(|| MarketError::MarketOrderHasNoRate(self.from_amount.to_string()))?;
        Ok(rate.convert(&self.from_amount, None)?)
    }

    /// A copy of this order placed on `market`
    pub fn with_market(&self, market: Market) -> MarketResult<Self> {
        let order = Self {
            market: Some(market),
            ..self.clone()
        };
        order.sanity_check()?;
        Ok(order)
    }

    /// A copy of this order selling a different amount
    pub fn with_from_amount(&self, from_amount: Amount) -> MarketResult<Self> {
        let order = Self {
            from_amount,
            ..self.clone()
        };
        order.sanity_check()?;
        Ok(order)
    }

    fn sanity_check(&self) -> MarketResult<()> {
        if self.from_amount.is_negative() {
            return Err(MarketError::NegativeAmount(self.from_amount.to_string()));
        }
        if let Some(market) = &self.market {
            market.check_order_valid(self)?;
        }
        Ok(())
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.from_amount == other.from_amount
            && self.rate == other.rate
            && self.market == other.market
    }
}

impl Eq for Order {}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from_amount.hash(state);
        self.rate.hash(state);
        self.market.hash(state);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rate = self.rate.as_ref();
        match rate.and_then(|r| r.convert(&self.from_amount, None).ok()) {
            Some(to_amount) => write!(f, "{} >> {}", self.from_amount, to_amount),
            None => write!(f, "{} >> ?", self.from_amount),
        }
    }
}

/// Builder for [`Order`]
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    pub fn new(from_amount: Amount) -> Self {
        Self {
            order: Order {
                from_amount,
                rate: None,
                market: None,
                entity: None,
                timestamp: None,
            },
        }
    }

    pub fn rate(mut self, rate: ExchangeRate) -> Self {
        self.order.rate = Some(rate);
        self
    }

    pub fn market(mut self, market: Market) -> Self {
        self.order.market = Some(market);
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.order.entity = Some(entity.into());
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.order.timestamp = Some(timestamp);
        self
    }

    pub fn build(self) -> MarketResult<Order> {
        self.order.sanity_check()?;
        Ok(self.order)
    }
}
