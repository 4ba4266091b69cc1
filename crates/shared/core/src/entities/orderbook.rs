use serde::Serialize;

use super::{Market, Order, Side};
use crate::error::{MarketError, MarketResult};
use crate::values::{Amount, Rational};

/// The open orders on a market
///
/// Best price first on each side: bid prices strictly descending, ask
/// prices strictly ascending, and the best bid below the best ask.
/// Prices are compared in counter currency per unit of base currency,
/// whichever way round each order's rate is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Orderbook {
    market: Market,
    bids: Vec<Order>,
    asks: Vec<Order>,
}

impl Orderbook {
    pub fn new(market: Market, bids: Vec<Order>, asks: Vec<Order>) -> MarketResult<Self> {
        let bid_prices = side_prices(&market, &bids, Side::Bid)?;
        let ask_prices = side_prices(&market, &asks, Side::Ask)?;

        if let Some(index) = first_unsorted(&bid_prices, |prev, next| next < prev) {
            return Err(MarketError::UnsortedBids { index });
        }
        if let Some(index) = first_unsorted(&ask_prices, |prev, next| next > prev) {
            return Err(MarketError::UnsortedAsks { index });
        }

        if let (Some(best_bid), Some(best_ask)) = (bid_prices.first(), ask_prices.first()) {
            if best_bid >= best_ask {
                return Err(MarketError::CrossedBook {
                    bid: bids[0].to_string(),
                    ask: asks[0].to_string(),
                });
            }
        }

        Ok(Self { market, bids, asks })
    }

    pub fn market(&self) -> &Market {
        &self.market
    }

    pub fn bids(&self) -> &[Order] {
        &self.bids
    }

    pub fn asks(&self) -> &[Order] {
        &self.asks
    }

    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.first()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Best ask minus best bid in counter currency; `None` if a side is empty
    pub fn spread(&self) -> MarketResult<Option<Amount>> {
        let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) else {
            return Ok(None);
        };
        let spread = price(&self.market, ask, 0, Side::Ask)? - price(&self.market, bid, 0, Side::Bid)?;
        Ok(Some(Amount::from_rational(spread, self.market.counter().clone())))
    }
}

fn side_prices(market: &Market, orders: &[Order], side: Side) -> MarketResult<Vec<Rational>> {
    orders
        .iter()
        .enumerate()
        .map(|(index, order)| {
            market.check_order_valid(order)?;
            if market.side_of(order.from_amount().currency())? != side {
                return Err(MarketError::WrongSide {
                    index,
                    expected: side.to_string(),
                });
            }
            price(market, order, index, side)
        })
        .collect()
}

/// Counter currency per base unit
fn price(market: &Market, order: &Order, index: usize, side: Side) -> MarketResult<Rational> {
    let rate = order.rate().ok_or_else(|| MarketError::NotALimitOrder {
        index,
        side: side.to_string(),
    })?;
    Ok(rate.per(market.base())?.rate().clone())
}

fn first_unsorted(prices: &[Rational], in_order: impl Fn(&Rational, &Rational) -> bool) -> Option<usize> {
    prices
        .windows(2)
        .position(|pair| !in_order(&pair[0], &pair[1]))
        .map(|position| position + 1)
}
