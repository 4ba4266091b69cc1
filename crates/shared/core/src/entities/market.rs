use serde::Serialize;
use std::fmt;

use super::{Order, Side};
use crate::error::{CurrencyResult, MarketError, MarketResult};
use crate::values::{Currency, CurrencyPair, ExchangeRate, NumericInput};

/// A market on an exchange where exactly two currencies are traded
///
/// The base currency is the one around whose unit prices are quoted; the
/// counter currency is the one prices are expressed in. A market quoting
/// "500 USD/BTC" has base BTC and counter USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Market {
    exchange: String,
    /// (base, counter)
    currencies: CurrencyPair,
    /// Exchange-side pair code, also used as the stream topic
    code: String,
}

impl Market {
    pub fn new(exchange: impl Into<String>, base: Currency, counter: Currency) -> CurrencyResult<Self> {
        let code = format!("{}_{}", counter, base);
        Ok(Self {
            exchange: exchange.into(),
            currencies: CurrencyPair::new(base, counter)?,
            code,
        })
    }

    /// Override the pair code (defaults to `COUNTER_BASE`)
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn base(&self) -> &Currency {
        self.currencies.first()
    }

    pub fn counter(&self) -> &Currency {
        self.currencies.second()
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// (base, counter)
    pub fn currencies(&self) -> &CurrencyPair {
        &self.currencies
    }

    /// e.g. `"Bitstamp BTC/USD"`
    pub fn full_name(&self) -> String {
        format!("{} {}/{}", self.exchange, self.base(), self.counter())
    }

    /// A price quote on this market: 1 base = `value` counter
    pub fn create_rate(&self, value: impl Into<NumericInput>) -> CurrencyResult<ExchangeRate> {
        ExchangeRate::new(self.counter().clone(), self.base().clone(), value)
    }

    /// Which side of this market an order paying `currency` is on
    pub fn side_of(&self, currency: &Currency) -> CurrencyResult<Side> {
        if self.currencies.is_first(currency)? {
            Ok(Side::Ask)
        } else {
            Ok(Side::Bid)
        }
    }

    /// Checks that an order makes sense on this market
    pub fn check_order_valid(&self, order: &Order) -> MarketResult<()> {
        if let Some(market) = order.market_opt() {
            if market != self {
                return Err(MarketError::InvalidOrder(format!(
                    "order is on {}, not {}",
                    market, self
                )));
            }
        }
        if let Some(rate) = order.rate() {
            if !rate.currencies().same_currencies(&self.currencies) {
                return Err(MarketError::InvalidOrder(format!(
                    "exchange rate {} doesn't match market {}",
                    rate, self
                )));
            }
        }
        if !self.currencies.contains(order.from_amount().currency()) {
            return Err(MarketError::InvalidOrder(format!(
                "{} isn't traded on market {}",
                order.from_amount().currency(),
                self
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Filter for [`MarketList::find`]
///
/// Currency filters are unordered; exchange names match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    currencies: Vec<Currency>,
    exchange: Option<String>,
}

impl MarketQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn currency(mut self, currency: impl Into<Currency>) -> Self {
        self.currencies.push(currency.into());
        self
    }

    pub fn exchange(mut self, name: impl Into<String>) -> Self {
        self.exchange = Some(name.into());
        self
    }

    pub fn matches(&self, market: &Market) -> bool {
        let currencies_match = self
            .currencies
            .iter()
            .all(|c| market.currencies().contains(c));
        let exchange_match = self
            .exchange
            .as_ref()
            .is_none_or(|name| name.eq_ignore_ascii_case(market.exchange()));
        currencies_match && exchange_match
    }
}

impl fmt::Display for MarketQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let currencies: Vec<&str> = self.currencies.iter().map(Currency::code).collect();
        write!(f, "currencies={:?}", currencies)?;
        if let Some(exchange) = &self.exchange {
            write!(f, " exchange={}", exchange)?;
        }
        Ok(())
    }
}

/// A searchable list of markets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketList {
    markets: Vec<Market>,
}

impl MarketList {
    /// Duplicates are dropped, first occurrence wins
    pub fn new(markets: impl IntoIterator<Item = Market>) -> Self {
        let mut unique: Vec<Market> = Vec::new();
        for market in markets {
            if !unique.contains(&market) {
                unique.push(market);
            }
        }
        Self { markets: unique }
    }

    /// A sub-list of the markets matching `query`
    pub fn find(&self, query: &MarketQuery) -> MarketList {
        Self {
            markets: self
                .markets
                .iter()
                .filter(|m| query.matches(m))
                .cloned()
                .collect(),
        }
    }

    /// The single market matching `query`; fails on zero or several matches
    pub fn find_one(&self, query: &MarketQuery) -> MarketResult<&Market> {
        let mut matches = self.markets.iter().filter(|m| query.matches(m));
        match (matches.next(), matches.next()) {
            (Some(market), None) => Ok(market),
            (None, _) => Err(MarketError::NoMatch(query.to_string())),
            (Some(_), Some(_)) => Err(MarketError::AmbiguousMatch {
                query: query.to_string(),
                count: self.find(query).len(),
            }),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Market> {
        self.markets.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Market> {
        self.markets.iter()
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl FromIterator<Market> for MarketList {
    fn from_iter<I: IntoIterator<Item = Market>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a MarketList {
    type Item = &'a Market;
    type IntoIter = std::slice::Iter<'a, Market>;

    fn into_iter(self) -> Self::IntoIter {
        self.markets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(code: &str) -> Currency {
        Currency::new(code)
    }

    fn market(exchange: &str, base: &str, counter: &str) -> Market {
        Market::new(exchange, currency(base), currency(counter)).unwrap()
    }

    fn names(list: &MarketList) -> Vec<String> {
        list.iter().map(Market::full_name).collect()
    }

    #[test]
    fn test_market_basics() {
        let m = market("Bitstamp", "BTC", "USD");
        assert_eq!(m.full_name(), "Bitstamp BTC/USD");
        assert_eq!(m.code(), "USD_BTC");
        assert_eq!(m.with_code("btcusd").code(), "btcusd");
        assert!(Market::new("X", currency("BTC"), currency("BTC")).is_err());
    }

    #[test]
    fn test_create_rate_quotes_base_in_counter() {
        let m = market("Bitstamp", "BTC", "USD");
        let rate = m.create_rate("500").unwrap();
        assert_eq!(rate.numerator(), m.counter());
        assert_eq!(rate.denominator(), m.base());

        let usd = rate.convert(&m.base().amount(2).unwrap(), None).unwrap();
        assert_eq!(usd, currency("USD").amount(1000).unwrap());
    }

    #[test]
    fn test_side_of() {
        let m = market("E", "BTC", "USD");
        assert_eq!(m.side_of(&currency("BTC")).unwrap(), Side::Ask);
        assert_eq!(m.side_of(&currency("USD")).unwrap(), Side::Bid);
        assert!(m.side_of(&currency("EUR")).is_err());
    }

    #[test]
    fn test_find() {
        let m1 = market("E", "c1", "c2");
        let m2 = market("E", "c2", "c3");
        let m3 = market("E", "c3", "c4");

        let empty = MarketList::default();
        assert!(empty.find(&MarketQuery::new().currency("c5")).is_empty());

        let single = MarketList::new([m1.clone()]);
        assert_eq!(single.find(&MarketQuery::new().currency("c1")).len(), 1);
        assert_eq!(single.find(&MarketQuery::new().currency("c2").currency("c1")).len(), 1);
        assert!(single.find(&MarketQuery::new().currency("c1").currency("c5")).is_empty());

        let many = MarketList::new([m1.clone(), m2.clone(), m3.clone()]);
        assert_eq!(names(&many.find(&MarketQuery::new().currency("c1"))), vec![m1.full_name()]);
        assert_eq!(
            names(&many.find(&MarketQuery::new().currency("c2"))),
            vec![m1.full_name(), m2.full_name()]
        );
        assert_eq!(
            names(&many.find(&MarketQuery::new().currency("c3").currency("c2"))),
            vec![m2.full_name()]
        );
        assert!(many.find(&MarketQuery::new().currency("c1").currency("c3")).is_empty());
        assert_eq!(many.find(&MarketQuery::new()).len(), 3);
    }

    #[test]
    fn test_find_chained() {
        let m1 = market("E", "c1", "c2");
        let m2 = market("E", "c2", "c3");
        let many = MarketList::new([m1.clone(), m2]);

        let c2_markets = many.find(&MarketQuery::new().currency("c2"));
        let chained = c2_markets.find(&MarketQuery::new().currency("c1"));
        assert_eq!(names(&chained), vec![m1.full_name()]);
    }

    #[test]
    fn test_find_one() {
        let m1 = market("E", "c1", "c2");
        let m2 = market("E", "c2", "c3");
        let list = MarketList::new([m1.clone(), m2.clone()]);

        assert_eq!(list.find_one(&MarketQuery::new().currency("c1")).unwrap(), &m1);
        assert_eq!(list.find_one(&MarketQuery::new().currency("c3")).unwrap(), &m2);
        assert!(matches!(
            list.find_one(&MarketQuery::new().currency("c2")),
            Err(MarketError::AmbiguousMatch { count: 2, .. })
        ));
        assert!(matches!(
            list.find_one(&MarketQuery::new().currency("c4")),
            Err(MarketError::NoMatch(_))
        ));
    }

    #[test]
    fn test_find_by_exchange() {
        let m1 = market("E1", "c1", "c2");
        let m2 = market("e2", "c1", "c2");
        let list = MarketList::new([m1.clone(), m2.clone()]);

        assert_eq!(list.find_one(&MarketQuery::new().exchange("E1")).unwrap(), &m1);
        assert_eq!(list.find_one(&MarketQuery::new().exchange("E2")).unwrap(), &m2);
        assert_eq!(list.find_one(&MarketQuery::new().exchange("e1")).unwrap(), &m1);
        assert_eq!(
            list.find_one(&MarketQuery::new().currency("c1").exchange("E1")).unwrap(),
            &m1
        );
        assert!(list.find(&MarketQuery::new().currency("c3").exchange("E1")).is_empty());
    }

    #[test]
    fn test_duplicates_dropped() {
        let m1 = market("E", "c1", "c2");
        let list: MarketList = vec![m1.clone(), m1].into_iter().collect();
        assert_eq!(list.len(), 1);
    }
}
