use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

use super::{Amount, ExchangeRate, NumericInput};
use crate::error::{CurrencyError, CurrencyResult};

/// A currency (USD, EUR, BTC, ...)
///
/// Identified by its code alone: two currencies with the same code are equal
/// and hash the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency {
    code: String,
}

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// An amount of this currency (`value * currency`)
    pub fn amount(&self, value: impl Into<NumericInput>) -> CurrencyResult<Amount> {
        Amount::new(value, self.clone())
    }

    /// Unit exchange rate between two currencies (`self / denominator`)
    ///
    /// The result says "1 `denominator` = 1 `self`".
    pub fn per(&self, denominator: &Currency) -> CurrencyResult<ExchangeRate> {
        ExchangeRate::new(self.clone(), denominator.clone(), 1)
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// An ordered pair of two distinct currencies
///
/// Equality is order-sensitive: `(A, B) != (B, A)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(Currency, Currency)", into = "(Currency, Currency)")]
pub struct CurrencyPair {
    currencies: [Currency; 2],
}

impl CurrencyPair {
    pub fn new(first: Currency, second: Currency) -> CurrencyResult<Self> {
        if first == second {
            return Err(CurrencyError::SameCurrency(first));
        }
        Ok(Self {
            currencies: [first, second],
        })
    }

    pub fn first(&self) -> &Currency {
        &self.currencies[0]
    }

    pub fn second(&self) -> &Currency {
        &self.currencies[1]
    }

    pub fn get(&self, index: usize) -> Option<&Currency> {
        self.currencies.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter()
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.currencies.contains(currency)
    }

    /// Whether `currency` is the first of the pair; fails if it isn't in the pair
    pub fn is_first(&self, currency: &Currency) -> CurrencyResult<bool> {
        match self.currencies.iter().position(|c| c == currency) {
            Some(index) => Ok(index == 0),
            None => Err(self.wrong_currency(currency)),
        }
    }

    /// The currency of the pair that isn't `currency`
    pub fn other_currency(&self, currency: &Currency) -> CurrencyResult<&Currency> {
        if self.is_first(currency)? {
            Ok(&self.currencies[1])
        } else {
            Ok(&self.currencies[0])
        }
    }

    /// The only currency that belongs to both pairs
    pub fn common_currency(&self, other: &CurrencyPair) -> CurrencyResult<&Currency> {
        let mut common = self.currencies.iter().filter(|c| other.contains(c));
        match (common.next(), common.next()) {
            (Some(currency), None) => Ok(currency),
            (Some(_), Some(_)) => Err(CurrencyError::BothCurrenciesShared(self.clone())),
            _ => Err(CurrencyError::NoCommonCurrency {
                left: self.clone(),
                right: other.clone(),
            }),
        }
    }

    /// The same currencies in swapped order
    pub fn reverse(&self) -> Self {
        Self {
            currencies: [self.currencies[1].clone(), self.currencies[0].clone()],
        }
    }

    /// Whether both pairs hold the same currencies, in any order
    pub fn same_currencies(&self, other: &CurrencyPair) -> bool {
        self == other || *self == other.reverse()
    }

    pub(crate) fn wrong_currency(&self, currency: &Currency) -> CurrencyError {
        CurrencyError::WrongCurrency {
            pair: self.clone(),
            currency: currency.clone(),
        }
    }
}

impl Index<usize> for CurrencyPair {
    type Output = Currency;

    fn index(&self, index: usize) -> &Self::Output {
        &self.currencies[index]
    }
}

impl TryFrom<(Currency, Currency)> for CurrencyPair {
    type Error = CurrencyError;

    fn try_from((first, second): (Currency, Currency)) -> Result<Self, Self::Error> {
        Self::new(first, second)
    }
}

impl From<CurrencyPair> for (Currency, Currency) {
    fn from(pair: CurrencyPair) -> Self {
        let [first, second] = pair.currencies;
        (first, second)
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.currencies[0], self.currencies[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn currencies() -> (Currency, Currency, Currency) {
        (Currency::new("c1"), Currency::new("c2"), Currency::new("c3"))
    }

    #[test]
    fn test_currency_equality_and_hash() {
        let (c1, c2, _) = currencies();
        let c1_again = Currency::new("c1");
        assert_eq!(c1, c1_again);
        assert_ne!(c1, c2);

        let set: HashSet<_> = [c1.clone(), c1_again.clone()].into_iter().collect();
        assert_eq!(set.len(), 1);

        let mut map = HashMap::new();
        map.insert(c1, 1);
        map.insert(c2, 1);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_pair_rejects_same_currency() {
        let (c1, _, _) = currencies();
        assert_eq!(
            CurrencyPair::new(c1.clone(), c1.clone()),
            Err(CurrencyError::SameCurrency(c1))
        );
    }

    #[test]
    fn test_pair_equality_is_order_sensitive() {
        let (c1, c2, c3) = currencies();
        let p1 = CurrencyPair::new(c1.clone(), c2.clone()).unwrap();
        let p1_again = CurrencyPair::new(Currency::new("c1"), c2.clone()).unwrap();
        let reversed = CurrencyPair::new(c2.clone(), c1.clone()).unwrap();
        let other = CurrencyPair::new(c1.clone(), c3).unwrap();

        assert_eq!(p1, p1_again);
        assert_ne!(p1, other);
        assert_ne!(p1, reversed);
        assert_eq!(p1.reverse(), reversed);
        assert!(p1.same_currencies(&reversed));
        assert!(!p1.same_currencies(&other));

        let set: HashSet<_> = [p1.clone(), p1_again, reversed].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_pair_lookup() {
        let (c1, c2, c3) = currencies();
        let pair = CurrencyPair::new(c1.clone(), c2.clone()).unwrap();

        assert_eq!(pair[0], c1);
        assert_eq!(pair[1], c2);
        assert_eq!(pair.get(2), None);
        assert!(pair.is_first(&c1).unwrap());
        assert!(!pair.is_first(&c2).unwrap());
        assert_eq!(pair.other_currency(&c1).unwrap(), &c2);
        assert_eq!(pair.other_currency(&c2).unwrap(), &c1);
        assert!(matches!(
            pair.other_currency(&c3),
            Err(CurrencyError::WrongCurrency { currency, .. }) if currency == c3
        ));
    }

    #[test]
    fn test_common_currency() {
        let (c1, c2, c3) = currencies();
        let c4 = Currency::new("c4");
        let p12 = CurrencyPair::new(c1.clone(), c2.clone()).unwrap();
        let p23 = CurrencyPair::new(c2.clone(), c3.clone()).unwrap();
        let p34 = CurrencyPair::new(c3, c4).unwrap();

        assert_eq!(p12.common_currency(&p23).unwrap(), &c2);
        assert!(matches!(
            p12.common_currency(&p34),
            Err(CurrencyError::NoCommonCurrency { .. })
        ));
        assert!(matches!(
            p12.common_currency(&p12.reverse()),
            Err(CurrencyError::BothCurrenciesShared(_))
        ));
    }

    #[test]
    fn test_pair_serde_validates() {
        let pair: CurrencyPair = serde_json::from_str(r#"["BTC","USD"]"#).unwrap();
        assert_eq!(pair.first().code(), "BTC");
        assert!(serde_json::from_str::<CurrencyPair>(r#"["BTC","BTC"]"#).is_err());
    }
}
