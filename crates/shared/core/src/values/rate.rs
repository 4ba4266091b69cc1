use num_traits::{One, Signed};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::numeric::format_rational;
use super::{Amount, Currency, CurrencyPair, NumericInput, PrecisionPolicy, Rational};
use crate::error::{CurrencyError, CurrencyResult, NumericError};

/// The proportion between two currencies' values
///
/// `1 denominator = rate numerator`. Printed as `"RATE NUMERATOR/DENOMINATOR"`.
/// The rate is an exact, strictly positive rational, so chained conversions
/// never accumulate rounding error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExchangeRate {
    currencies: CurrencyPair,
    rate: Rational,
}

impl ExchangeRate {
    /// Create a rate where each `denominator` is worth `rate` `numerator`
    pub fn new(
        numerator: Currency,
        denominator: Currency,
        rate: impl Into<NumericInput>,
    ) -> CurrencyResult<Self> {
        Self::with_policy(numerator, denominator, rate, PrecisionPolicy::default())
    }

    /// Same as [`ExchangeRate::new`] with an explicit precision policy
    pub fn with_policy(
        numerator: Currency,
        denominator: Currency,
        rate: impl Into<NumericInput>,
        policy: PrecisionPolicy,
    ) -> CurrencyResult<Self> {
        let currencies = CurrencyPair::new(numerator, denominator)?;
        let rate = rate.into().to_rational_with(policy)?;
        Self::from_parts(currencies, rate)
    }

    /// The rate at which `denominator` is worth `numerator` (`numerator / denominator`)
    pub fn from_amounts(numerator: &Amount, denominator: &Amount) -> CurrencyResult<Self> {
        if denominator.is_zero() {
            return Err(NumericError::DivisionByZero.into());
        }
        let currencies = CurrencyPair::new(
            numerator.currency().clone(),
            denominator.currency().clone(),
        )?;
        Self::from_parts(currencies, numerator.value() / denominator.value())
    }

    pub(crate) fn from_parts(currencies: CurrencyPair, rate: Rational) -> CurrencyResult<Self> {
        if !rate.is_positive() {
            return Err(NumericError::NonPositiveRate(rate.to_string()).into());
        }
        Ok(Self { currencies, rate })
    }

    /// Each numerator is worth 1/rate denominator
    pub fn numerator(&self) -> &Currency {
        self.currencies.first()
    }

    /// Each denominator is worth rate numerator
    pub fn denominator(&self) -> &Currency {
        self.currencies.second()
    }

    pub fn currencies(&self) -> &CurrencyPair {
        &self.currencies
    }

    pub fn rate(&self) -> &Rational {
        &self.rate
    }

    /// Convert `amount` to `target`, or to the other currency of the pair
    ///
    /// Converting to the amount's own currency returns it unchanged. Both the
    /// amount's currency and the target must belong to this rate.
    pub fn convert(&self, amount: &Amount, target: Option<&Currency>) -> CurrencyResult<Amount> {
        let source = amount.currency();
        let target = match target {
            Some(target) => {
                self.currencies.is_first(source)?;
                target
            }
            None => self.currencies.other_currency(source)?,
        };
        if target == source {
            return Ok(amount.clone());
        }
        let value = if self.is_denominator(target)? {
            amount.value() / &self.rate
        } else {
            amount.value() * &self.rate
        };
        Ok(Amount::from_rational(value, target.clone()))
    }

    /// Swapped currencies and inverted rate; the relative value of the
    /// currencies stays the same
    pub fn reverse(&self) -> Self {
        Self {
            currencies: self.currencies.reverse(),
            rate: self.rate.recip(),
        }
    }

    /// Swapped currencies with the same rate; the relative value of the
    /// currencies is swapped
    pub fn inverse(&self) -> Self {
        Self {
            currencies: self.currencies.reverse(),
            rate: self.rate.clone(),
        }
    }

    /// Chain two rates that share exactly one currency
    ///
    /// For `A/B` and `B/C` this gives `A/C`, whichever way round each input
    /// is oriented.
    pub fn convert_exchangerate(&self, other: &ExchangeRate) -> CurrencyResult<ExchangeRate> {
        let common = self.currencies.common_currency(&other.currencies)?;
        let left = self.per(common)?;
        let right = other.by(common)?;
        let currencies =
            CurrencyPair::new(left.numerator().clone(), right.denominator().clone())?;
        Self::from_parts(currencies, &right.rate * &left.rate)
    }

    /// This rate oriented so that `currency` is the denominator
    pub fn per(&self, currency: &Currency) -> CurrencyResult<ExchangeRate> {
        if self.is_denominator(currency)? {
            Ok(self.clone())
        } else {
            Ok(self.reverse())
        }
    }

    /// This rate oriented so that `currency` is the numerator
    pub fn by(&self, currency: &Currency) -> CurrencyResult<ExchangeRate> {
        if self.is_denominator(currency)? {
            Ok(self.reverse())
        } else {
            Ok(self.clone())
        }
    }

    /// Compare two rates on the same currencies, re-orienting `other` if needed
    pub fn try_cmp(&self, other: &ExchangeRate) -> CurrencyResult<Ordering> {
        if self.currencies == other.currencies {
            Ok(self.rate.cmp(&other.rate))
        } else if self.currencies == other.currencies.reverse() {
            Ok(self.rate.cmp(&other.rate.recip()))
        } else {
            Err(CurrencyError::Incomparable {
                left: self.currencies.clone(),
                right: other.currencies.clone(),
            })
        }
    }

    pub fn checked_add(&self, other: &ExchangeRate) -> CurrencyResult<ExchangeRate> {
        self.ensure_same_pair(other)?;
        Self::from_parts(self.currencies.clone(), &self.rate + &other.rate)
    }

    /// Fails if the difference isn't positive
    pub fn checked_sub(&self, other: &ExchangeRate) -> CurrencyResult<ExchangeRate> {
        self.ensure_same_pair(other)?;
        Self::from_parts(self.currencies.clone(), &self.rate - &other.rate)
    }

    pub fn is_unit(&self) -> bool {
        self.rate.is_one()
    }

    fn is_denominator(&self, currency: &Currency) -> CurrencyResult<bool> {
        Ok(!self.currencies.is_first(currency)?)
    }

    fn ensure_same_pair(&self, other: &ExchangeRate) -> CurrencyResult<()> {
        if self.currencies != other.currencies {
            return Err(CurrencyError::MismatchedPairs {
                left: self.currencies.clone(),
                right: other.currencies.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}",
            format_rational(&self.rate, 5),
            self.numerator(),
            self.denominator()
        )
    }
}
