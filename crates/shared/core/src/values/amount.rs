use num_traits::{Signed, Zero};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use super::numeric::format_rational;
use super::{Currency, ExchangeRate, NumericInput, PrecisionPolicy, Rational};
use crate::error::{CurrencyError, CurrencyResult, NumericError};

/// An amount of a given currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Amount {
    value: Rational,
    currency: Currency,
}

impl Amount {
    pub fn new(value: impl Into<NumericInput>, currency: Currency) -> CurrencyResult<Self> {
        Self::with_policy(value, currency, PrecisionPolicy::default())
    }

    pub fn with_policy(
        value: impl Into<NumericInput>,
        currency: Currency,
        policy: PrecisionPolicy,
    ) -> CurrencyResult<Self> {
        let value = value.into().to_rational_with(policy)?;
        Ok(Self { value, currency })
    }

    pub fn from_rational(value: Rational, currency: Currency) -> Self {
        Self { value, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_rational(Rational::zero(), currency)
    }

    pub fn value(&self) -> &Rational {
        &self.value
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.value.is_negative()
    }

    pub fn checked_add(&self, other: &Amount) -> CurrencyResult<Amount> {
        self.ensure_same_currency(other)?;
        Ok(Self::from_rational(
            &self.value + &other.value,
            self.currency.clone(),
        ))
    }

    pub fn checked_sub(&self, other: &Amount) -> CurrencyResult<Amount> {
        self.ensure_same_currency(other)?;
        Ok(Self::from_rational(
            &self.value - &other.value,
            self.currency.clone(),
        ))
    }

    /// Multiply by a plain number
    pub fn scale(&self, factor: impl Into<NumericInput>) -> CurrencyResult<Amount> {
        let factor = factor.into().to_rational()?;
        Ok(Self::from_rational(&self.value * factor, self.currency.clone()))
    }

    /// Divide by a plain number
    pub fn divide(&self, divisor: impl Into<NumericInput>) -> CurrencyResult<Amount> {
        let divisor = divisor.into().to_rational()?;
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero.into());
        }
        Ok(Self::from_rational(&self.value / divisor, self.currency.clone()))
    }

    /// The rate at which `other` is worth `self` (`self / other`)
    pub fn rate_against(&self, other: &Amount) -> CurrencyResult<ExchangeRate> {
        ExchangeRate::from_amounts(self, other)
    }

    /// The rate at which one unit of `currency` is worth `self` (`self / currency`)
    pub fn per_currency(&self, currency: &Currency) -> CurrencyResult<ExchangeRate> {
        ExchangeRate::from_amounts(self, &Amount::new(1, currency.clone())?)
    }

    pub fn convert_with(&self, rate: &ExchangeRate, target: &Currency) -> CurrencyResult<Amount> {
        rate.convert(self, Some(target))
    }

    pub fn try_cmp(&self, other: &Amount) -> CurrencyResult<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.value.cmp(&other.value))
    }

    fn ensure_same_currency(&self, other: &Amount) -> CurrencyResult<()> {
        if self.currency != other.currency {
            return Err(CurrencyError::MismatchedCurrencies {
                left: self.currency.clone(),
                right: other.currency.clone(),
            });
        }
        Ok(())
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Self {
            value: -self.value,
            currency: self.currency,
        }
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_rational(&self.value, 5), self.currency)
    }
}
