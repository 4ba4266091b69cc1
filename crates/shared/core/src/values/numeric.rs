//! Exact numeric inputs
//!
//! Every rate and amount is stored as a `BigRational`. Callers hand values in
//! as any [`NumericInput`] and they are normalized here, once.

use log::warn;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::{NumericError, NumericResult};

/// Exact rational value used by the currency algebra
pub type Rational = BigRational;

/// Largest decimal exponent accepted in text input (`1e-4`)
const MAX_EXPONENT: i64 = 4096;

/// What to do with inputs that are not exactly representable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrecisionPolicy {
    /// Accept floats (at their exact binary value) and log a warning
    #[default]
    Warn,
    /// Reject floats with [`NumericError::PrecisionLoss`]
    Strict,
}

/// A numeric value as handed in by a caller or an exchange adapter
#[derive(Debug, Clone, PartialEq)]
pub enum NumericInput {
    Integer(i128),
    Decimal(Decimal),
    /// `"12"`, `"-0.25"`, `"1e-4"` or `"1/3"`
    Text(String),
    Rational(Rational),
    Float(f64),
}

impl NumericInput {
    /// Convert to an exact rational under the default (warning) policy
    pub fn to_rational(&self) -> NumericResult<Rational> {
        self.to_rational_with(PrecisionPolicy::default())
    }

    /// Convert to an exact rational under the given policy
    pub fn to_rational_with(&self, policy: PrecisionPolicy) -> NumericResult<Rational> {
        match self {
            Self::Integer(value) => Ok(Rational::from_integer(BigInt::from(*value))),
            Self::Decimal(value) => Ok(decimal_to_rational(value)),
            Self::Text(text) => parse_rational(text),
            Self::Rational(value) => Ok(value.clone()),
            Self::Float(value) => {
                if !value.is_finite() {
                    return Err(NumericError::NonFinite(*value));
                }
                if policy == PrecisionPolicy::Strict {
                    return Err(NumericError::PrecisionLoss(*value));
                }
                warn!(
                    "{} (f64) is not suitable as an exact number, using its binary value",
                    value
                );
                Rational::from_float(*value).ok_or(NumericError::NonFinite(*value))
            }
        }
    }

    /// Convert to a `Decimal` (used for ticker number fields such as volume)
    pub fn to_decimal(&self) -> NumericResult<Decimal> {
        match self {
            Self::Integer(value) => {
                Decimal::from_i128(*value).ok_or_else(|| NumericError::Unparseable(value.to_string()))
            }
            Self::Decimal(value) => Ok(*value),
            Self::Text(text) => Decimal::from_str(text.trim())
                .or_else(|_| Decimal::from_scientific(text.trim()))
                .map_err(|_| NumericError::Unparseable(text.clone())),
            Self::Rational(value) => {
                let numer = value
                    .numer()
                    .to_i128()
                    .and_then(Decimal::from_i128)
                    .ok_or_else(|| NumericError::Unparseable(value.to_string()))?;
                let denom = value
                    .denom()
                    .to_i128()
                    .and_then(Decimal::from_i128)
                    .ok_or_else(|| NumericError::Unparseable(value.to_string()))?;
                numer
                    .checked_div(denom)
                    .ok_or(NumericError::DivisionByZero)
            }
            Self::Float(value) => {
                warn!("{} (f64) is not suitable as an exact number", value);
                Decimal::from_f64(*value).ok_or(NumericError::NonFinite(*value))
            }
        }
    }
}

macro_rules! integer_input {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for NumericInput {
                fn from(value: $ty) -> Self {
                    Self::Integer(value as i128)
                }
            }
        )*
    };
}

integer_input!(i32, i64, u32, u64, usize);

impl From<Decimal> for NumericInput {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NumericInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Rational> for NumericInput {
    fn from(value: Rational) -> Self {
        Self::Rational(value)
    }
}

impl From<&Rational> for NumericInput {
    fn from(value: &Rational) -> Self {
        Self::Rational(value.clone())
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Exact rational value of a decimal (mantissa / 10^scale)
pub fn decimal_to_rational(value: &Decimal) -> Rational {
    let denom = num_traits::pow(BigInt::from(10u8), value.scale() as usize);
    Rational::new(BigInt::from(value.mantissa()), denom)
}

/// Parse `"a"`, `"a.b"`, `"a.be-n"` or `"x/y"` into an exact rational
pub fn parse_rational(text: &str) -> NumericResult<Rational> {
    let trimmed = text.trim();
    let unparseable = || NumericError::Unparseable(text.to_string());

    if let Some((numer, denom)) = trimmed.split_once('/') {
        let numer = parse_decimal_text(numer.trim()).ok_or_else(unparseable)?;
        let denom = parse_decimal_text(denom.trim()).ok_or_else(unparseable)?;
        if denom.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        return Ok(numer / denom);
    }

    parse_decimal_text(trimmed).ok_or_else(unparseable)
}

fn parse_decimal_text(text: &str) -> Option<Rational> {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(pos) => (&text[..pos], text[pos + 1..].parse::<i64>().ok()?),
        None => (text, 0),
    };
    if exponent.abs() > MAX_EXPONENT {
        return None;
    }

    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        return None;
    }

    let mut numer: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
    if negative {
        numer = -numer;
    }

    // value = numer * 10^scale
    let scale = exponent - frac_part.len() as i64;
    let ten = BigInt::from(10u8);
    if scale >= 0 {
        Some(Rational::from_integer(
            numer * num_traits::pow(ten, scale as usize),
        ))
    } else {
        Some(Rational::new(numer, num_traits::pow(ten, (-scale) as usize)))
    }
}

/// Render a rational with a fixed number of decimal places (display only)
pub fn format_rational(value: &Rational, places: usize) -> String {
    match value.to_f64() {
        Some(float) => format!("{:.*}", places, float),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ratio(numer: i64, denom: i64) -> Rational {
        Rational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn test_integer_and_decimal_inputs_are_exact() {
        assert_eq!(NumericInput::from(42).to_rational().unwrap(), ratio(42, 1));
        assert_eq!(
            NumericInput::from(dec!(0.0001)).to_rational().unwrap(),
            ratio(1, 10_000)
        );
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(parse_rational("1.0").unwrap(), ratio(1, 1));
        assert_eq!(parse_rational("-0.25").unwrap(), ratio(-1, 4));
        assert_eq!(parse_rational("+3").unwrap(), ratio(3, 1));
        assert_eq!(parse_rational("1e-4").unwrap(), ratio(1, 10_000));
        assert_eq!(parse_rational("2.5E2").unwrap(), ratio(250, 1));
        assert_eq!(parse_rational("1/3").unwrap(), ratio(1, 3));
        assert_eq!(parse_rational(" .5 ").unwrap(), ratio(1, 2));
    }

    #[test]
    fn test_bad_text() {
        assert!(matches!(parse_rational("abc"), Err(NumericError::Unparseable(_))));
        assert!(matches!(parse_rational(""), Err(NumericError::Unparseable(_))));
        assert!(matches!(parse_rational("1..2"), Err(NumericError::Unparseable(_))));
        assert!(matches!(parse_rational("1e99999"), Err(NumericError::Unparseable(_))));
        assert_eq!(parse_rational("1/0"), Err(NumericError::DivisionByZero));
    }

    #[test]
    fn test_float_uses_binary_value() {
        let from_float = NumericInput::from(0.1).to_rational().unwrap();
        let from_text = NumericInput::from("0.1").to_rational().unwrap();
        assert_ne!(from_float, from_text);

        // Floats that are exact in binary survive unchanged
        assert_eq!(NumericInput::from(0.5).to_rational().unwrap(), ratio(1, 2));
    }

    #[test]
    fn test_strict_policy_rejects_floats() {
        let result = NumericInput::from(2.0).to_rational_with(PrecisionPolicy::Strict);
        assert_eq!(result, Err(NumericError::PrecisionLoss(2.0)));
        assert!(matches!(
            NumericInput::from(f64::NAN).to_rational(),
            Err(NumericError::NonFinite(_))
        ));
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(NumericInput::from("12.5").to_decimal().unwrap(), dec!(12.5));
        assert_eq!(NumericInput::from(7).to_decimal().unwrap(), dec!(7));
        assert_eq!(
            NumericInput::from(ratio(1, 4)).to_decimal().unwrap(),
            dec!(0.25)
        );
    }

    #[test]
    fn test_format_rational() {
        assert_eq!(format_rational(&ratio(1, 3), 5), "0.33333");
        assert_eq!(format_rational(&ratio(2, 1), 2), "2.00");
    }
}
