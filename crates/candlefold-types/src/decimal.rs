//! Exact decimal values for prices and volumes.

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::num::NonZeroU32;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

use crate::CandlefoldError;

/// Arbitrary-precision signed decimal used for every price and volume.
///
/// Addition, subtraction, [`Ord::max`], [`Ord::min`] and
/// [`Decimal::mul_scalar`] are exact. [`Decimal::checked_div`] is exact
/// whenever the quotient terminates and is otherwise rounded to 100
/// significant digits.
///
/// Equality and ordering compare numeric value, so `1.5 == 1.50`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decimal(BigDecimal);

impl Decimal {
    /// Returns zero.
    #[must_use]
    pub fn zero() -> Self {
        Self(BigDecimal::zero())
    }

    /// Returns true if the value is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Builds a decimal from an integer scaled by `factor`.
    ///
    /// `from_scaled(145000, 10000)` is exactly `14.5`.
    #[must_use]
    pub fn from_scaled(raw: i64, factor: NonZeroU32) -> Self {
        Self(BigDecimal::from(raw) / BigDecimal::from(factor.get()))
    }

    /// Inverse of [`Decimal::from_scaled`], rounded to the nearest scaled unit.
    ///
    /// Returns `None` if the scaled value does not fit in an `i64`.
    #[must_use]
    pub fn to_scaled(&self, factor: NonZeroU32) -> Option<i64> {
        (&self.0 * BigDecimal::from(factor.get())).round(0).to_i64()
    }

    /// Multiplies by an integer scalar. Always exact.
    #[must_use]
    pub fn mul_scalar(&self, scalar: i64) -> Self {
        Self(self.0.clone() * BigDecimal::from(scalar))
    }

    /// Divides by an integer scalar, returning `None` for a zero divisor.
    ///
    /// Terminating quotients are exact; others are rounded to 100
    /// significant digits.
    #[must_use]
    pub fn checked_div(&self, divisor: i64) -> Option<Self> {
        if divisor == 0 {
            return None;
        }
        Some(Self(self.0.clone() / BigDecimal::from(divisor)))
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Projects the value to `f64` for display.
    ///
    /// This is lossy and must only be used at the display boundary.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(f64::NAN)
    }

    /// Returns the underlying [`BigDecimal`].
    #[must_use]
    pub const fn as_big_decimal(&self) -> &BigDecimal {
        &self.0
    }
}

impl From<BigDecimal> for Decimal {
    fn from(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl FromStr for Decimal {
    type Err = CandlefoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BigDecimal::from_str(s.trim())
            .map(Self)
            .map_err(|e| CandlefoldError::InvalidDecimal(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Decimal {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn add(self, rhs: &'a Decimal) -> Decimal {
        Decimal(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Self> for Decimal {
    fn add_assign(&mut self, rhs: &Self) {
        self.0 += &rhs.0;
    }
}

impl Sub for Decimal {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &'a Decimal) -> Decimal {
        Decimal(&self.0 - &rhs.0)
    }
}

impl<'a> Sum<&'a Self> for Decimal {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |mut acc, value| {
            acc += value;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_scaled_is_exact() {
        let factor = NonZeroU32::new(10_000).unwrap();
        assert_eq!(Decimal::from_scaled(145_000, factor), dec("14.5"));
        assert_eq!(Decimal::from_scaled(20_000, factor), dec("2"));
        assert_eq!(Decimal::from_scaled(1, factor), dec("0.0001"));
        assert_eq!(Decimal::from_scaled(-5, factor), dec("-0.0005"));
    }

    #[test]
    fn test_to_scaled_inverts_from_scaled() {
        let factor = NonZeroU32::new(10_000).unwrap();
        assert_eq!(dec("14.5").to_scaled(factor), Some(145_000));
        assert_eq!(dec("0.00006").to_scaled(factor), Some(1));
        assert_eq!(Decimal::from_scaled(-5, factor).to_scaled(factor), Some(-5));
        assert_eq!(dec("1e30").to_scaled(factor), None);
    }

    #[test]
    fn test_sum_keeps_all_digits() {
        // 0.1 + 0.2 drifts in binary floating point
        let values = [dec("0.1"), dec("0.2")];
        let total: Decimal = values.iter().sum();
        assert_eq!(total, dec("0.3"));

        let values = [dec("12345678.123456789012"), dec("0.000000000001")];
        let total: Decimal = values.iter().sum();
        assert_eq!(total, dec("12345678.123456789013"));
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert_eq!(dec("1.50"), dec("1.5"));
        assert!(dec("10.0000000000000001") > dec("10"));
        assert_eq!(
            dec("10.0000000000000001").max(dec("10")),
            dec("10.0000000000000001")
        );
        assert_eq!(dec("-3").min(dec("2")), dec("-3"));
    }

    #[test]
    fn test_scalar_ops() {
        assert_eq!(dec("1.25").mul_scalar(4), dec("5"));
        assert_eq!(dec("5").checked_div(4), Some(dec("1.25")));
        assert_eq!(dec("5").checked_div(0), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<Decimal>().is_err());
        assert!(" 1.5 ".parse::<Decimal>().is_ok());
    }

    #[test]
    fn test_to_f64_projection() {
        assert!((dec("14.8").to_f64() - 14.8).abs() < 1e-12);
        assert!(Decimal::zero().is_zero());
    }

    #[test]
    fn test_serde_round_trip_preserves_value() {
        let value = dec("123.456789012345678901");
        let json = serde_json::to_string(&value).unwrap();
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
