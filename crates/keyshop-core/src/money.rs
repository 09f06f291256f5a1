//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Cents
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing a cart in floating point:                                      │
//! │    19.99 × 3 + 0.01 = 59.980000000000004                                │
//! │                                                                         │
//! │  Which side of the 100.00 free-shipping bar is 99.99999999?             │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Prices are parsed once, at the wire boundary, into i64 cents.        │
//! │    Every sum and comparison after that is exact.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Overflow
//! Neither prices nor quantities have an upper bound, so arithmetic
//! saturates at the `i64` range instead of panicking or wrapping. A
//! saturated total is absurd but still compares correctly against the
//! shipping threshold.
//!
//! ## Wire Format
//! The product source sends prices either as JSON numbers (`24.99`) or as
//! decimal strings (`"24.99"`). `Money` deserializes from both and always
//! serializes as a two-decimal JSON number, which is also the shape of the
//! persisted cart.
//!
//! ## Usage
//! ```rust
//! use keyshop_core::money::Money;
//!
//! let price = Money::from_cents(2499);          // 24.99
//! let parsed = Money::parse_decimal("24.99").unwrap();
//! assert_eq!(price, parsed);
//!
//! let line = price * 3u32;                      // 74.97
//! assert_eq!(line.to_decimal_string(), "74.97");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ProductSummary.price ──┬──► CartLineItem.price ──► line total          │
/// │                         │                                               │
/// │                         ├──► SortOrder::PriceAsc / PriceDesc            │
/// │                         │                                               │
/// │                         └──► FilterCriteria.min_price / max_price       │
/// │                                                                         │
/// │  Cart subtotal ──► shipping rule (> 100.00 is free) ──► total           │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export)]
pub struct Money(#[ts(type = "number")] i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use keyshop_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses a decimal string such as `"24.99"`, `"5"` or `"0.5"`.
    ///
    /// At most two fractional digits are accepted, so a catalog price never
    /// loses precision on the way in. Surrounding whitespace is ignored.
    ///
    /// ```rust
    /// use keyshop_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("24.99").unwrap().cents(), 2499);
    /// assert_eq!(Money::parse_decimal("0.5").unwrap().cents(), 50);
    /// assert_eq!(Money::parse_decimal("-3.10").unwrap().cents(), -310);
    /// assert!(Money::parse_decimal("9.999").is_err());
    /// ```
    pub fn parse_decimal(input: &str) -> CoreResult<Self> {
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, frac) = match digits.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (digits, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(CoreError::invalid_amount(input, "empty amount"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(CoreError::invalid_amount(input, "not a decimal number"));
        }
        if frac.len() > 2 {
            return Err(CoreError::invalid_amount(input, "at most two decimal places"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| CoreError::invalid_amount(input, "amount out of range"))?
        };
        let frac_value: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_value))
            .ok_or_else(|| CoreError::invalid_amount(input, "amount out of range"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Converts a JSON float into cents, rounding to the nearest cent.
    ///
    /// ```rust
    /// use keyshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_f64_rounded(24.99).unwrap().cents(), 2499);
    /// assert_eq!(Money::from_f64_rounded(0.1 + 0.2).unwrap().cents(), 30);
    /// assert!(Money::from_f64_rounded(f64::NAN).is_err());
    /// ```
    pub fn from_f64_rounded(value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::invalid_amount(value.to_string(), "not a finite number"));
        }
        let cents = (value * 100.0).round();
        if cents.abs() > i64::MAX as f64 / 2.0 {
            return Err(CoreError::invalid_amount(value.to_string(), "amount out of range"));
        }
        Ok(Money(cents as i64))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    ///
    /// ```rust
    /// use keyshop_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents_part(), 99);
    /// assert_eq!(Money::from_cents(-550).cents_part(), 50);
    /// ```
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a line-item quantity, saturating at the
    /// `i64` bounds.
    ///
    /// ```rust
    /// use keyshop_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1999);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 5997);
    /// assert_eq!(Money::from_cents(i64::MAX / 2).multiply_quantity(3).cents(), i64::MAX);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Formats as a plain two-decimal string (`"24.99"`), the form used in
    /// query strings and SQL parameters.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }

    /// Returns the value as a float for JSON output.
    ///
    /// Cents divided by 100 always round-trips through `serde_json` as the
    /// shortest two-decimal representation.
    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way the storefront prints it: `"24.99 €"`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} €", self.to_decimal_string())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by a line-item quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

/// Either wire shape a price can take.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parsed = match RawAmount::deserialize(deserializer)? {
            RawAmount::Integer(units) => units
                .checked_mul(100)
                .map(Money)
                .ok_or_else(|| CoreError::invalid_amount(units.to_string(), "amount out of range")),
            RawAmount::Float(value) => Money::from_f64_rounded(value),
            RawAmount::Text(text) => Money::parse_decimal(&text),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(Money::parse_decimal("24.99").unwrap().cents(), 2499);
        assert_eq!(Money::parse_decimal("100").unwrap().cents(), 10000);
        assert_eq!(Money::parse_decimal(" 7.5 ").unwrap().cents(), 750);
        assert_eq!(Money::parse_decimal(".99").unwrap().cents(), 99);
        assert_eq!(Money::parse_decimal("12.").unwrap().cents(), 1200);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        for bad in ["", "abc", "1.2.3", "9.999", "-", ".", "1e3", "12,50"] {
            assert!(Money::parse_decimal(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99 €");
        assert_eq!(Money::from_cents(500).to_string(), "5.00 €");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50 €");
        assert_eq!(Money::from_cents(0).to_decimal_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3u32).cents(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_cents(i64::MAX - 1);

        assert_eq!((huge * 100_000u32).cents(), i64::MAX);
        assert_eq!((huge + Money::from_cents(10)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN + 1) - Money::from_cents(10)).cents(), i64::MIN);

        let total: Money = [huge, huge, Money::from_cents(999)].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_deserialize_accepts_number_and_string() {
        let from_float: Money = serde_json::from_str("24.99").unwrap();
        let from_string: Money = serde_json::from_str("\"24.99\"").unwrap();
        let from_int: Money = serde_json::from_str("15").unwrap();

        assert_eq!(from_float.cents(), 2499);
        assert_eq!(from_string.cents(), 2499);
        assert_eq!(from_int.cents(), 1500);
    }

    #[test]
    fn test_deserialize_rejects_bad_string() {
        let result: Result<Money, _> = serde_json::from_str("\"cheap\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_as_decimal_number() {
        assert_eq!(serde_json::to_string(&Money::from_cents(2499)).unwrap(), "24.99");
        assert_eq!(serde_json::to_string(&Money::from_cents(1500)).unwrap(), "15.0");
    }

    /// 0.1 + 0.2 style drift must not push a cart over the shipping bar.
    #[test]
    fn test_float_rounding_is_exact_in_cents() {
        let drifting = 33.33 + 33.33 + 33.34;
        assert_eq!(Money::from_f64_rounded(drifting).unwrap().cents(), 10000);
    }
}
