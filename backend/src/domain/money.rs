//! Monetary amounts and percentages.
//!
//! Amounts are held as integer minor units (cents) so balance arithmetic is
//! exact. The wire format is a decimal string with exactly two fractional
//! digits, e.g. `"49.99"`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Largest amount representable in a `NUMERIC(10, 2)` column: 99,999,999.99.
pub const MAX_AMOUNT_CENTS: i64 = 9_999_999_999;

const CENTS_PER_UNIT: i64 = 100;

/// Errors raised when parsing a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyParseError {
    /// The input was blank.
    #[error("amount must not be empty")]
    Empty,
    /// The input is not a decimal number.
    #[error("amount must be a decimal number")]
    Invalid,
    /// More than two digits follow the decimal point.
    #[error("amount must have at most 2 decimal places")]
    TooManyFractionDigits,
    /// The amount does not fit ten digits with two decimals.
    #[error("amount must have at most 10 digits")]
    OutOfRange,
}

/// An amount of money in cents.
///
/// # Examples
/// ```
/// use edunexus::domain::Money;
///
/// let price: Money = "49.99".parse().expect("valid amount");
/// assert_eq!(price.cents(), 4999);
/// assert_eq!(price.to_string(), "49.99");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Construct an amount from minor units.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The zero amount.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Amount in minor units.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Whether the amount fits the persisted `NUMERIC(10, 2)` range.
    #[must_use]
    pub const fn fits_storage(self) -> bool {
        self.0.abs() <= MAX_AMOUNT_CENTS
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(MoneyParseError::Invalid);
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MoneyParseError::Invalid);
        }
        if fraction.len() > 2 {
            return Err(MoneyParseError::TooManyFractionDigits);
        }

        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| MoneyParseError::OutOfRange)?
        };
        let fraction_value = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| MoneyParseError::Invalid)? * 10,
            _ => fraction.parse::<i64>().map_err(|_| MoneyParseError::Invalid)?,
        };
        let cents = whole_value
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or(MoneyParseError::OutOfRange)?;
        if cents > MAX_AMOUNT_CENTS {
            return Err(MoneyParseError::OutOfRange);
        }
        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl Visitor<'_> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount with at most two fractional digits")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        self.visit_str(&value.to_string())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        self.visit_str(&value.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MoneyVisitor)
    }
}

/// Errors raised when a percentage falls outside its permitted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("percentage must be between {min} and {max}")]
pub struct PercentageRangeError {
    /// Inclusive lower bound.
    pub min: u8,
    /// Inclusive upper bound.
    pub max: u8,
}

/// A whole percentage in `0..=100`, used for tax rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    /// Validate and wrap a percentage.
    pub fn new(value: u8) -> Result<Self, PercentageRangeError> {
        if value > 100 {
            return Err(PercentageRangeError { min: 0, max: 100 });
        }
        Ok(Self(value))
    }

    /// Zero percent.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Wrap `value`, capping it at 100.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value > 100 { Self(100) } else { Self(value) }
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Percentage {
    type Error = PercentageRangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

/// Coupon discount in `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercentage(u8);

impl DiscountPercentage {
    /// Validate and wrap a discount.
    pub fn new(value: u8) -> Result<Self, PercentageRangeError> {
        if !(1..=100).contains(&value) {
            return Err(PercentageRangeError { min: 1, max: 100 });
        }
        Ok(Self(value))
    }

    /// Raw value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// The discount as a general percentage.
    #[must_use]
    pub const fn as_percentage(self) -> Percentage {
        Percentage(self.0)
    }
}

impl TryFrom<u8> for DiscountPercentage {
    type Error = PercentageRangeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountPercentage> for u8 {
    fn from(value: DiscountPercentage) -> Self {
        value.0
    }
}
