//! Money type for representing monetary values.
//!
//! Amounts are integers in the currency's minor unit (cents for EUR/USD), so
//! cart totals are exact. All arithmetic is checked: overflow or a currency
//! mismatch yields `None` instead of a wrong total.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    EUR,
    USD,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Get the currency code (e.g., "EUR").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
        }
    }

    /// Get the currency symbol (e.g., "€").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::EUR => "\u{20ac}",
            Currency::USD => "$",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::MXN => "MX$",
        }
    }

    /// Number of minor-unit decimal places.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "EUR" => Some(Currency::EUR),
            "USD" => Some(Currency::USD),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            "MXN" => Some(Currency::MXN),
            _ => None,
        }
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| format!("unknown currency code: {}", s))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from minor units.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Convert a decimal amount in major units, rounding to the nearest
    /// minor unit.
    ///
    /// Returns `None` for NaN, infinities and values outside the `i64` range.
    ///
    /// ```
    /// use cocina_commerce::money::{Currency, Money};
    /// let price = Money::from_decimal(49.99, Currency::EUR).unwrap();
    /// assert_eq!(price.amount_cents, 4999);
    /// assert!(Money::from_decimal(f64::NAN, Currency::EUR).is_none());
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let scaled = (amount * currency.minor_per_major() as f64).round();
        // 2^63; i64::MAX itself is not representable as f64.
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        if scaled >= LIMIT || scaled < -LIMIT {
            return None;
        }
        Some(Self::new(scaled as i64, currency))
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format with symbol (e.g., "€49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format without symbol (e.g., "49.99").
    ///
    /// Works on the integer amount so large values keep every digit.
    pub fn display_amount(&self) -> String {
        let places = self.currency.decimal_places() as usize;
        let sign = if self.amount_cents < 0 { "-" } else { "" };
        let abs = self.amount_cents.unsigned_abs();
        if places == 0 {
            return format!("{}{}", sign, abs);
        }
        let unit = self.currency.minor_per_major().unsigned_abs();
        format!("{}{}.{:0places$}", sign, abs / unit, abs % unit)
    }

    /// Add another value; `None` on overflow or currency mismatch.
    pub fn try_add(&self, other: &Money) -> Option<Money> {
        if self.currency != other.currency {
            return None;
        }
        let amount = self.amount_cents.checked_add(other.amount_cents)?;
        Some(Money::new(amount, self.currency))
    }

    /// Multiply by a quantity; `None` on overflow.
    pub fn try_multiply(&self, factor: i64) -> Option<Money> {
        let amount = self.amount_cents.checked_mul(factor)?;
        Some(Money::new(amount, self.currency))
    }

    /// Sum values in `currency`; `None` on overflow or a foreign currency.
    pub fn try_sum<'a>(
        mut iter: impl Iterator<Item = &'a Money>,
        currency: Currency,
    ) -> Option<Money> {
        iter.try_fold(Money::zero(currency), |acc, m| acc.try_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
