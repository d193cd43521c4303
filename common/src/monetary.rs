//! Unit codes and the session rate table.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::error::RateTableError;

/// ISO 4217 style unit code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a new currency from code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    /// Wrap a code exactly as a rate source listed it.
    pub fn verbatim(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the currency code.
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Get the standard decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self.0.to_ascii_uppercase().as_str() {
            "JPY" | "KRW" | "VND" => 0,
            "BHD" | "KWD" | "OMR" => 3,
            _ => 2,
        }
    }

    /// Round a raw amount to this currency's display precision.
    ///
    /// Returns `None` for values a `Decimal` cannot hold (NaN, infinities).
    pub fn round_for_display(&self, value: f64) -> Option<Decimal> {
        Decimal::from_f64(value).map(|d| d.round_dp(self.decimal_places()).normalize())
    }

    /// Common currencies
    pub fn usd() -> Self {
        Self::new("USD")
    }

    pub fn eur() -> Self {
        Self::new("EUR")
    }

    pub fn jpy() -> Self {
        Self::new("JPY")
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Borrow<str> for Currency {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Rates for every known unit, relative to one base unit.
///
/// Never empty and every rate is finite and positive. Codes keep the order
/// the source listed them in, so the first entries are stable within a load.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    codes: Vec<Currency>,
    rates: HashMap<Currency, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Build a table from `(code, rate)` entries in source order.
    ///
    /// A code listed twice keeps its first position and its last rate.
    pub fn from_rates<I, S>(entries: I) -> Result<Self, RateTableError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut codes = Vec::new();
        let mut rates = HashMap::new();

        for (code, rate) in entries {
            let code: String = code.into();
            if code.trim().is_empty() {
                return Err(RateTableError::EmptyCode);
            }
            if !rate.is_finite() || rate <= 0.0 {
                return Err(RateTableError::InvalidRate { code, rate });
            }

            let currency = Currency::verbatim(code);
            if rates.insert(currency.clone(), rate).is_none() {
                codes.push(currency);
            }
        }

        if codes.is_empty() {
            return Err(RateTableError::Empty);
        }

        Ok(Self {
            codes,
            rates,
            fetched_at: Utc::now(),
        })
    }

    /// Override the load timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Rate for a unit code, if the table lists it.
    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Check if the table lists a unit code (exact match).
    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Unit codes in source order.
    pub fn codes(&self) -> &[Currency] {
        &self.codes
    }

    /// Iterate `(code, rate)` in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, f64)> + '_ {
        self.codes.iter().map(move |c| (c, self.rates[c.code()]))
    }

    /// Default source and target units: the first two codes.
    ///
    /// A single-unit table yields that unit for both.
    pub fn default_pair(&self) -> (Currency, Currency) {
        let first = self.codes[0].clone();
        let second = self.codes.get(1).cloned().unwrap_or_else(|| first.clone());
        (first, second)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}
