//! Monetary amounts at the API boundary
//!
//! Amounts travel as JSON strings. [`StrictDecimal`] accepts only plain
//! non-negative decimal notation below [`AMOUNT_LIMIT`], so anything that
//! reaches a service already fits a NUMERIC(20,2) column. Positivity and the
//! two-decimal rule stay with the transfer engine, which owns
//! `InvalidAmount`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::transfer::AMOUNT_LIMIT;

/// Non-negative amount in plain decimal notation, below [`AMOUNT_LIMIT`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrictDecimal(Decimal);

impl StrictDecimal {
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl std::ops::Deref for StrictDecimal {
    type Target = Decimal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Syntax first (digits with at most one interior dot), then range
impl FromStr for StrictDecimal {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err("Amount cannot be empty".to_string());
        }
        if raw.starts_with('-') {
            return Err("Amount cannot be negative".to_string());
        }

        let (whole, fraction) = match raw.split_once('.') {
            Some((whole, fraction)) => (whole, Some(fraction)),
            None => (raw, None),
        };
        if whole.is_empty() {
            return Err("Invalid format: use 0.5 not .5".to_string());
        }
        if fraction == Some("") {
            return Err("Invalid format: use 5.0 not 5.".to_string());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole) || !fraction.is_none_or(all_digits) {
            return Err(format!(
                "Invalid amount '{}': expected digits with an optional decimal point",
                raw
            ));
        }

        let value = Decimal::from_str(raw).map_err(|_| {
            format!("Amount out of range: must be below {}", AMOUNT_LIMIT)
        })?;
        if value >= AMOUNT_LIMIT {
            return Err(format!("Amount out of range: must be below {}", AMOUNT_LIMIT));
        }
        Ok(StrictDecimal(value))
    }
}

impl<'de> Deserialize<'de> for StrictDecimal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // JSON numbers would bypass the syntax rules, so only strings are taken
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for StrictDecimal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}
