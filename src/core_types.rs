//! Core types used throughout the system
//!
//! These are the identifiers every module agrees on. Account numbers are
//! externally visible and immutable; internal row ids never leave the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Customer ID - primary key of `customers_tb`, carried in the JWT subject.
pub type CustomerId = i64;

/// Payee ID - primary key of `payees_tb`.
pub type PayeeId = i64;

/// Ledger entry ID - system generated, globally unique.
pub type TransactionId = uuid::Uuid;

/// Externally visible account identifier.
///
/// # Constraints:
/// - **Immutable**: assigned once by the allocator, never rewritten
/// - **Unique**: enforced by the store's unique constraint
/// - **Digits only**: a fixed-width decimal numeral (no leading zero)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, example = "482910375561")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Wrap a raw numeral. Callers on the HTTP boundary go through
    /// [`AccountNumber::parse`] instead.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse user input: non-empty, ASCII digits only.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AccountNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
