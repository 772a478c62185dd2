//! Data models for bank accounts

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core_types::{AccountNumber, CustomerId};

/// Account product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum AccountType {
    #[default]
    Savings = 1,
    Current = 2,
    FixedDeposit = 3,
    RecurringDeposit = 4,
    CreditCard = 5,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAVINGS",
            AccountType::Current => "CURRENT",
            AccountType::FixedDeposit => "FIXED_DEPOSIT",
            AccountType::RecurringDeposit => "RECURRING_DEPOSIT",
            AccountType::CreditCard => "CREDIT_CARD",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SAVINGS" | "1" => Ok(AccountType::Savings),
            "CURRENT" | "2" => Ok(AccountType::Current),
            "FIXED_DEPOSIT" | "3" => Ok(AccountType::FixedDeposit),
            "RECURRING_DEPOSIT" | "4" => Ok(AccountType::RecurringDeposit),
            "CREDIT_CARD" | "5" => Ok(AccountType::CreditCard),
            _ => Err(format!("Invalid account type: {}", s)),
        }
    }
}

impl TryFrom<i16> for AccountType {
    type Error = String;

    fn try_from(val: i16) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(AccountType::Savings),
            2 => Ok(AccountType::Current),
            3 => Ok(AccountType::FixedDeposit),
            4 => Ok(AccountType::RecurringDeposit),
            5 => Ok(AccountType::CreditCard),
            other => Err(format!("Unknown account type id: {}", other)),
        }
    }
}

impl From<AccountType> for i16 {
    fn from(val: AccountType) -> i16 {
        val as i16
    }
}

/// Bank account row
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_number: AccountNumber,
    pub customer_id: CustomerId,
    #[schema(example = "IFSC001")]
    pub ifsc: String,
    pub account_type: AccountType,
    #[schema(value_type = String, example = "1000.00")]
    pub balance: Decimal,
    /// `false` once deactivated. Accounts are never deleted.
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status
    }
}

/// Insert payload for a new account. The number is already allocated.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub account_number: AccountNumber,
    pub customer_id: CustomerId,
    pub ifsc: String,
    pub account_type: AccountType,
    pub initial_balance: Decimal,
}
