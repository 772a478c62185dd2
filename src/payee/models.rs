//! Saved payees

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core_types::{AccountNumber, CustomerId, PayeeId};

/// Kind of party behind the payee account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum PayeeType {
    #[default]
    Individual = 1,
    Business = 2,
}

impl fmt::Display for PayeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PayeeType::Individual => "INDIVIDUAL",
            PayeeType::Business => "BUSINESS",
        })
    }
}

impl TryFrom<i16> for PayeeType {
    type Error = String;

    fn try_from(val: i16) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(PayeeType::Individual),
            2 => Ok(PayeeType::Business),
            other => Err(format!("Unknown payee type id: {}", other)),
        }
    }
}

impl From<PayeeType> for i16 {
    fn from(val: PayeeType) -> i16 {
        val as i16
    }
}

/// A payer's saved target account. Unique per (payer, account number).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payee {
    pub payee_id: PayeeId,
    pub payer_customer_id: CustomerId,
    /// Display name chosen by the payer
    #[schema(example = "Landlord")]
    pub name: String,
    pub payee_acc_no: AccountNumber,
    #[schema(example = "BANK0000001")]
    pub payee_ifsc: String,
    /// Owner of the payee account at the time it was saved
    pub payee_customer_id: CustomerId,
    pub payee_type: PayeeType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayee {
    pub payer_customer_id: CustomerId,
    pub name: String,
    pub payee_acc_no: AccountNumber,
    pub payee_ifsc: String,
    pub payee_customer_id: CustomerId,
    pub payee_type: PayeeType,
}

/// Editable fields; the account binding itself never changes
#[derive(Debug, Clone)]
pub struct PayeeUpdate {
    pub name: String,
    pub payee_type: PayeeType,
}
