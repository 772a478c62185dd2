//! Ledger entry types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::core_types::{AccountNumber, TransactionId};

/// Ledger entry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i16)]
pub enum TransactionType {
    Payment = 1,
    Transfer = 2,
    SelfTransfer = 3,
    Deposit = 4,
    Withdrawal = 5,
    LoanRepayment = 6,
    LoanDisbursement = 7,
}

impl TransactionType {
    /// Types that debit the sender and credit the receiver. Only the
    /// transfer engine may write these.
    pub fn moves_balance(&self) -> bool {
        matches!(self, TransactionType::Transfer | TransactionType::SelfTransfer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Payment => "PAYMENT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::SelfTransfer => "SELF_TRANSFER",
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::LoanRepayment => "LOAN_REPAYMENT",
            TransactionType::LoanDisbursement => "LOAN_DISBURSEMENT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PAYMENT" => Ok(TransactionType::Payment),
            "TRANSFER" => Ok(TransactionType::Transfer),
            "SELF_TRANSFER" => Ok(TransactionType::SelfTransfer),
            "DEPOSIT" => Ok(TransactionType::Deposit),
            "WITHDRAWAL" => Ok(TransactionType::Withdrawal),
            "LOAN_REPAYMENT" => Ok(TransactionType::LoanRepayment),
            "LOAN_DISBURSEMENT" => Ok(TransactionType::LoanDisbursement),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl TryFrom<i16> for TransactionType {
    type Error = String;

    fn try_from(val: i16) -> Result<Self, Self::Error> {
        match val {
            1 => Ok(TransactionType::Payment),
            2 => Ok(TransactionType::Transfer),
            3 => Ok(TransactionType::SelfTransfer),
            4 => Ok(TransactionType::Deposit),
            5 => Ok(TransactionType::Withdrawal),
            6 => Ok(TransactionType::LoanRepayment),
            7 => Ok(TransactionType::LoanDisbursement),
            other => Err(format!("Unknown transaction type id: {}", other)),
        }
    }
}

impl From<TransactionType> for i16 {
    fn from(val: TransactionType) -> i16 {
        val as i16
    }
}

/// Immutable ledger row
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[schema(value_type = String)]
    pub id: TransactionId,
    pub sender_acc_no: AccountNumber,
    pub receiver_acc_no: AccountNumber,
    #[schema(value_type = String, example = "300.00")]
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: bool,
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Append payload; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub sender_acc_no: AccountNumber,
    pub receiver_acc_no: AccountNumber,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub status: bool,
    pub category: String,
    pub description: String,
    pub loan_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_balance() {
        assert!(TransactionType::Transfer.moves_balance());
        assert!(TransactionType::SelfTransfer.moves_balance());
        assert!(!TransactionType::Payment.moves_balance());
        assert!(!TransactionType::LoanRepayment.moves_balance());
    }

    #[test]
    fn test_transaction_type_from_i16() {
        assert_eq!(TransactionType::try_from(2), Ok(TransactionType::Transfer));
        assert!(TransactionType::try_from(42).is_err());
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!(
            "self_transfer".parse::<TransactionType>(),
            Ok(TransactionType::SelfTransfer)
        );
        assert!("REFUND".parse::<TransactionType>().is_err());
    }
}
