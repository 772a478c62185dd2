//! Transfer request/result types

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::core_types::{AccountNumber, CustomerId, TransactionId};
use crate::error::BankError;
use crate::ledger::models::{LedgerEntry, TransactionType};

/// Maximum fractional digits of a monetary amount (NUMERIC(20,2))
pub const MAX_AMOUNT_SCALE: u32 = 2;

/// Exclusive upper bound of any amount or balance: 10^18, the first value
/// NUMERIC(20,2) cannot hold
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xA764_0000, 0x0DE0_B6B3, 0, false, 0);

pub const SELF_TRANSFER_CATEGORY: &str = "SELF_TRANSFER";
pub const SELF_TRANSFER_DESCRIPTION: &str = "Self Transfer";

/// Amount must be positive, below [`AMOUNT_LIMIT`], with at most two decimal places
pub fn validate_amount(amount: Decimal) -> Result<(), BankError> {
    if amount <= Decimal::ZERO
        || amount >= AMOUNT_LIMIT
        || amount.normalize().scale() > MAX_AMOUNT_SCALE
    {
        return Err(BankError::InvalidAmount);
    }
    Ok(())
}

/// Who may move money between the two accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipPolicy {
    /// Both accounts must belong to this (authenticated) customer
    SameCustomer(CustomerId),
    /// Third-party transfer; ownership is not checked
    Unrestricted,
}

/// One balance-moving request for the engine
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_acc_no: AccountNumber,
    pub to_acc_no: AccountNumber,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    pub category: String,
    pub description: String,
    pub policy: OwnershipPolicy,
}

impl TransferRequest {
    /// Own-account transfer as issued by `POST /accounts/transfer`
    pub fn own(
        customer_id: CustomerId,
        from_acc_no: AccountNumber,
        to_acc_no: AccountNumber,
        amount: Decimal,
        description: Option<String>,
    ) -> Self {
        Self {
            from_acc_no,
            to_acc_no,
            amount,
            transaction_type: TransactionType::Transfer,
            category: SELF_TRANSFER_CATEGORY.to_string(),
            description: description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| SELF_TRANSFER_DESCRIPTION.to_string()),
            policy: OwnershipPolicy::SameCustomer(customer_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub account_number: AccountNumber,
    #[schema(value_type = String, example = "700.00")]
    pub new_balance: Decimal,
}

/// Outcome of a committed transfer
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    #[schema(value_type = String)]
    pub transaction_id: TransactionId,
    pub from_account: AccountBalance,
    pub to_account: AccountBalance,
    /// Full ledger row, for callers that answer with the entry itself
    #[serde(skip)]
    pub entry: LedgerEntry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(Decimal::new(1, 2)).is_ok());
        assert!(validate_amount(Decimal::new(300, 0)).is_ok());
        // trailing zeros do not count as precision
        assert!(validate_amount(Decimal::new(1_500, 3)).is_ok());
        assert_eq!(validate_amount(Decimal::ZERO), Err(BankError::InvalidAmount));
        assert_eq!(
            validate_amount(Decimal::new(-5, 0)),
            Err(BankError::InvalidAmount)
        );
        assert_eq!(
            validate_amount(Decimal::new(1_001, 3)),
            Err(BankError::InvalidAmount)
        );
        assert_eq!(validate_amount(AMOUNT_LIMIT), Err(BankError::InvalidAmount));
        assert_eq!(validate_amount(Decimal::MAX), Err(BankError::InvalidAmount));
        assert!(validate_amount(AMOUNT_LIMIT - Decimal::new(1, 2)).is_ok());
    }

    #[test]
    fn test_amount_limit_is_ten_to_the_eighteenth() {
        assert_eq!(AMOUNT_LIMIT, Decimal::from(1_000_000_000_000_000_000_i64));
    }

    #[test]
    fn test_own_request_defaults() {
        let req = TransferRequest::own(
            7,
            AccountNumber::new("1"),
            AccountNumber::new("2"),
            Decimal::ONE,
            Some("  ".into()),
        );
        assert_eq!(req.description, SELF_TRANSFER_DESCRIPTION);
        assert_eq!(req.category, SELF_TRANSFER_CATEGORY);
        assert_eq!(req.transaction_type, TransactionType::Transfer);
        assert_eq!(req.policy, OwnershipPolicy::SameCustomer(7));
    }
}
