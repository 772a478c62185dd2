//! Bank error types
//!
//! One taxonomy for every business operation. Each variant has a stable
//! string code and a suggested HTTP status; the gateway maps both onto the
//! response envelope.

use thiserror::Error;

use crate::core_types::{AccountNumber, CustomerId, TransactionId};
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    // === Account Errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Account is inactive: {0}")]
    AccountInactive(AccountNumber),

    #[error("Accounts do not belong to the same customer")]
    OwnershipMismatch,

    // === Transfer Validation Errors ===
    #[error("Source and destination account cannot be the same")]
    SameAccount,

    #[error("Amount must be greater than zero with at most 2 decimal places")]
    InvalidAmount,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Malformed request: {0}")]
    ValidationError(String),

    // === Allocation ===
    #[error("Account number space exhausted")]
    AllocationExhausted,

    // === Customer / Auth Errors ===
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    #[error("Customer already registered")]
    DuplicateCustomer,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Customer not authenticated")]
    Unauthorized,

    // === Payees ===
    #[error("Payee not found: {0}")]
    PayeeNotFound(AccountNumber),

    #[error("Account {0} is already a saved payee")]
    DuplicatePayee(AccountNumber),

    // === Ledger ===
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    // === System Errors ===
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("Internal system error: {0}")]
    Internal(String),
}

impl BankError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            BankError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            BankError::AccountInactive(_) => "ACCOUNT_INACTIVE",
            BankError::OwnershipMismatch => "OWNERSHIP_MISMATCH",
            BankError::SameAccount => "SAME_ACCOUNT",
            BankError::InvalidAmount => "INVALID_AMOUNT",
            BankError::InsufficientFunds => "INSUFFICIENT_FUNDS",
            BankError::ValidationError(_) => "VALIDATION_ERROR",
            BankError::AllocationExhausted => "ALLOCATION_EXHAUSTED",
            BankError::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            BankError::DuplicateCustomer => "DUPLICATE_CUSTOMER",
            BankError::InvalidCredentials => "INVALID_CREDENTIALS",
            BankError::Unauthorized => "UNAUTHORIZED",
            BankError::PayeeNotFound(_) => "PAYEE_NOT_FOUND",
            BankError::DuplicatePayee(_) => "DUPLICATE_PAYEE",
            BankError::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            BankError::TransferFailed(_) => "TRANSFER_FAILED",
            BankError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            BankError::SameAccount | BankError::InvalidAmount | BankError::ValidationError(_) => {
                400
            }
            BankError::Unauthorized | BankError::InvalidCredentials => 401,
            BankError::OwnershipMismatch => 403,
            BankError::AccountNotFound(_)
            | BankError::CustomerNotFound(_)
            | BankError::PayeeNotFound(_)
            | BankError::TransactionNotFound(_) => 404,
            BankError::DuplicateCustomer | BankError::DuplicatePayee(_) => 409,
            BankError::AccountInactive(_) | BankError::InsufficientFunds => 422,
            BankError::AllocationExhausted
            | BankError::TransferFailed(_)
            | BankError::Internal(_) => 500,
        }
    }

    /// Business rejections are expected outcomes; everything else is a fault.
    pub fn is_rejection(&self) -> bool {
        self.http_status() < 500
    }
}

impl From<StoreError> for BankError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound(no) => BankError::AccountNotFound(no),
            StoreError::AccountInactive(no) => BankError::AccountInactive(no),
            StoreError::InsufficientFunds(_) => BankError::InsufficientFunds,
            StoreError::SameAccount(_) => BankError::SameAccount,
            StoreError::CustomerNotFound(id) => BankError::CustomerNotFound(id),
            StoreError::DuplicateEmail => BankError::DuplicateCustomer,
            StoreError::DuplicatePayee(no) => BankError::DuplicatePayee(no),
            StoreError::DuplicateAccountNumber(no) => {
                BankError::Internal(format!("account number collision: {}", no))
            }
            StoreError::BalanceOverflow(no) => {
                BankError::Internal(format!("balance out of range: {}", no))
            }
            StoreError::Backend(msg) => BankError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(BankError::SameAccount.code(), "SAME_ACCOUNT");
        assert_eq!(BankError::InsufficientFunds.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(
            BankError::AccountNotFound(AccountNumber::new("1")).code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            BankError::TransferFailed("x".into()).code(),
            "TRANSFER_FAILED"
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(BankError::SameAccount.http_status(), 400);
        assert_eq!(BankError::InvalidAmount.http_status(), 400);
        assert_eq!(BankError::OwnershipMismatch.http_status(), 403);
        assert_eq!(
            BankError::AccountNotFound(AccountNumber::new("1")).http_status(),
            404
        );
        assert_eq!(BankError::InsufficientFunds.http_status(), 422);
        assert_eq!(BankError::AllocationExhausted.http_status(), 500);
        assert_eq!(BankError::TransferFailed("db".into()).http_status(), 500);
    }

    #[test]
    fn test_display() {
        let err = BankError::AccountInactive(AccountNumber::new("100000000001"));
        assert_eq!(err.to_string(), "Account is inactive: 100000000001");
    }

    #[test]
    fn test_store_error_mapping() {
        let no = AccountNumber::new("200000000002");
        assert_eq!(
            BankError::from(StoreError::InsufficientFunds(no.clone())),
            BankError::InsufficientFunds
        );
        assert_eq!(
            BankError::from(StoreError::AccountInactive(no.clone())),
            BankError::AccountInactive(no)
        );
        assert!(matches!(
            BankError::from(StoreError::Backend("boom".into())),
            BankError::Internal(_)
        ));
    }

    #[test]
    fn test_payee_errors() {
        let no = AccountNumber::new("300000000003");
        assert_eq!(BankError::PayeeNotFound(no.clone()).http_status(), 404);
        assert_eq!(
            BankError::from(StoreError::DuplicatePayee(no.clone())),
            BankError::DuplicatePayee(no.clone())
        );
        assert_eq!(BankError::DuplicatePayee(no).http_status(), 409);
        assert_eq!(
            BankError::from(StoreError::SameAccount(AccountNumber::new("1"))),
            BankError::SameAccount
        );
    }

    #[test]
    fn test_rejection_vs_fault() {
        assert!(BankError::InsufficientFunds.is_rejection());
        assert!(!BankError::TransferFailed("io".into()).is_rejection());
    }
}
