//! Store Abstraction
//!
//! Every service talks to persistence through these traits so the same
//! business code runs against PostgreSQL in production and the in-memory
//! store in tests.
//!
//! Balance mutations are always relative deltas applied atomically by the
//! store. No caller ever writes back a balance it read earlier.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::models::{Account, NewAccount};
use crate::core_types::{AccountNumber, CustomerId, TransactionId};
use crate::customer::models::{Customer, NewCustomer};
use crate::ledger::models::{LedgerEntry, NewLedgerEntry};
use crate::payee::models::{NewPayee, Payee, PayeeUpdate};

/// Store-level failures
///
/// Business outcomes detected inside an atomic unit (row vanished, went
/// inactive, or was drained by a concurrent writer) get their own variants
/// so the engine can report them precisely. `Backend` is everything else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("account {0} not found")]
    AccountNotFound(AccountNumber),

    #[error("account {0} is inactive")]
    AccountInactive(AccountNumber),

    #[error("insufficient funds in account {0}")]
    InsufficientFunds(AccountNumber),

    #[error("balance of account {0} would leave the storable range")]
    BalanceOverflow(AccountNumber),

    #[error("transfer from account {0} to itself")]
    SameAccount(AccountNumber),

    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("account number {0} already assigned")]
    DuplicateAccountNumber(AccountNumber),

    #[error("email already registered")]
    DuplicateEmail,

    #[error("account {0} is already a payee of this customer")]
    DuplicatePayee(AccountNumber),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Result of one committed transfer unit
#[derive(Debug, Clone)]
pub struct AppliedTransfer {
    pub from: Account,
    pub to: Account,
    pub entry: LedgerEntry,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_number(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError>;

    /// Accounts owned by `customer_id`, oldest first. Inactive accounts are
    /// skipped unless `include_inactive`.
    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        include_inactive: bool,
    ) -> Result<Vec<Account>, StoreError>;

    async fn account_number_exists(&self, number: &AccountNumber) -> Result<bool, StoreError>;

    async fn count_accounts(&self) -> Result<u64, StoreError>;

    /// Insert a new account. A taken number yields `DuplicateAccountNumber`.
    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn set_account_status(
        &self,
        number: &AccountNumber,
        active: bool,
    ) -> Result<Account, StoreError>;

    /// Atomically apply `delta` to an active account's balance.
    ///
    /// Fails with `InsufficientFunds` instead of letting the balance go
    /// negative, with `BalanceOverflow` when the result would not fit
    /// NUMERIC(20,2), and with `AccountInactive` for deactivated accounts.
    async fn update_balance(
        &self,
        number: &AccountNumber,
        delta: Decimal,
    ) -> Result<Account, StoreError>;
}

/// Append-only ledger: entries are written once and never updated or deleted.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError>;

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<LedgerEntry>, StoreError>;

    /// Newest first
    async fn find_by_sender(&self, number: &AccountNumber) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Newest first
    async fn find_by_receiver(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Newest first, at most `limit` rows
    async fn list_recent(&self, limit: u32) -> Result<Vec<LedgerEntry>, StoreError>;
}

#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Debit `entry.sender_acc_no`, credit `entry.receiver_acc_no` by
    /// `entry.amount` and append `entry`, as one unit.
    ///
    /// Either all three effects commit or none do. Both accounts are
    /// re-validated under lock, so a balance drained by a concurrent
    /// transfer surfaces as `InsufficientFunds` here. Sender and receiver
    /// must differ (`SameAccount`).
    async fn apply_transfer(&self, entry: NewLedgerEntry) -> Result<AppliedTransfer, StoreError>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// A taken e-mail yields `DuplicateEmail`.
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn find_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError>;

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError>;
}

/// Payees are keyed by (payer, payee account number)
#[async_trait]
pub trait PayeeStore: Send + Sync {
    /// Saving the same account twice for one payer yields `DuplicatePayee`.
    async fn create_payee(&self, payee: NewPayee) -> Result<Payee, StoreError>;

    /// Oldest first
    async fn find_payees(&self, payer: CustomerId) -> Result<Vec<Payee>, StoreError>;

    async fn find_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError>;

    /// `None` when the payer has no such payee
    async fn update_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
        update: PayeeUpdate,
    ) -> Result<Option<Payee>, StoreError>;

    /// Returns the removed row, `None` when there was nothing to remove
    async fn delete_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError>;
}

/// Everything the services need from one backend
#[async_trait]
pub trait BankStore:
    AccountStore + LedgerStore + TransferStore + CustomerStore + PayeeStore
{
    /// Backend name for logging
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;
}
