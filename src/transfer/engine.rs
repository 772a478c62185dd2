//! Transfer Engine
//!
//! Validates a transfer against fresh store reads, then hands the debit,
//! credit and ledger append to the store as one atomic unit.
//!
//! # Precondition order (first failure wins)
//!
//! 1. both accounts exist and are active
//! 2. ownership, when the policy asks for it
//! 3. source != destination
//! 4. amount > 0, at most two decimal places
//! 5. source balance covers the amount
//!
//! No check mutates anything. The store re-validates under lock, so a
//! balance drained between step 5 and the atomic phase still yields
//! `InsufficientFunds` and nothing is applied.

use rust_decimal::Decimal;
use std::sync::Arc;

use super::types::{
    AccountBalance, OwnershipPolicy, TransferRequest, TransferResult, validate_amount,
};
use crate::account::models::Account;
use crate::core_types::{AccountNumber, CustomerId};
use crate::error::BankError;
use crate::ledger::models::NewLedgerEntry;
use crate::store::{BankStore, StoreError};

pub struct TransferEngine {
    store: Arc<dyn BankStore>,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }

    /// Transfer between two accounts of the same customer
    pub async fn transfer_own(
        &self,
        customer_id: CustomerId,
        from_acc_no: &AccountNumber,
        to_acc_no: &AccountNumber,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<TransferResult, BankError> {
        self.transfer(TransferRequest::own(
            customer_id,
            from_acc_no.clone(),
            to_acc_no.clone(),
            amount,
            description,
        ))
        .await
    }

    /// Single entry point for every balance-moving request
    pub async fn transfer(&self, req: TransferRequest) -> Result<TransferResult, BankError> {
        let from = req.from_acc_no.clone();
        let to = req.to_acc_no.clone();
        let amount = req.amount;
        let policy = req.policy;

        let result = self.execute(req).await;
        match &result {
            Ok(r) => tracing::info!(
                transaction_id = %r.transaction_id,
                from = %from,
                to = %to,
                amount = %amount,
                from_balance = %r.from_account.new_balance,
                to_balance = %r.to_account.new_balance,
                "Transfer committed"
            ),
            Err(e) if e.is_rejection() => tracing::warn!(
                from = %from,
                to = %to,
                amount = %amount,
                ?policy,
                code = e.code(),
                "Transfer rejected: {}",
                e
            ),
            Err(e) => tracing::error!(
                from = %from,
                to = %to,
                amount = %amount,
                code = e.code(),
                "Transfer failed: {}",
                e
            ),
        }
        result
    }

    async fn execute(&self, req: TransferRequest) -> Result<TransferResult, BankError> {
        if !req.transaction_type.moves_balance() {
            return Err(BankError::ValidationError(format!(
                "{} does not move balances",
                req.transaction_type
            )));
        }

        // 1. existence + active
        let from = self.load_active(&req.from_acc_no).await?;
        let to = self.load_active(&req.to_acc_no).await?;

        // 2. ownership
        if let OwnershipPolicy::SameCustomer(customer_id) = req.policy {
            if from.customer_id != to.customer_id || from.customer_id != customer_id {
                return Err(BankError::OwnershipMismatch);
            }
        }

        // 3. distinct accounts
        if from.account_number == to.account_number {
            return Err(BankError::SameAccount);
        }

        // 4. amount
        validate_amount(req.amount)?;

        // 5. funds
        if from.balance < req.amount {
            return Err(BankError::InsufficientFunds);
        }

        let entry = NewLedgerEntry {
            sender_acc_no: req.from_acc_no,
            receiver_acc_no: req.to_acc_no,
            amount: req.amount,
            transaction_type: req.transaction_type,
            status: true,
            category: req.category,
            description: req.description,
            loan_id: None,
        };

        let applied = self
            .store
            .apply_transfer(entry)
            .await
            .map_err(atomic_failure)?;

        Ok(TransferResult {
            transaction_id: applied.entry.id,
            from_account: AccountBalance {
                account_number: applied.from.account_number,
                new_balance: applied.from.balance,
            },
            to_account: AccountBalance {
                account_number: applied.to.account_number,
                new_balance: applied.to.balance,
            },
            entry: applied.entry,
        })
    }

    async fn load_active(&self, account_no: &AccountNumber) -> Result<Account, BankError> {
        let account = self
            .store
            .find_by_number(account_no)
            .await
            .map_err(|e| BankError::TransferFailed(e.to_string()))?
            .ok_or_else(|| BankError::AccountNotFound(account_no.clone()))?;
        if !account.is_active() {
            return Err(BankError::AccountInactive(account_no.clone()));
        }
        Ok(account)
    }
}

/// Business outcomes detected under lock keep their type; anything else
/// means the unit was rolled back by the store.
fn atomic_failure(err: StoreError) -> BankError {
    match err {
        StoreError::AccountNotFound(no) => BankError::AccountNotFound(no),
        StoreError::AccountInactive(no) => BankError::AccountInactive(no),
        StoreError::InsufficientFunds(_) => BankError::InsufficientFunds,
        StoreError::SameAccount(_) => BankError::SameAccount,
        other => BankError::TransferFailed(other.to_string()),
    }
}
