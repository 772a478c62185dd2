//! In-memory store
//!
//! Single mutex over the whole state. Every mutation is staged on copies
//! and published only when the full unit has succeeded, so an injected
//! failure leaves the state exactly as it was.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{
    AccountStore, AppliedTransfer, BankStore, CustomerStore, LedgerStore, PayeeStore, StoreError,
    TransferStore,
};
use crate::account::models::{Account, NewAccount};
use crate::core_types::{AccountNumber, CustomerId, PayeeId, TransactionId};
use crate::customer::models::{Customer, NewCustomer};
use crate::ledger::models::{LedgerEntry, NewLedgerEntry};
use crate::payee::models::{NewPayee, Payee, PayeeUpdate};
use crate::transfer::AMOUNT_LIMIT;

#[derive(Default)]
struct MemoryState {
    customers: BTreeMap<CustomerId, Customer>,
    next_customer_id: CustomerId,
    accounts: HashMap<AccountNumber, Account>,
    /// Creation order, used for stable per-customer listings
    account_order: Vec<AccountNumber>,
    ledger: Vec<LedgerEntry>,
    /// Insertion order
    payees: Vec<Payee>,
    next_payee_id: PayeeId,
}

impl MemoryState {
    fn checked_delta(
        &self,
        number: &AccountNumber,
        delta: Decimal,
    ) -> Result<Account, StoreError> {
        let account = self
            .accounts
            .get(number)
            .ok_or_else(|| StoreError::AccountNotFound(number.clone()))?;
        if !account.status {
            return Err(StoreError::AccountInactive(number.clone()));
        }
        let balance = account
            .balance
            .checked_add(delta)
            .filter(|b| *b < AMOUNT_LIMIT)
            .ok_or_else(|| StoreError::BalanceOverflow(number.clone()))?;
        if balance < Decimal::ZERO {
            return Err(StoreError::InsufficientFunds(number.clone()));
        }
        let mut staged = account.clone();
        staged.balance = balance;
        Ok(staged)
    }

    fn payee_index(&self, payer: CustomerId, payee_acc_no: &AccountNumber) -> Option<usize> {
        self.payees
            .iter()
            .position(|p| p.payer_customer_id == payer && &p.payee_acc_no == payee_acc_no)
    }

    fn newest_first<F>(&self, pred: F, limit: usize) -> Vec<LedgerEntry>
    where
        F: Fn(&LedgerEntry) -> bool,
    {
        self.ledger
            .iter()
            .rev()
            .filter(|e| pred(e))
            .take(limit)
            .cloned()
            .collect()
    }
}

/// Thread-safe in-memory implementation of every store trait
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_next_ledger_append: AtomicBool,
    apply_count: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_customer_id: 1,
                next_payee_id: 1,
                ..MemoryState::default()
            }),
            fail_next_ledger_append: AtomicBool::new(false),
            apply_count: AtomicUsize::new(0),
        }
    }

    /// Make the next ledger insert fail as a backend error. Applies to both
    /// standalone appends and the ledger step inside `apply_transfer`.
    pub fn fail_next_ledger_append(&self) {
        self.fail_next_ledger_append.store(true, Ordering::SeqCst);
    }

    /// Number of `apply_transfer` calls that reached the store
    pub fn apply_count(&self) -> usize {
        self.apply_count.load(Ordering::SeqCst)
    }

    /// Total balance across all accounts
    pub fn total_balance(&self) -> Result<Decimal, StoreError> {
        let state = self.lock()?;
        Ok(state.accounts.values().map(|a| a.balance).sum())
    }

    pub fn ledger_len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.ledger.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }

    fn take_injected_failure(&self) -> Result<(), StoreError> {
        if self.fail_next_ledger_append.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Backend("injected ledger append failure".to_string()));
        }
        Ok(())
    }

    fn build_entry(entry: NewLedgerEntry) -> LedgerEntry {
        LedgerEntry {
            id: TransactionId::new_v4(),
            sender_acc_no: entry.sender_acc_no,
            receiver_acc_no: entry.receiver_acc_no,
            amount: entry.amount,
            transaction_type: entry.transaction_type,
            status: entry.status,
            category: entry.category,
            description: entry.description,
            loan_id: entry.loan_id,
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_by_number(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError> {
        Ok(self.lock()?.accounts.get(number).cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        include_inactive: bool,
    ) -> Result<Vec<Account>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .account_order
            .iter()
            .filter_map(|no| state.accounts.get(no))
            .filter(|a| a.customer_id == customer_id && (include_inactive || a.status))
            .cloned()
            .collect())
    }

    async fn account_number_exists(&self, number: &AccountNumber) -> Result<bool, StoreError> {
        Ok(self.lock()?.accounts.contains_key(number))
    }

    async fn count_accounts(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.accounts.len() as u64)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut state = self.lock()?;
        if !state.customers.contains_key(&account.customer_id) {
            return Err(StoreError::CustomerNotFound(account.customer_id));
        }
        if state.accounts.contains_key(&account.account_number) {
            return Err(StoreError::DuplicateAccountNumber(account.account_number));
        }
        if account.initial_balance >= AMOUNT_LIMIT {
            return Err(StoreError::BalanceOverflow(account.account_number));
        }
        let row = Account {
            account_number: account.account_number.clone(),
            customer_id: account.customer_id,
            ifsc: account.ifsc,
            account_type: account.account_type,
            balance: account.initial_balance,
            status: true,
            created_at: Utc::now(),
        };
        state.account_order.push(account.account_number.clone());
        state.accounts.insert(account.account_number, row.clone());
        Ok(row)
    }

    async fn set_account_status(
        &self,
        number: &AccountNumber,
        active: bool,
    ) -> Result<Account, StoreError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .get_mut(number)
            .ok_or_else(|| StoreError::AccountNotFound(number.clone()))?;
        account.status = active;
        Ok(account.clone())
    }

    async fn update_balance(
        &self,
        number: &AccountNumber,
        delta: Decimal,
    ) -> Result<Account, StoreError> {
        let mut state = self.lock()?;
        let staged = state.checked_delta(number, delta)?;
        state.accounts.insert(number.clone(), staged.clone());
        Ok(staged)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let mut state = self.lock()?;
        for no in [&entry.sender_acc_no, &entry.receiver_acc_no] {
            if !state.accounts.contains_key(no) {
                return Err(StoreError::AccountNotFound(no.clone()));
            }
        }
        self.take_injected_failure()?;
        let row = Self::build_entry(entry);
        state.ledger.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self.lock()?.ledger.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_sender(&self, number: &AccountNumber) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .lock()?
            .newest_first(|e| &e.sender_acc_no == number, usize::MAX))
    }

    async fn find_by_receiver(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .lock()?
            .newest_first(|e| &e.receiver_acc_no == number, usize::MAX))
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self.lock()?.newest_first(|_| true, limit as usize))
    }
}

#[async_trait]
impl TransferStore for MemoryStore {
    async fn apply_transfer(&self, entry: NewLedgerEntry) -> Result<AppliedTransfer, StoreError> {
        self.apply_count.fetch_add(1, Ordering::SeqCst);
        if entry.sender_acc_no == entry.receiver_acc_no {
            return Err(StoreError::SameAccount(entry.sender_acc_no));
        }
        let mut state = self.lock()?;

        // Stage
        let from = state.checked_delta(&entry.sender_acc_no, -entry.amount)?;
        let to = state.checked_delta(&entry.receiver_acc_no, entry.amount)?;
        self.take_injected_failure()?;
        let row = Self::build_entry(entry);

        // Publish
        state
            .accounts
            .insert(from.account_number.clone(), from.clone());
        state.accounts.insert(to.account_number.clone(), to.clone());
        state.ledger.push(row.clone());

        Ok(AppliedTransfer {
            from,
            to,
            entry: row,
        })
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let mut state = self.lock()?;
        let email = customer.email.to_lowercase();
        if state.customers.values().any(|c| c.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let customer_id = state.next_customer_id;
        state.next_customer_id += 1;
        let row = Customer {
            customer_id,
            name: customer.name,
            email,
            phone: customer.phone,
            password_hash: customer.password_hash,
            created_at: Utc::now(),
        };
        state.customers.insert(customer_id, row.clone());
        Ok(row)
    }

    async fn find_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.lock()?.customers.get(&customer_id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let email = email.to_lowercase();
        Ok(self
            .lock()?
            .customers
            .values()
            .find(|c| c.email == email)
            .cloned())
    }
}

#[async_trait]
impl PayeeStore for MemoryStore {
    async fn create_payee(&self, payee: NewPayee) -> Result<Payee, StoreError> {
        let mut state = self.lock()?;
        for customer_id in [payee.payer_customer_id, payee.payee_customer_id] {
            if !state.customers.contains_key(&customer_id) {
                return Err(StoreError::CustomerNotFound(customer_id));
            }
        }
        if !state.accounts.contains_key(&payee.payee_acc_no) {
            return Err(StoreError::AccountNotFound(payee.payee_acc_no));
        }
        if state
            .payee_index(payee.payer_customer_id, &payee.payee_acc_no)
            .is_some()
        {
            return Err(StoreError::DuplicatePayee(payee.payee_acc_no));
        }
        let payee_id = state.next_payee_id;
        state.next_payee_id += 1;
        let now = Utc::now();
        let row = Payee {
            payee_id,
            payer_customer_id: payee.payer_customer_id,
            name: payee.name,
            payee_acc_no: payee.payee_acc_no,
            payee_ifsc: payee.payee_ifsc,
            payee_customer_id: payee.payee_customer_id,
            payee_type: payee.payee_type,
            created_at: now,
            updated_at: now,
        };
        state.payees.push(row.clone());
        Ok(row)
    }

    async fn find_payees(&self, payer: CustomerId) -> Result<Vec<Payee>, StoreError> {
        Ok(self
            .lock()?
            .payees
            .iter()
            .filter(|p| p.payer_customer_id == payer)
            .cloned()
            .collect())
    }

    async fn find_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .payee_index(payer, payee_acc_no)
            .map(|i| state.payees[i].clone()))
    }

    async fn update_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
        update: PayeeUpdate,
    ) -> Result<Option<Payee>, StoreError> {
        let mut state = self.lock()?;
        let Some(i) = state.payee_index(payer, payee_acc_no) else {
            return Ok(None);
        };
        let payee = &mut state.payees[i];
        payee.name = update.name;
        payee.payee_type = update.payee_type;
        payee.updated_at = Utc::now();
        Ok(Some(payee.clone()))
    }

    async fn delete_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError> {
        let mut state = self.lock()?;
        Ok(state
            .payee_index(payer, payee_acc_no)
            .map(|i| state.payees.remove(i)))
    }
}

#[async_trait]
impl BankStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}
