use std::sync::Arc;

use crate::account::{AccountNumberAllocator, AccountService};
use crate::customer::CustomerService;
use crate::ledger::LedgerService;
use crate::payee::PayeeService;
use crate::store::BankStore;
use crate::transfer::TransferEngine;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Backing store (health checks)
    pub store: Arc<dyn BankStore>,
    pub accounts: Arc<AccountService>,
    pub ledger: Arc<LedgerService>,
    pub transfers: Arc<TransferEngine>,
    pub customers: Arc<CustomerService>,
    pub payees: Arc<PayeeService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn BankStore>,
        accounts: Arc<AccountService>,
        ledger: Arc<LedgerService>,
        transfers: Arc<TransferEngine>,
        customers: Arc<CustomerService>,
        payees: Arc<PayeeService>,
    ) -> Self {
        Self {
            store,
            accounts,
            ledger,
            transfers,
            customers,
            payees,
        }
    }

    /// Wire every service onto one store
    pub fn from_store(
        store: Arc<dyn BankStore>,
        allocator: AccountNumberAllocator,
        default_ifsc: &str,
        jwt_secret: String,
        token_ttl_hours: i64,
    ) -> Self {
        Self::new(
            store.clone(),
            Arc::new(AccountService::new(store.clone(), allocator, default_ifsc)),
            Arc::new(LedgerService::new(store.clone())),
            Arc::new(TransferEngine::new(store.clone())),
            Arc::new(CustomerService::new(
                store.clone(),
                jwt_secret,
                token_ttl_hours,
            )),
            Arc::new(PayeeService::new(store)),
        )
    }
}
