//! Account lifecycle: open, look up, list, deactivate

use rust_decimal::Decimal;
use std::sync::Arc;

use super::allocator::AccountNumberAllocator;
use super::models::{Account, AccountType, NewAccount};
use crate::core_types::{AccountNumber, CustomerId};
use crate::error::BankError;
use crate::store::{BankStore, StoreError};
use crate::transfer::{AMOUNT_LIMIT, MAX_AMOUNT_SCALE};

/// Account opening parameters; omitted fields take defaults
#[derive(Debug, Clone, Default)]
pub struct OpenAccount {
    pub ifsc: Option<String>,
    pub account_type: Option<AccountType>,
    pub initial_balance: Option<Decimal>,
}

pub struct AccountService {
    store: Arc<dyn BankStore>,
    allocator: AccountNumberAllocator,
    default_ifsc: String,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn BankStore>,
        allocator: AccountNumberAllocator,
        default_ifsc: impl Into<String>,
    ) -> Self {
        Self {
            store,
            allocator,
            default_ifsc: default_ifsc.into(),
        }
    }

    /// Open an account for an existing customer.
    ///
    /// The number comes from the allocator. If the insert still loses a race
    /// for that number, a fresh one is allocated and the insert retried.
    pub async fn open(
        &self,
        customer_id: CustomerId,
        req: OpenAccount,
    ) -> Result<Account, BankError> {
        if self.store.find_customer(customer_id).await?.is_none() {
            return Err(BankError::CustomerNotFound(customer_id));
        }

        let initial_balance = req.initial_balance.unwrap_or(Decimal::ZERO);
        if initial_balance < Decimal::ZERO {
            return Err(BankError::ValidationError(
                "initial balance cannot be negative".to_string(),
            ));
        }
        if initial_balance >= AMOUNT_LIMIT {
            return Err(BankError::ValidationError(format!(
                "initial balance must be below {}",
                AMOUNT_LIMIT
            )));
        }
        if initial_balance.normalize().scale() > MAX_AMOUNT_SCALE {
            return Err(BankError::ValidationError(format!(
                "initial balance allows at most {} decimal places",
                MAX_AMOUNT_SCALE
            )));
        }

        let ifsc = match req.ifsc {
            Some(ifsc) if !ifsc.trim().is_empty() => ifsc.trim().to_uppercase(),
            _ => self.default_ifsc.clone(),
        };
        let account_type = req.account_type.unwrap_or_default();

        loop {
            let account_number = self.allocator.allocate(self.store.as_ref()).await?;
            let new = NewAccount {
                account_number,
                customer_id,
                ifsc: ifsc.clone(),
                account_type,
                initial_balance,
            };
            match self.store.create_account(new).await {
                Ok(account) => {
                    tracing::info!(
                        account = %account.account_number,
                        customer_id,
                        account_type = %account.account_type,
                        balance = %account.balance,
                        "Account opened"
                    );
                    return Ok(account);
                }
                Err(StoreError::DuplicateAccountNumber(taken)) => {
                    tracing::warn!(
                        account = %taken,
                        "Account number taken at insert, reallocating"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Inactive accounts are returned too; callers check `status`.
    pub async fn get(&self, account_no: &AccountNumber) -> Result<Account, BankError> {
        self.store
            .find_by_number(account_no)
            .await?
            .ok_or_else(|| BankError::AccountNotFound(account_no.clone()))
    }

    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
        include_inactive: bool,
    ) -> Result<Vec<Account>, BankError> {
        Ok(self
            .store
            .find_by_customer(customer_id, include_inactive)
            .await?)
    }

    /// Owner-only and idempotent
    pub async fn deactivate(
        &self,
        customer_id: CustomerId,
        account_no: &AccountNumber,
    ) -> Result<Account, BankError> {
        let account = self.get(account_no).await?;
        if account.customer_id != customer_id {
            return Err(BankError::OwnershipMismatch);
        }
        if !account.status {
            return Ok(account);
        }
        let account = self.store.set_account_status(account_no, false).await?;
        tracing::info!(account = %account_no, customer_id, "Account deactivated");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::models::NewCustomer;
    use crate::store::{AccountStore, CustomerStore, MemoryStore};

    async fn setup() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        for (name, email) in [("Meera", "meera@example.com"), ("Karan", "karan@example.com")] {
            store
                .create_customer(NewCustomer {
                    name: name.into(),
                    email: email.into(),
                    phone: None,
                    password_hash: "h".into(),
                })
                .await
                .unwrap();
        }
        let svc = AccountService::new(
            store.clone(),
            AccountNumberAllocator::default(),
            "IFSC001",
        );
        (store, svc)
    }

    #[tokio::test]
    async fn test_open_with_defaults() {
        let (_, svc) = setup().await;
        let acc = svc.open(1, OpenAccount::default()).await.unwrap();
        assert_eq!(acc.account_number.as_str().len(), 12);
        assert_eq!(acc.account_type, AccountType::Savings);
        assert_eq!(acc.ifsc, "IFSC001");
        assert!(acc.balance.is_zero());
        assert!(acc.status);
    }

    #[tokio::test]
    async fn test_open_with_initial_balance_and_type() {
        let (_, svc) = setup().await;
        let acc = svc
            .open(
                2,
                OpenAccount {
                    ifsc: Some("ifsc002".into()),
                    account_type: Some(AccountType::Current),
                    initial_balance: Some(Decimal::new(250_050, 2)),
                },
            )
            .await
            .unwrap();
        assert_eq!(acc.ifsc, "IFSC002");
        assert_eq!(acc.account_type, AccountType::Current);
        assert_eq!(acc.balance, Decimal::new(250_050, 2));
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_customer() {
        let (_, svc) = setup().await;
        let err = svc.open(99, OpenAccount::default()).await.unwrap_err();
        assert_eq!(err, BankError::CustomerNotFound(99));
    }

    #[tokio::test]
    async fn test_open_rejects_negative_or_fine_grained_balance() {
        let (_, svc) = setup().await;
        let negative = OpenAccount {
            initial_balance: Some(Decimal::new(-1, 0)),
            ..OpenAccount::default()
        };
        assert!(matches!(
            svc.open(1, negative).await,
            Err(BankError::ValidationError(_))
        ));
        let fine = OpenAccount {
            initial_balance: Some(Decimal::new(1_001, 3)),
            ..OpenAccount::default()
        };
        assert!(matches!(
            svc.open(1, fine).await,
            Err(BankError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_open_rejects_balance_beyond_storage_range() {
        let (store, svc) = setup().await;
        for balance in [Decimal::MAX, AMOUNT_LIMIT] {
            let req = OpenAccount {
                initial_balance: Some(balance),
                ..OpenAccount::default()
            };
            assert!(matches!(
                svc.open(1, req).await,
                Err(BankError::ValidationError(_))
            ));
        }
        assert_eq!(store.count_accounts().await.unwrap(), 0);

        let largest = AMOUNT_LIMIT - Decimal::new(1, 2);
        let acc = svc
            .open(
                1,
                OpenAccount {
                    initial_balance: Some(largest),
                    ..OpenAccount::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(acc.balance, largest);
    }

    #[tokio::test]
    async fn test_list_and_deactivate() {
        let (_, svc) = setup().await;
        let a = svc.open(1, OpenAccount::default()).await.unwrap();
        let b = svc.open(1, OpenAccount::default()).await.unwrap();
        svc.open(2, OpenAccount::default()).await.unwrap();

        assert_eq!(svc.list_for_customer(1, false).await.unwrap().len(), 2);

        let err = svc.deactivate(2, &a.account_number).await.unwrap_err();
        assert_eq!(err, BankError::OwnershipMismatch);

        let closed = svc.deactivate(1, &a.account_number).await.unwrap();
        assert!(!closed.status);
        // idempotent
        assert!(!svc.deactivate(1, &a.account_number).await.unwrap().status);

        let active = svc.list_for_customer(1, false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].account_number, b.account_number);
        assert_eq!(svc.list_for_customer(1, true).await.unwrap().len(), 2);

        // deactivated accounts remain readable
        assert!(!svc.get(&a.account_number).await.unwrap().status);
    }

    #[tokio::test]
    async fn test_get_missing_account() {
        let (_, svc) = setup().await;
        let no = AccountNumber::new("999999999999");
        assert_eq!(
            svc.get(&no).await.unwrap_err(),
            BankError::AccountNotFound(no)
        );
    }
}
