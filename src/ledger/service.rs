//! Ledger queries and non-balance-moving records

use std::sync::Arc;

use super::models::{LedgerEntry, NewLedgerEntry};
use crate::core_types::{AccountNumber, TransactionId};
use crate::error::BankError;
use crate::store::BankStore;
use crate::transfer::{OwnershipPolicy, validate_amount};

pub const DEFAULT_LIST_LIMIT: u32 = 100;
pub const MAX_LIST_LIMIT: u32 = 1000;

pub struct LedgerService {
    store: Arc<dyn BankStore>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }

    /// Append an entry that does not move balances (payments, loan events).
    ///
    /// Checks in the transfer engine's order: both accounts exist, ownership
    /// per `policy`, sender != receiver, amount. Balance-moving types are
    /// refused; they belong to the transfer engine.
    pub async fn record(
        &self,
        entry: NewLedgerEntry,
        policy: OwnershipPolicy,
    ) -> Result<LedgerEntry, BankError> {
        if entry.transaction_type.moves_balance() {
            return Err(BankError::ValidationError(format!(
                "{} entries must be created through a transfer",
                entry.transaction_type
            )));
        }

        let mut owners = Vec::with_capacity(2);
        for no in [&entry.sender_acc_no, &entry.receiver_acc_no] {
            let account = self
                .store
                .find_by_number(no)
                .await?
                .ok_or_else(|| BankError::AccountNotFound(no.clone()))?;
            owners.push(account.customer_id);
        }
        if let OwnershipPolicy::SameCustomer(customer_id) = policy {
            if owners.iter().any(|owner| *owner != customer_id) {
                return Err(BankError::OwnershipMismatch);
            }
        }
        if entry.sender_acc_no == entry.receiver_acc_no {
            return Err(BankError::SameAccount);
        }
        validate_amount(entry.amount)?;

        let row = self.store.append(entry).await?;
        tracing::info!(
            transaction_id = %row.id,
            transaction_type = %row.transaction_type,
            sender = %row.sender_acc_no,
            receiver = %row.receiver_acc_no,
            amount = %row.amount,
            "Ledger entry recorded"
        );
        Ok(row)
    }

    pub async fn get(&self, id: TransactionId) -> Result<LedgerEntry, BankError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(BankError::TransactionNotFound(id))
    }

    pub async fn by_sender(
        &self,
        account_no: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, BankError> {
        Ok(self.store.find_by_sender(account_no).await?)
    }

    pub async fn by_receiver(
        &self,
        account_no: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, BankError> {
        Ok(self.store.find_by_receiver(account_no).await?)
    }

    /// Newest first; `limit` defaults to 100 and is capped at 1000
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<LedgerEntry>, BankError> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
        Ok(self.store.list_recent(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::{AccountType, NewAccount};
    use crate::customer::models::NewCustomer;
    use crate::ledger::models::TransactionType;
    use crate::store::{AccountStore, CustomerStore, MemoryStore};
    use rust_decimal::Decimal;

    async fn setup() -> (Arc<MemoryStore>, LedgerService) {
        let store = Arc::new(MemoryStore::new());
        store
            .create_customer(NewCustomer {
                name: "Lena".into(),
                email: "lena@example.com".into(),
                phone: None,
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        for no in ["300000000001", "300000000002"] {
            store
                .create_account(NewAccount {
                    account_number: AccountNumber::new(no),
                    customer_id: 1,
                    ifsc: "IFSC001".into(),
                    account_type: AccountType::Savings,
                    initial_balance: Decimal::new(1000, 0),
                })
                .await
                .unwrap();
        }
        let svc = LedgerService::new(store.clone());
        (store, svc)
    }

    impl LedgerService {
        async fn record_any(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, BankError> {
            self.record(entry, OwnershipPolicy::Unrestricted).await
        }
    }

    fn payment(from: &str, to: &str, amount: Decimal) -> NewLedgerEntry {
        NewLedgerEntry {
            sender_acc_no: AccountNumber::new(from),
            receiver_acc_no: AccountNumber::new(to),
            amount,
            transaction_type: TransactionType::Payment,
            status: true,
            category: "Payment".into(),
            description: "Electricity bill".into(),
            loan_id: None,
        }
    }

    #[tokio::test]
    async fn test_record_payment_does_not_touch_balances() {
        let (store, svc) = setup().await;
        let row = svc
            .record_any(payment("300000000001", "300000000002", Decimal::new(50, 0)))
            .await
            .unwrap();
        assert_eq!(row.transaction_type, TransactionType::Payment);
        let a = store
            .find_by_number(&AccountNumber::new("300000000001"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(a.balance, Decimal::new(1000, 0));
        assert_eq!(svc.get(row.id).await.unwrap(), row);
    }

    #[tokio::test]
    async fn test_record_rejects_transfer_types() {
        let (_, svc) = setup().await;
        let mut entry = payment("300000000001", "300000000002", Decimal::ONE);
        entry.transaction_type = TransactionType::Transfer;
        assert!(matches!(
            svc.record_any(entry).await,
            Err(BankError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_record_validation_order() {
        let (store, svc) = setup().await;
        let err = svc
            .record_any(payment("300000000001", "399999999999", Decimal::ZERO))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BankError::AccountNotFound(AccountNumber::new("399999999999"))
        );

        let err = svc
            .record_any(payment("300000000001", "300000000001", Decimal::ZERO))
            .await
            .unwrap_err();
        assert_eq!(err, BankError::SameAccount);

        let err = svc
            .record_any(payment("300000000001", "300000000002", Decimal::ZERO))
            .await
            .unwrap_err();
        assert_eq!(err, BankError::InvalidAmount);
        assert_eq!(store.ledger_len().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_queries_newest_first() {
        let (_, svc) = setup().await;
        let first = svc
            .record_any(payment("300000000001", "300000000002", Decimal::new(1, 0)))
            .await
            .unwrap();
        let second = svc
            .record_any(payment("300000000001", "300000000002", Decimal::new(2, 0)))
            .await
            .unwrap();
        let back = svc
            .record_any(payment("300000000002", "300000000001", Decimal::new(3, 0)))
            .await
            .unwrap();

        let sent = svc
            .by_sender(&AccountNumber::new("300000000001"))
            .await
            .unwrap();
        assert_eq!(sent, vec![second.clone(), first.clone()]);

        let received = svc
            .by_receiver(&AccountNumber::new("300000000001"))
            .await
            .unwrap();
        assert_eq!(received, vec![back.clone()]);

        assert_eq!(svc.list(Some(2)).await.unwrap(), vec![back, second]);
        assert_eq!(svc.list(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_record_same_customer_policy() {
        let (_, svc) = setup().await;
        let entry = payment("300000000001", "300000000002", Decimal::ONE);
        let err = svc
            .record(entry.clone(), OwnershipPolicy::SameCustomer(2))
            .await
            .unwrap_err();
        assert_eq!(err, BankError::OwnershipMismatch);
        assert!(
            svc.record(entry, OwnershipPolicy::SameCustomer(1))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let (_, svc) = setup().await;
        let id = TransactionId::new_v4();
        assert_eq!(
            svc.get(id).await.unwrap_err(),
            BankError::TransactionNotFound(id)
        );
    }
}
