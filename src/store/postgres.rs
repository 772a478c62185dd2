//! PostgreSQL store
//!
//! Balance updates are single conditional `UPDATE ... SET balance = balance + $delta`
//! statements. A transfer runs inside one database transaction that locks
//! both account rows in account-number order before touching them.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{PgPool, Row};

use super::{
    AccountStore, AppliedTransfer, BankStore, CustomerStore, LedgerStore, PayeeStore, StoreError,
    TransferStore,
};
use crate::account::models::{Account, AccountType, NewAccount};
use crate::core_types::{AccountNumber, CustomerId, TransactionId};
use crate::customer::models::{Customer, NewCustomer};
use crate::db::Database;
use crate::ledger::models::{LedgerEntry, NewLedgerEntry, TransactionType};
use crate::payee::models::{NewPayee, Payee, PayeeType, PayeeUpdate};

const ACCOUNT_COLUMNS: &str =
    "account_number, customer_id, ifsc, account_type, balance, status, created_at";

const LEDGER_COLUMNS: &str = "transaction_id, sender_acc_no, receiver_acc_no, amount, \
     transaction_type, status, category, description, loan_id, created_at";

const CUSTOMER_COLUMNS: &str = "customer_id, name, email, phone, password_hash, created_at";

const PAYEE_COLUMNS: &str = "payee_id, payer_customer_id, name, payee_acc_no, payee_ifsc, \
     payee_customer_id, payee_type, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

fn is_numeric_overflow(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == NUMERIC_VALUE_OUT_OF_RANGE)
}

/// Returns the violated constraint name when `err` carries `sqlstate`
fn constraint_violation<'e>(err: &'e sqlx::Error, sqlstate: &str) -> Option<&'e str> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() == Some(sqlstate) {
        db_err.constraint().or(Some(""))
    } else {
        None
    }
}

/// PostgreSQL-backed implementation of every store trait
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, StoreError> {
        let account_type: i16 = row.try_get("account_type")?;
        Ok(Account {
            account_number: AccountNumber::new(row.try_get::<String, _>("account_number")?),
            customer_id: row.try_get("customer_id")?,
            ifsc: row.try_get("ifsc")?,
            account_type: AccountType::try_from(account_type).map_err(StoreError::Backend)?,
            balance: row.try_get("balance")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_entry(row: &PgRow) -> Result<LedgerEntry, StoreError> {
        let transaction_type: i16 = row.try_get("transaction_type")?;
        Ok(LedgerEntry {
            id: row.try_get("transaction_id")?,
            sender_acc_no: AccountNumber::new(row.try_get::<String, _>("sender_acc_no")?),
            receiver_acc_no: AccountNumber::new(row.try_get::<String, _>("receiver_acc_no")?),
            amount: row.try_get("amount")?,
            transaction_type: TransactionType::try_from(transaction_type)
                .map_err(StoreError::Backend)?,
            status: row.try_get("status")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            loan_id: row.try_get("loan_id")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_customer(row: &PgRow) -> Result<Customer, StoreError> {
        Ok(Customer {
            customer_id: row.try_get("customer_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_payee(row: &PgRow) -> Result<Payee, StoreError> {
        let payee_type: i16 = row.try_get("payee_type")?;
        Ok(Payee {
            payee_id: row.try_get("payee_id")?,
            payer_customer_id: row.try_get("payer_customer_id")?,
            name: row.try_get("name")?,
            payee_acc_no: AccountNumber::new(row.try_get::<String, _>("payee_acc_no")?),
            payee_ifsc: row.try_get("payee_ifsc")?,
            payee_customer_id: row.try_get("payee_customer_id")?,
            payee_type: PayeeType::try_from(payee_type).map_err(StoreError::Backend)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Conditional relative update. When no row matches, a follow-up read
    /// tells apart a missing, inactive or underfunded account.
    async fn apply_delta(
        conn: &mut PgConnection,
        number: &AccountNumber,
        delta: Decimal,
    ) -> Result<Account, StoreError> {
        let sql = format!(
            "UPDATE accounts_tb SET balance = balance + $2 \
             WHERE account_number = $1 AND status AND balance + $2 >= 0 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(number.as_str())
            .bind(delta)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                if is_numeric_overflow(&e) {
                    StoreError::BalanceOverflow(number.clone())
                } else {
                    e.into()
                }
            })?;

        if let Some(row) = row {
            return Self::row_to_account(&row);
        }

        let status = sqlx::query_scalar::<_, bool>(
            "SELECT status FROM accounts_tb WHERE account_number = $1",
        )
        .bind(number.as_str())
        .fetch_optional(&mut *conn)
        .await?;

        Err(match status {
            None => StoreError::AccountNotFound(number.clone()),
            Some(false) => StoreError::AccountInactive(number.clone()),
            Some(true) => StoreError::InsufficientFunds(number.clone()),
        })
    }

    async fn insert_entry(
        conn: &mut PgConnection,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, StoreError> {
        let sql = format!(
            "INSERT INTO transactions_tb \
                 (transaction_id, sender_acc_no, receiver_acc_no, amount, transaction_type, \
                  status, category, description, loan_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {LEDGER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(TransactionId::new_v4())
            .bind(entry.sender_acc_no.as_str())
            .bind(entry.receiver_acc_no.as_str())
            .bind(entry.amount)
            .bind(i16::from(entry.transaction_type))
            .bind(entry.status)
            .bind(&entry.category)
            .bind(&entry.description)
            .bind(entry.loan_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| match constraint_violation(&e, FOREIGN_KEY_VIOLATION) {
                Some("transactions_tb_receiver_acc_no_fkey") => {
                    StoreError::AccountNotFound(entry.receiver_acc_no.clone())
                }
                Some(_) => StoreError::AccountNotFound(entry.sender_acc_no.clone()),
                None => e.into(),
            })?;
        Self::row_to_entry(&row)
    }

    async fn fetch_entries(
        &self,
        filter: &str,
        number: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM transactions_tb WHERE {filter} = $1 \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(number.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn find_by_number(&self, number: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts_tb WHERE account_number = $1");
        let row = sqlx::query(&sql)
            .bind(number.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn find_by_customer(
        &self,
        customer_id: CustomerId,
        include_inactive: bool,
    ) -> Result<Vec<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts_tb \
             WHERE customer_id = $1 AND (status OR $2) \
             ORDER BY account_id"
        );
        let rows = sqlx::query(&sql)
            .bind(customer_id)
            .bind(include_inactive)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_account).collect()
    }

    async fn account_number_exists(&self, number: &AccountNumber) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM accounts_tb WHERE account_number = $1)",
        )
        .bind(number.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count_accounts(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts_tb")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            "INSERT INTO accounts_tb (account_number, customer_id, ifsc, account_type, balance) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(account.account_number.as_str())
            .bind(account.customer_id)
            .bind(&account.ifsc)
            .bind(i16::from(account.account_type))
            .bind(account.initial_balance)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if constraint_violation(&e, UNIQUE_VIOLATION) == Some("uq_accounts_number") {
                    StoreError::DuplicateAccountNumber(account.account_number.clone())
                } else if constraint_violation(&e, FOREIGN_KEY_VIOLATION).is_some() {
                    StoreError::CustomerNotFound(account.customer_id)
                } else if is_numeric_overflow(&e) {
                    StoreError::BalanceOverflow(account.account_number.clone())
                } else {
                    e.into()
                }
            })?;

        tracing::info!(
            account = %account.account_number,
            customer_id = account.customer_id,
            "Account row inserted"
        );
        Self::row_to_account(&row)
    }

    async fn set_account_status(
        &self,
        number: &AccountNumber,
        active: bool,
    ) -> Result<Account, StoreError> {
        let sql = format!(
            "UPDATE accounts_tb SET status = $2 WHERE account_number = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(number.as_str())
            .bind(active)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::AccountNotFound(number.clone()))?;
        Self::row_to_account(&row)
    }

    async fn update_balance(
        &self,
        number: &AccountNumber,
        delta: Decimal,
    ) -> Result<Account, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::apply_delta(&mut conn, number, delta).await
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn append(&self, entry: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_entry(&mut conn, entry).await
    }

    async fn find_by_id(&self, id: TransactionId) -> Result<Option<LedgerEntry>, StoreError> {
        let sql = format!("SELECT {LEDGER_COLUMNS} FROM transactions_tb WHERE transaction_id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_entry).transpose()
    }

    async fn find_by_sender(&self, number: &AccountNumber) -> Result<Vec<LedgerEntry>, StoreError> {
        self.fetch_entries("sender_acc_no", number).await
    }

    async fn find_by_receiver(
        &self,
        number: &AccountNumber,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        self.fetch_entries("receiver_acc_no", number).await
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<LedgerEntry>, StoreError> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM transactions_tb ORDER BY created_at DESC LIMIT $1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_entry).collect()
    }
}

#[async_trait]
impl TransferStore for PostgresStore {
    async fn apply_transfer(&self, entry: NewLedgerEntry) -> Result<AppliedTransfer, StoreError> {
        if entry.sender_acc_no == entry.receiver_acc_no {
            return Err(StoreError::SameAccount(entry.sender_acc_no));
        }
        let mut tx = self.pool.begin().await?;

        // Lock both rows in a global order so opposite-direction transfers
        // cannot deadlock.
        let mut lock_order = vec![
            entry.sender_acc_no.as_str().to_string(),
            entry.receiver_acc_no.as_str().to_string(),
        ];
        lock_order.sort();
        let locked: Vec<String> = sqlx::query_scalar(
            "SELECT account_number FROM accounts_tb \
             WHERE account_number = ANY($1) \
             ORDER BY account_number \
             FOR UPDATE",
        )
        .bind(lock_order.as_slice())
        .fetch_all(&mut *tx)
        .await?;

        for no in [&entry.sender_acc_no, &entry.receiver_acc_no] {
            if !locked.iter().any(|l| l == no.as_str()) {
                return Err(StoreError::AccountNotFound(no.clone()));
            }
        }

        let from = Self::apply_delta(&mut tx, &entry.sender_acc_no, -entry.amount).await?;
        let to = Self::apply_delta(&mut tx, &entry.receiver_acc_no, entry.amount).await?;
        let entry = Self::insert_entry(&mut tx, entry).await?;

        tx.commit().await?;

        Ok(AppliedTransfer { from, to, entry })
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError> {
        let sql = format!(
            "INSERT INTO customers_tb (name, email, phone, password_hash) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {CUSTOMER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&customer.name)
            .bind(customer.email.to_lowercase())
            .bind(&customer.phone)
            .bind(&customer.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if constraint_violation(&e, UNIQUE_VIOLATION) == Some("uq_customers_email") {
                    StoreError::DuplicateEmail
                } else {
                    e.into()
                }
            })?;
        Self::row_to_customer(&row)
    }

    async fn find_customer(&self, customer_id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers_tb WHERE customer_id = $1");
        let row = sqlx::query(&sql)
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers_tb WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_customer).transpose()
    }
}

#[async_trait]
impl PayeeStore for PostgresStore {
    async fn create_payee(&self, payee: NewPayee) -> Result<Payee, StoreError> {
        let sql = format!(
            "INSERT INTO payees_tb (payer_customer_id, name, payee_acc_no, payee_ifsc, \
                 payee_customer_id, payee_type) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PAYEE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(payee.payer_customer_id)
            .bind(&payee.name)
            .bind(payee.payee_acc_no.as_str())
            .bind(&payee.payee_ifsc)
            .bind(payee.payee_customer_id)
            .bind(i16::from(payee.payee_type))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if constraint_violation(&e, UNIQUE_VIOLATION) == Some("uq_payees_payer_account") {
                    return StoreError::DuplicatePayee(payee.payee_acc_no.clone());
                }
                match constraint_violation(&e, FOREIGN_KEY_VIOLATION) {
                    Some("payees_tb_payee_acc_no_fkey") => {
                        StoreError::AccountNotFound(payee.payee_acc_no.clone())
                    }
                    Some("payees_tb_payee_customer_id_fkey") => {
                        StoreError::CustomerNotFound(payee.payee_customer_id)
                    }
                    Some(_) => StoreError::CustomerNotFound(payee.payer_customer_id),
                    None => e.into(),
                }
            })?;
        Self::row_to_payee(&row)
    }

    async fn find_payees(&self, payer: CustomerId) -> Result<Vec<Payee>, StoreError> {
        let sql = format!(
            "SELECT {PAYEE_COLUMNS} FROM payees_tb WHERE payer_customer_id = $1 \
             ORDER BY payee_id"
        );
        let rows = sqlx::query(&sql)
            .bind(payer)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_payee).collect()
    }

    async fn find_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError> {
        let sql = format!(
            "SELECT {PAYEE_COLUMNS} FROM payees_tb \
             WHERE payer_customer_id = $1 AND payee_acc_no = $2"
        );
        let row = sqlx::query(&sql)
            .bind(payer)
            .bind(payee_acc_no.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_payee).transpose()
    }

    async fn update_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
        update: PayeeUpdate,
    ) -> Result<Option<Payee>, StoreError> {
        let sql = format!(
            "UPDATE payees_tb SET name = $3, payee_type = $4, updated_at = now() \
             WHERE payer_customer_id = $1 AND payee_acc_no = $2 \
             RETURNING {PAYEE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(payer)
            .bind(payee_acc_no.as_str())
            .bind(&update.name)
            .bind(i16::from(update.payee_type))
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_payee).transpose()
    }

    async fn delete_payee(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Option<Payee>, StoreError> {
        let sql = format!(
            "DELETE FROM payees_tb WHERE payer_customer_id = $1 AND payee_acc_no = $2 \
             RETURNING {PAYEE_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(payer)
            .bind(payee_acc_no.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_payee).transpose()
    }
}

#[async_trait]
impl BankStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
