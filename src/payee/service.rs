//! Payee book: a customer's saved target accounts

use std::sync::Arc;

use super::models::{NewPayee, Payee, PayeeType, PayeeUpdate};
use crate::account::Account;
use crate::core_types::{AccountNumber, CustomerId};
use crate::error::BankError;
use crate::store::BankStore;

/// Payee creation parameters as entered by the payer
#[derive(Debug, Clone)]
pub struct AddPayee {
    pub name: String,
    pub payee_acc_no: AccountNumber,
    /// Must match the branch code stored on the account
    pub payee_ifsc: String,
    pub payee_type: PayeeType,
}

pub struct PayeeService {
    store: Arc<dyn BankStore>,
}

impl PayeeService {
    pub fn new(store: Arc<dyn BankStore>) -> Self {
        Self { store }
    }

    /// Save an active account as a payee of `payer`.
    ///
    /// The supplied IFSC is checked against the account, and the account's
    /// owner is recorded as the payee customer.
    pub async fn add(&self, payer: CustomerId, req: AddPayee) -> Result<Payee, BankError> {
        let name = display_name(&req.name)?;
        let account = self.find_account(&req.payee_acc_no, &req.payee_ifsc).await?;
        if !account.is_active() {
            return Err(BankError::AccountInactive(req.payee_acc_no));
        }

        let payee = self
            .store
            .create_payee(NewPayee {
                payer_customer_id: payer,
                name,
                payee_acc_no: account.account_number,
                payee_ifsc: account.ifsc,
                payee_customer_id: account.customer_id,
                payee_type: req.payee_type,
            })
            .await?;

        tracing::info!(
            payer,
            payee = %payee.payee_acc_no,
            payee_id = payee.payee_id,
            "Payee added"
        );
        Ok(payee)
    }

    pub async fn list(&self, payer: CustomerId) -> Result<Vec<Payee>, BankError> {
        Ok(self.store.find_payees(payer).await?)
    }

    /// Rename or retype a payee; the account binding is fixed
    pub async fn edit(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
        update: PayeeUpdate,
    ) -> Result<Payee, BankError> {
        let update = PayeeUpdate {
            name: display_name(&update.name)?,
            ..update
        };
        let payee = self
            .store
            .update_payee(payer, payee_acc_no, update)
            .await?
            .ok_or_else(|| BankError::PayeeNotFound(payee_acc_no.clone()))?;
        tracing::info!(payer, payee = %payee_acc_no, "Payee updated");
        Ok(payee)
    }

    pub async fn remove(
        &self,
        payer: CustomerId,
        payee_acc_no: &AccountNumber,
    ) -> Result<Payee, BankError> {
        let payee = self
            .store
            .delete_payee(payer, payee_acc_no)
            .await?
            .ok_or_else(|| BankError::PayeeNotFound(payee_acc_no.clone()))?;
        tracing::info!(payer, payee = %payee_acc_no, "Payee removed");
        Ok(payee)
    }

    /// Name of the customer holding `acc_no` at branch `ifsc`, shown to the
    /// payer before a payee is saved
    pub async fn account_holder_name(
        &self,
        acc_no: &AccountNumber,
        ifsc: &str,
    ) -> Result<String, BankError> {
        let account = self.find_account(acc_no, ifsc).await?;
        let customer = self
            .store
            .find_customer(account.customer_id)
            .await?
            .ok_or(BankError::CustomerNotFound(account.customer_id))?;
        Ok(customer.name)
    }

    async fn find_account(
        &self,
        acc_no: &AccountNumber,
        ifsc: &str,
    ) -> Result<Account, BankError> {
        let account = self
            .store
            .find_by_number(acc_no)
            .await?
            .ok_or_else(|| BankError::AccountNotFound(acc_no.clone()))?;
        if !account.ifsc.eq_ignore_ascii_case(ifsc.trim()) {
            return Err(BankError::ValidationError(format!(
                "IFSC {} does not match account {}",
                ifsc.trim(),
                acc_no
            )));
        }
        Ok(account)
    }
}

fn display_name(raw: &str) -> Result<String, BankError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(BankError::ValidationError(
            "payee name cannot be blank".to_string(),
        ));
    }
    Ok(name.to_string())
}
