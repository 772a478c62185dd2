//! Request bodies and the validating JSON extractor

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::{Deserialize, de::DeserializeOwned};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::money::StrictDecimal;
use super::response::ApiError;
use crate::account::models::AccountType;
use crate::core_types::{AccountNumber, CustomerId};
use crate::error::BankError;
use crate::ledger::models::TransactionType;
use crate::payee::models::PayeeType;
use crate::transfer::OwnershipPolicy;

// ============================================================================
// ValidatedJson extractor
// ============================================================================

/// `Json<T>` plus `validator` rules; both failures become 400 INVALID_PARAMETER
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        Ok(ValidatedJson(value))
    }
}

/// Digits-only account number from a path segment or body field
pub fn parse_account_no(raw: &str, field: &str) -> Result<AccountNumber, ApiError> {
    AccountNumber::parse(raw).ok_or_else(|| {
        BankError::ValidationError(format!("{} must be a non-empty string of digits", field))
            .into()
    })
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountRequest {
    /// Branch code; the configured default when omitted
    #[validate(length(min = 1, max = 16, message = "ifsc must be 1-16 characters"))]
    #[schema(example = "BANK0001234")]
    pub ifsc: Option<String>,
    /// SAVINGS when omitted
    pub account_type: Option<AccountType>,
    #[schema(value_type = Option<String>, example = "1000.00")]
    pub initial_balance: Option<StrictDecimal>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAccountsQuery {
    /// Include deactivated accounts
    pub include_inactive: Option<bool>,
}

/// Own-account transfer body
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferOwnRequest {
    #[schema(example = "482910375561")]
    pub from_account_no: String,
    #[schema(example = "593021486672")]
    pub to_account_no: String,
    #[schema(value_type = String, example = "300.00")]
    pub amount: StrictDecimal,
    #[validate(length(max = 255, message = "description is too long"))]
    #[schema(example = "Rent")]
    pub description: Option<String>,
}

// ============================================================================
// Transactions
// ============================================================================

/// Ownership policy chosen by the caller of the generic endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipCheck {
    /// Both accounts must belong to the authenticated customer
    SameCustomer,
    /// No ownership check (third-party transfer)
    #[serde(rename = "none")]
    Unchecked,
}

impl OwnershipCheck {
    pub fn policy(self, customer_id: CustomerId) -> OwnershipPolicy {
        match self {
            OwnershipCheck::SameCustomer => OwnershipPolicy::SameCustomer(customer_id),
            OwnershipCheck::Unchecked => OwnershipPolicy::Unrestricted,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    #[schema(example = "482910375561")]
    pub sender_acc_no: String,
    #[schema(example = "593021486672")]
    pub receiver_acc_no: String,
    #[schema(value_type = String, example = "49.99")]
    pub amount: StrictDecimal,
    pub transaction_type: TransactionType,
    /// Defaults to true; balance-moving types only accept true
    pub status: Option<bool>,
    #[validate(length(min = 1, max = 64, message = "category must be 1-64 characters"))]
    #[schema(example = "Utilities")]
    pub category: String,
    #[validate(length(max = 255, message = "description is too long"))]
    pub description: Option<String>,
    pub loan_id: Option<i64>,
    pub ownership_check: OwnershipCheck,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTransactionsQuery {
    /// Max rows, newest first (default 100, max 1000)
    pub limit: Option<u32>,
}

// ============================================================================
// Payees
// ============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPayeeRequest {
    #[validate(length(min = 1, max = 128, message = "name must be 1-128 characters"))]
    #[schema(example = "Landlord")]
    pub name: String,
    #[schema(example = "593021486672")]
    pub payee_acc_no: String,
    #[validate(length(min = 1, max = 16, message = "payeeIfsc must be 1-16 characters"))]
    #[schema(example = "BANK0000001")]
    pub payee_ifsc: String,
    /// INDIVIDUAL when omitted
    pub payee_type: Option<PayeeType>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPayeeRequest {
    #[validate(length(min = 1, max = 128, message = "name must be 1-128 characters"))]
    pub name: String,
    pub payee_type: PayeeType,
}

/// Account holder lookup before saving a payee
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayeeNameRequest {
    #[schema(example = "593021486672")]
    pub payee_acc_no: String,
    #[validate(length(min = 1, max = 16, message = "payeeIfsc must be 1-16 characters"))]
    #[schema(example = "BANK0000001")]
    pub payee_ifsc: String,
}
