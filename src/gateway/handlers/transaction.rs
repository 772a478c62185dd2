//! Ledger handlers: generic transaction creation and queries

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResult, CreateTransactionRequest, ListTransactionsQuery, OwnershipCheck,
    ValidatedJson, created, ok, parse_account_no,
};
use crate::customer::AuthenticatedCustomer;
use crate::ledger::{LedgerEntry, NewLedgerEntry, TransactionType};
use crate::transfer::TransferRequest;

/// Create a ledger entry
///
/// POST /api/v1/transactions
///
/// TRANSFER and SELF_TRANSFER move balances through the transfer engine
/// with the requested ownership policy. Every other type is recorded
/// without touching balances.
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Entry created", body = LedgerEntry),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Ownership check failed"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Account inactive or insufficient funds"),
        (status = 500, description = "Transfer failed, nothing was changed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    ValidatedJson(req): ValidatedJson<CreateTransactionRequest>,
) -> ApiResult<LedgerEntry> {
    let sender = parse_account_no(&req.sender_acc_no, "senderAccNo")?;
    let receiver = parse_account_no(&req.receiver_acc_no, "receiverAccNo")?;
    let policy = req.ownership_check.policy(customer.customer_id);
    let description = req.description.unwrap_or_default();

    if req.transaction_type.moves_balance() {
        if req.status == Some(false) {
            return ApiError::bad_request(format!(
                "{} entries are always recorded with status=true",
                req.transaction_type
            ))
            .into_err();
        }
        if req.transaction_type == TransactionType::SelfTransfer
            && req.ownership_check == OwnershipCheck::Unchecked
        {
            return ApiError::bad_request("SELF_TRANSFER requires ownershipCheck=same_customer")
                .into_err();
        }

        let result = state
            .transfers
            .transfer(TransferRequest {
                from_acc_no: sender,
                to_acc_no: receiver,
                amount: req.amount.inner(),
                transaction_type: req.transaction_type,
                category: req.category,
                description,
                policy,
            })
            .await?;
        return created(result.entry);
    }

    let entry = state
        .ledger
        .record(
            NewLedgerEntry {
                sender_acc_no: sender,
                receiver_acc_no: receiver,
                amount: req.amount.inner(),
                transaction_type: req.transaction_type,
                status: req.status.unwrap_or(true),
                category: req.category,
                description,
                loan_id: req.loan_id,
            },
            policy,
        )
        .await?;
    created(entry)
}

/// List recent entries, newest first
///
/// GET /api/v1/transactions?limit=100
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<LedgerEntry>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTransactionsQuery>,
) -> ApiResult<Vec<LedgerEntry>> {
    ok(state.ledger.list(params.limit).await?)
}

/// Get a single entry
///
/// GET /api/v1/transactions/{id}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{id}",
    params(
        ("id" = String, Path, description = "Transaction ID (UUID)")
    ),
    responses(
        (status = 200, description = "Ledger entry", body = LedgerEntry),
        (status = 400, description = "Malformed transaction ID"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<LedgerEntry> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::bad_request("Invalid transaction ID format"))?;
    ok(state.ledger.get(id).await?)
}

/// Entries sent from an account
///
/// GET /api/v1/transactions/sender/{account_no}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/sender/{account_no}",
    params(
        ("account_no" = String, Path, description = "Sender account number")
    ),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = Vec<LedgerEntry>),
        (status = 400, description = "Malformed account number")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn list_by_sender(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<Vec<LedgerEntry>> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    ok(state.ledger.by_sender(&account_no).await?)
}

/// Entries received by an account
///
/// GET /api/v1/transactions/receiver/{account_no}
#[utoipa::path(
    get,
    path = "/api/v1/transactions/receiver/{account_no}",
    params(
        ("account_no" = String, Path, description = "Receiver account number")
    ),
    responses(
        (status = 200, description = "Ledger entries, newest first", body = Vec<LedgerEntry>),
        (status = 400, description = "Malformed account number")
    ),
    security(("bearer_auth" = [])),
    tag = "Transactions"
)]
pub async fn list_by_receiver(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<Vec<LedgerEntry>> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    ok(state.ledger.by_receiver(&account_no).await?)
}
