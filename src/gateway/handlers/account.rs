//! Account handlers (open, query, deactivate)

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State},
};

use super::super::state::AppState;
use super::super::types::{
    ApiResult, ListAccountsQuery, OpenAccountRequest, ValidatedJson, created, ok,
    parse_account_no,
};
use crate::account::{Account, OpenAccount};
use crate::customer::AuthenticatedCustomer;

/// Open an account for the authenticated customer
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = OpenAccountRequest,
    responses(
        (status = 201, description = "Account opened", body = Account),
        (status = 400, description = "Invalid parameters"),
        (status = 401, description = "Authentication failed"),
        (status = 500, description = "Account number space exhausted")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn open_account(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    ValidatedJson(req): ValidatedJson<OpenAccountRequest>,
) -> ApiResult<Account> {
    let account = state
        .accounts
        .open(
            customer.customer_id,
            OpenAccount {
                ifsc: req.ifsc,
                account_type: req.account_type,
                initial_balance: req.initial_balance.map(|d| d.inner()),
            },
        )
        .await?;
    created(account)
}

/// List the authenticated customer's accounts
///
/// GET /api/v1/accounts?include_inactive=true
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    params(ListAccountsQuery),
    responses(
        (status = 200, description = "Accounts of the caller", body = Vec<Account>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    Query(params): Query<ListAccountsQuery>,
) -> ApiResult<Vec<Account>> {
    let accounts = state
        .accounts
        .list_for_customer(
            customer.customer_id,
            params.include_inactive.unwrap_or(false),
        )
        .await?;
    ok(accounts)
}

/// Get an account by number
///
/// GET /api/v1/accounts/{account_no}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{account_no}",
    params(
        ("account_no" = String, Path, description = "Account number")
    ),
    responses(
        (status = 200, description = "Account details", body = Account),
        (status = 400, description = "Malformed account number"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(account_no): Path<String>,
) -> ApiResult<Account> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    ok(state.accounts.get(&account_no).await?)
}

/// Deactivate one of the caller's accounts
///
/// POST /api/v1/accounts/{account_no}/deactivate
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{account_no}/deactivate",
    params(
        ("account_no" = String, Path, description = "Account number")
    ),
    responses(
        (status = 200, description = "Account deactivated", body = Account),
        (status = 403, description = "Account belongs to another customer"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn deactivate_account(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    Path(account_no): Path<String>,
) -> ApiResult<Account> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    ok(state
        .accounts
        .deactivate(customer.customer_id, &account_no)
        .await?)
}
