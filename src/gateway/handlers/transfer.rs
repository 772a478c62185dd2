//! Own-account transfer handler

use std::sync::Arc;

use axum::{Extension, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResult, TransferOwnRequest, ValidatedJson, ok, parse_account_no};
use crate::customer::AuthenticatedCustomer;
use crate::transfer::TransferResult;

/// Transfer between two accounts of the authenticated customer
///
/// POST /api/v1/accounts/transfer
#[utoipa::path(
    post,
    path = "/api/v1/accounts/transfer",
    request_body = TransferOwnRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferResult),
        (status = 400, description = "Same account, invalid amount or malformed input"),
        (status = 401, description = "Authentication failed"),
        (status = 403, description = "Accounts do not both belong to the caller"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Account inactive or insufficient funds"),
        (status = 500, description = "Transfer failed, nothing was changed")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn transfer_own(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    ValidatedJson(req): ValidatedJson<TransferOwnRequest>,
) -> ApiResult<TransferResult> {
    let from = parse_account_no(&req.from_account_no, "fromAccountNo")?;
    let to = parse_account_no(&req.to_account_no, "toAccountNo")?;

    let result = state
        .transfers
        .transfer_own(
            customer.customer_id,
            &from,
            &to,
            req.amount.inner(),
            req.description,
        )
        .await?;
    ok(result)
}
