//! Payee handlers; the payer is always the authenticated customer

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::{
    AddPayeeRequest, ApiResult, EditPayeeRequest, PayeeNameRequest, ValidatedJson, created, ok,
    parse_account_no,
};
use crate::customer::AuthenticatedCustomer;
use crate::payee::{AddPayee, Payee, PayeeUpdate};

/// Holder of a prospective payee account
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayeeNameResponse {
    #[schema(example = "Ravi Kumar")]
    pub customer_name: String,
}

/// Save a payee
///
/// POST /api/v1/payees
#[utoipa::path(
    post,
    path = "/api/v1/payees",
    request_body = AddPayeeRequest,
    responses(
        (status = 201, description = "Payee saved", body = Payee),
        (status = 400, description = "Invalid parameters or IFSC mismatch"),
        (status = 404, description = "Payee account not found"),
        (status = 409, description = "Account already saved as payee"),
        (status = 422, description = "Payee account inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "Payees"
)]
pub async fn add_payee(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    ValidatedJson(req): ValidatedJson<AddPayeeRequest>,
) -> ApiResult<Payee> {
    let payee_acc_no = parse_account_no(&req.payee_acc_no, "payeeAccNo")?;
    let payee = state
        .payees
        .add(
            customer.customer_id,
            AddPayee {
                name: req.name,
                payee_acc_no,
                payee_ifsc: req.payee_ifsc,
                payee_type: req.payee_type.unwrap_or_default(),
            },
        )
        .await?;
    created(payee)
}

/// List the caller's payees
///
/// GET /api/v1/payees
#[utoipa::path(
    get,
    path = "/api/v1/payees",
    responses(
        (status = 200, description = "Payees of the caller", body = Vec<Payee>),
        (status = 401, description = "Authentication failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Payees"
)]
pub async fn list_payees(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
) -> ApiResult<Vec<Payee>> {
    ok(state.payees.list(customer.customer_id).await?)
}

/// Rename or retype a payee
///
/// PUT /api/v1/payees/{account_no}
#[utoipa::path(
    put,
    path = "/api/v1/payees/{account_no}",
    params(
        ("account_no" = String, Path, description = "Payee account number")
    ),
    request_body = EditPayeeRequest,
    responses(
        (status = 200, description = "Payee updated", body = Payee),
        (status = 400, description = "Invalid parameters"),
        (status = 404, description = "No such payee for the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Payees"
)]
pub async fn edit_payee(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    Path(account_no): Path<String>,
    ValidatedJson(req): ValidatedJson<EditPayeeRequest>,
) -> ApiResult<Payee> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    let payee = state
        .payees
        .edit(
            customer.customer_id,
            &account_no,
            PayeeUpdate {
                name: req.name,
                payee_type: req.payee_type,
            },
        )
        .await?;
    ok(payee)
}

/// Delete a payee
///
/// DELETE /api/v1/payees/{account_no}
#[utoipa::path(
    delete,
    path = "/api/v1/payees/{account_no}",
    params(
        ("account_no" = String, Path, description = "Payee account number")
    ),
    responses(
        (status = 200, description = "Payee deleted", body = Payee),
        (status = 404, description = "No such payee for the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Payees"
)]
pub async fn delete_payee(
    State(state): State<Arc<AppState>>,
    Extension(customer): Extension<AuthenticatedCustomer>,
    Path(account_no): Path<String>,
) -> ApiResult<Payee> {
    let account_no = parse_account_no(&account_no, "account_no")?;
    ok(state
        .payees
        .remove(customer.customer_id, &account_no)
        .await?)
}

/// Look up the holder name of an account before saving it
///
/// POST /api/v1/payees/name
#[utoipa::path(
    post,
    path = "/api/v1/payees/name",
    request_body = PayeeNameRequest,
    responses(
        (status = 200, description = "Account holder name", body = PayeeNameResponse),
        (status = 400, description = "Invalid parameters or IFSC mismatch"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payees"
)]
pub async fn payee_name(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<PayeeNameRequest>,
) -> ApiResult<PayeeNameResponse> {
    let account_no = parse_account_no(&req.payee_acc_no, "payeeAccNo")?;
    let customer_name = state
        .payees
        .account_holder_name(&account_no, &req.payee_ifsc)
        .await?;
    ok(PayeeNameResponse { customer_name })
}
