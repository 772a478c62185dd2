use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::core_types::CustomerId;
use crate::gateway::{
    state::AppState,
    types::{ApiError, error_codes},
};

/// Identity of the caller, injected into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedCustomer {
    pub customer_id: CustomerId,
}

pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            ApiError::unauthorized(error_codes::MISSING_AUTH, "Missing Authorization header")
        })?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid token format"))?;

    // 2. Verify token and resolve the customer
    let customer_id = state
        .customers
        .verify_token(token)
        .and_then(|claims| claims.customer_id())
        .map_err(|_| {
            ApiError::unauthorized(error_codes::AUTH_FAILED, "Invalid or expired token")
        })?;

    // 3. Inject identity
    request
        .extensions_mut()
        .insert(AuthenticatedCustomer { customer_id });
    Ok(next.run(request).await)
}
