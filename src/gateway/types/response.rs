//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError` / `ApiResult<T>`: handler error side
//! - `error_codes`: Standard error code constants

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::BankError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

// ============================================================================
// Handler Result
// ============================================================================

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 OK with data
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 Created with data
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

/// Error half of every handler, rendered as `ApiResponse<()>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            error_codes::INVALID_PARAMETER,
            msg,
        )
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }

    /// Shorthand for `Err(self)` in handler return position
    pub fn into_err<T>(self) -> Result<T, ApiError> {
        Err(self)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiResponse::<()>::error(self.code, self.msg)),
        )
            .into_response()
    }
}

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        use error_codes::*;

        let code = match &err {
            BankError::ValidationError(_) => INVALID_PARAMETER,
            BankError::InsufficientFunds => INSUFFICIENT_FUNDS,
            BankError::InvalidAmount => INVALID_AMOUNT,
            BankError::SameAccount => SAME_ACCOUNT,
            BankError::AccountInactive(_) => ACCOUNT_INACTIVE,
            BankError::DuplicateCustomer => DUPLICATE_CUSTOMER,
            BankError::Unauthorized => MISSING_AUTH,
            BankError::InvalidCredentials => AUTH_FAILED,
            BankError::OwnershipMismatch => FORBIDDEN,
            BankError::AccountNotFound(_) => ACCOUNT_NOT_FOUND,
            BankError::CustomerNotFound(_) => CUSTOMER_NOT_FOUND,
            BankError::TransactionNotFound(_) => TRANSACTION_NOT_FOUND,
            BankError::PayeeNotFound(_) => PAYEE_NOT_FOUND,
            BankError::DuplicatePayee(_) => DUPLICATE_PAYEE,
            BankError::TransferFailed(_) => TRANSFER_FAILED,
            BankError::AllocationExhausted => ALLOCATION_EXHAUSTED,
            BankError::Internal(_) => INTERNAL_ERROR,
        };
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the log
        let msg = match &err {
            BankError::Internal(_) => "internal error".to_string(),
            BankError::TransferFailed(_) => "transfer failed".to_string(),
            _ => err.to_string(),
        };
        if !err.is_rejection() {
            tracing::error!(error = %err, code = err.code(), "Request failed");
        }
        ApiError::new(status, code, msg)
    }
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_FUNDS: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const SAME_ACCOUNT: i32 = 1004;
    pub const ACCOUNT_INACTIVE: i32 = 1005;
    pub const DUPLICATE_CUSTOMER: i32 = 1006;
    pub const DUPLICATE_PAYEE: i32 = 1007;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;
    pub const FORBIDDEN: i32 = 2003;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;
    pub const CUSTOMER_NOT_FOUND: i32 = 4002;
    pub const TRANSACTION_NOT_FOUND: i32 = 4003;
    pub const PAYEE_NOT_FOUND: i32 = 4004;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const TRANSFER_FAILED: i32 = 5002;
    pub const ALLOCATION_EXHAUSTED: i32 = 5003;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::AccountNumber;

    #[test]
    fn test_success_response_shape() {
        let json = serde_json::to_value(ApiResponse::success("x")).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], "x");
    }

    #[test]
    fn test_error_response_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(1001, "bad")).unwrap();
        assert_eq!(json["code"], 1001);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_bank_error_mapping() {
        let e = ApiError::from(BankError::InsufficientFunds);
        assert_eq!(e.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(e.code, error_codes::INSUFFICIENT_FUNDS);

        let e = ApiError::from(BankError::OwnershipMismatch);
        assert_eq!(e.status, StatusCode::FORBIDDEN);
        assert_eq!(e.code, error_codes::FORBIDDEN);

        let e = ApiError::from(BankError::AccountNotFound(AccountNumber::new("42")));
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert!(e.msg.contains("42"));

        let e = ApiError::from(BankError::ValidationError("x".into()));
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_internal_details_hidden() {
        let e = ApiError::from(BankError::TransferFailed("connection reset".into()));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.code, error_codes::TRANSFER_FAILED);
        assert!(!e.msg.contains("connection reset"));
    }
}
