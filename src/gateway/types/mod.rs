//! Gateway types module
//!
//! Type-safe types for the API boundary:
//!
//! ## Input Types
//! - [`StrictDecimal`]: Format-validated decimal for API input
//! - [`ValidatedJson`]: Axum extractor that deserializes and runs `validator` rules
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error side of every handler, rendered as an `ApiResponse`
//!
//! ## Submodules
//! - [`money`]: StrictDecimal
//! - [`request`]: request bodies and the validating extractor
//! - [`response`]: response wrapper and error codes

pub mod money;
pub mod request;
pub mod response;

// Re-export commonly used types at module root
pub use money::StrictDecimal;
pub use request::{
    AddPayeeRequest, CreateTransactionRequest, EditPayeeRequest, ListAccountsQuery,
    ListTransactionsQuery, OpenAccountRequest, OwnershipCheck, PayeeNameRequest,
    TransferOwnRequest, ValidatedJson, parse_account_no,
};
pub use response::{ApiError, ApiResponse, ApiResult, created, error_codes, ok};
