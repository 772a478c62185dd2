//! Funds transfer
//!
//! One engine for every balance-moving request. The own-account endpoint
//! and the generic transaction endpoint differ only in the
//! [`OwnershipPolicy`] they pass.

pub mod engine;
pub mod types;

pub use engine::TransferEngine;
pub use types::{
    AMOUNT_LIMIT, AccountBalance, MAX_AMOUNT_SCALE, OwnershipPolicy, TransferRequest,
    TransferResult, validate_amount,
};
