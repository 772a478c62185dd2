//! Transaction ledger
//!
//! Immutable entries referencing a sender and a receiver account.

pub mod models;
pub mod service;

pub use models::{LedgerEntry, NewLedgerEntry, TransactionType};
pub use service::LedgerService;
