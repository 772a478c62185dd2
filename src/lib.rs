//! bankcore - customer accounts and funds transfer
//!
//! Opens accounts under unique account numbers, moves money between them
//! atomically and keeps an append-only ledger of every movement.
//!
//! # Modules
//!
//! - [`core_types`] - Identifiers (AccountNumber, CustomerId, TransactionId)
//! - [`error`] - BankError taxonomy
//! - [`store`] - Store traits with PostgreSQL and in-memory backends
//! - [`account`] - Accounts, number allocator, account service
//! - [`ledger`] - Ledger entries and queries
//! - [`transfer`] - Transfer engine
//! - [`customer`] - Registration, login, JWT middleware
//! - [`payee`] - Saved payees
//! - [`gateway`] - HTTP API

// Core types - must be first!
pub mod core_types;
pub mod error;

// Infrastructure
pub mod config;
pub mod db;
pub mod logging;
pub mod store;

// Domain
pub mod account;
pub mod customer;
pub mod ledger;
pub mod payee;
pub mod transfer;

// HTTP
pub mod gateway;

// Convenient re-exports at crate root
pub use core_types::{AccountNumber, CustomerId, PayeeId, TransactionId};
pub use error::BankError;
pub use store::{BankStore, MemoryStore, PostgresStore, StoreError};
pub use transfer::{OwnershipPolicy, TransferEngine, TransferRequest, TransferResult};
