//! Account management module
//!
//! Account rows, number allocation and the account lifecycle service.

pub mod allocator;
pub mod models;
pub mod service;

// Re-export commonly used types
pub use allocator::AccountNumberAllocator;
pub use models::{Account, AccountType, NewAccount};
pub use service::{AccountService, OpenAccount};
