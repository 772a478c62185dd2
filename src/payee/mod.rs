//! Payee management
//!
//! Customers keep a book of target accounts they pay. Each entry is bound
//! to an existing account number and branch code.

pub mod models;
pub mod service;

pub use models::{NewPayee, Payee, PayeeType, PayeeUpdate};
pub use service::{AddPayee, PayeeService};
