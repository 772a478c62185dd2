//! HTTP handlers, one submodule per resource

pub mod account;
pub mod auth;
pub mod health;
pub mod payee;
pub mod transaction;
pub mod transfer;

pub use account::{deactivate_account, get_account, list_accounts, open_account};
pub use auth::{login, register};
pub use health::health_check;
pub use payee::{add_payee, delete_payee, edit_payee, list_payees, payee_name};
pub use transaction::{
    create_transaction, get_transaction, list_by_receiver, list_by_sender, list_transactions,
};
pub use transfer::transfer_own;
