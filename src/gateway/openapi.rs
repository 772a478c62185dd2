//! OpenAPI / Swagger UI Documentation
//!
//! This module provides auto-generated OpenAPI 3.0 documentation for the bankcore API.
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{Account, AccountType};
use crate::core_types::AccountNumber;
use crate::customer::{AuthResponse, Customer, LoginRequest, RegisterRequest};
use crate::gateway::handlers::health::HealthResponse;
use crate::gateway::handlers::payee::PayeeNameResponse;
use crate::gateway::types::{
    AddPayeeRequest, CreateTransactionRequest, EditPayeeRequest, OpenAccountRequest,
    OwnershipCheck, PayeeNameRequest, TransferOwnRequest,
};
use crate::ledger::{LedgerEntry, TransactionType};
use crate::payee::{Payee, PayeeType};
use crate::transfer::{AccountBalance, TransferResult};

/// JWT bearer authentication security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "bankcore API",
        version = "1.0.0",
        description = "Customer accounts, payees, own-account funds transfer \
                       and an append-only transaction ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::auth::register,
        crate::gateway::handlers::auth::login,
        crate::gateway::handlers::account::open_account,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::deactivate_account,
        crate::gateway::handlers::transfer::transfer_own,
        crate::gateway::handlers::payee::add_payee,
        crate::gateway::handlers::payee::list_payees,
        crate::gateway::handlers::payee::edit_payee,
        crate::gateway::handlers::payee::delete_payee,
        crate::gateway::handlers::payee::payee_name,
        crate::gateway::handlers::transaction::create_transaction,
        crate::gateway::handlers::transaction::list_transactions,
        crate::gateway::handlers::transaction::get_transaction,
        crate::gateway::handlers::transaction::list_by_sender,
        crate::gateway::handlers::transaction::list_by_receiver,
    ),
    components(
        schemas(
            HealthResponse,
            AccountNumber,
            Account,
            AccountType,
            Customer,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            OpenAccountRequest,
            TransferOwnRequest,
            TransferResult,
            AccountBalance,
            CreateTransactionRequest,
            OwnershipCheck,
            LedgerEntry,
            TransactionType,
            Payee,
            PayeeType,
            AddPayeeRequest,
            EditPayeeRequest,
            PayeeNameRequest,
            PayeeNameResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Customer registration and login"),
        (name = "Accounts", description = "Open, query and deactivate accounts (auth required)"),
        (name = "Transfer", description = "Own-account funds transfer (auth required)"),
        (name = "Transactions", description = "Ledger entries (auth required)"),
        (name = "Payees", description = "Saved payee accounts (auth required)"),
        (name = "System", description = "Health checks and system info")
    )
)]
pub struct ApiDoc;
