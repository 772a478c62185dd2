pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use anyhow::Context;
use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{Next, from_fn, from_fn_with_state},
    response::Response,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::customer::jwt_auth_middleware;
use state::AppState;

/// One line per request: method, path, status, latency
async fn access_log(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
    if status >= 500 {
        tracing::error!(%method, %path, status, latency_ms, "HTTP request");
    } else {
        tracing::info!(%method, %path, status, latency_ms, "HTTP request");
    }
    response
}

/// Build the full application router
pub fn build_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login));

    // ==========================================================================
    // Private Routes - Protected by JWT
    // ==========================================================================
    let private_routes = Router::new()
        // Accounts
        .route(
            "/accounts",
            post(handlers::open_account).get(handlers::list_accounts),
        )
        .route("/accounts/transfer", post(handlers::transfer_own))
        .route("/accounts/{account_no}", get(handlers::get_account))
        .route(
            "/accounts/{account_no}/deactivate",
            post(handlers::deactivate_account),
        )
        // Payees
        .route(
            "/payees",
            post(handlers::add_payee).get(handlers::list_payees),
        )
        .route("/payees/name", post(handlers::payee_name))
        .route(
            "/payees/{account_no}",
            put(handlers::edit_payee).delete(handlers::delete_payee),
        )
        // Ledger
        .route(
            "/transactions",
            post(handlers::create_transaction).get(handlers::list_transactions),
        )
        .route("/transactions/{id}", get(handlers::get_transaction))
        .route(
            "/transactions/sender/{account_no}",
            get(handlers::list_by_sender),
        )
        .route(
            "/transactions/receiver/{account_no}",
            get(handlers::list_by_receiver),
        )
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .nest("/api/v1", public_routes.merge(private_routes))
        .with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
        .layer(from_fn(access_log))
}

/// Serve on an already bound listener (tests bind `127.0.0.1:0`)
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    axum::serve(listener, build_router(state)).await
}

/// Start HTTP Gateway server
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {} (port already in use?)", addr))?;

    tracing::info!(%addr, store = state.store.name(), "Gateway listening");
    tracing::info!("API Docs: http://{}/docs", addr);

    serve(listener, state).await.context("server error")
}
