//! bankcore - HTTP banking backend
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ Gateway  │───▶│   Services   │───▶│  Store   │
//! │  (YAML)  │    │  (axum)  │    │ (Transfer..) │    │ (PG/Mem) │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Usage: `bankcore [--env|-e <name>] [--port <n>]`

use std::sync::Arc;

use anyhow::Context;

use bankcore::account::AccountNumberAllocator;
use bankcore::config::{AppConfig, StorageBackend};
use bankcore::db::Database;
use bankcore::gateway::{self, state::AppState};
use bankcore::store::{BankStore, MemoryStore, PostgresStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn BankStore>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let url = config
                .storage
                .postgres_url
                .as_deref()
                .context("postgres_url is not configured")?;
            let db = Database::connect(url, config.storage.max_connections)
                .await
                .context("failed to connect to PostgreSQL")?;
            db.migrate().await.context("failed to apply migrations")?;
            Ok(Arc::new(PostgresStore::new(&db)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store, nothing will be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = bankcore::logging::init_logging(&app_config);

    tracing::info!(env = %env, version = env!("GIT_HASH"), "Starting bankcore");

    let store = open_store(&app_config).await?;
    let allocator = AccountNumberAllocator::new(
        app_config.allocator.width,
        app_config.allocator.collision_check_interval,
    )?;

    let state = Arc::new(AppState::from_store(
        store,
        allocator,
        &app_config.default_ifsc,
        app_config.auth.jwt_secret.clone(),
        app_config.auth.token_ttl_hours,
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    gateway::run_server(&app_config.gateway.host, port, state).await
}
