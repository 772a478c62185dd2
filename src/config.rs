use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::account::allocator::{DEFAULT_COLLISION_CHECK_INTERVAL, DEFAULT_WIDTH};

/// Narrowest account number a deployment may configure
pub const MIN_ACCOUNT_WIDTH: u32 = 6;
pub const MAX_ACCOUNT_WIDTH: u32 = 18;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub allocator: AllocatorConfig,
    pub auth: AuthConfig,
    /// Branch code for accounts opened without one
    pub default_ifsc: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// PostgreSQL connection URL (`DATABASE_URL` overrides)
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AllocatorConfig {
    pub width: u32,
    pub collision_check_interval: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            collision_check_interval: DEFAULT_COLLISION_CHECK_INTERVAL,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret (`BANK_JWT_SECRET` overrides)
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

fn default_token_ttl_hours() -> i64 {
    24
}

impl AppConfig {
    /// Read `config/<env>.yaml`, apply environment overrides and validate
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config yaml: {}", config_path))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// `DATABASE_URL` and `BANK_JWT_SECRET`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.storage.postgres_url = Some(url);
        }
        if let Some(secret) = lookup("BANK_JWT_SECRET").filter(|v| !v.is_empty()) {
            self.auth.jwt_secret = secret;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let width = self.allocator.width;
        if !(MIN_ACCOUNT_WIDTH..=MAX_ACCOUNT_WIDTH).contains(&width) {
            bail!(
                "allocator.width must be within {}..={}, got {}",
                MIN_ACCOUNT_WIDTH,
                MAX_ACCOUNT_WIDTH,
                width
            );
        }
        if self.allocator.collision_check_interval == 0 {
            bail!("allocator.collision_check_interval must be positive");
        }
        if self.storage.backend == StorageBackend::Postgres
            && self
                .storage
                .postgres_url
                .as_deref()
                .is_none_or(str::is_empty)
        {
            bail!("storage.backend is postgres but no postgres_url / DATABASE_URL is set");
        }
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("auth.jwt_secret is empty (set it or BANK_JWT_SECRET)");
        }
        if self.auth.token_ttl_hours <= 0 {
            bail!("auth.token_ttl_hours must be positive");
        }
        Ok(())
    }
}
