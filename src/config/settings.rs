//! Process settings read from the environment (optionally seeded from `.env`).

use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/pos_backoffice";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Transaction boundary of batch endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// Each item commits on its own; a failure leaves earlier items in place.
    #[default]
    PerItem,
    /// One transaction for the whole batch.
    Atomic,
}

impl std::str::FromStr for BatchMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per_item" | "per-item" => Ok(BatchMode::PerItem),
            "atomic" => Ok(BatchMode::Atomic),
            other => Err(ConfigError::Load(format!(
                "invalid BATCH_MODE: {} (expected per_item or atomic)",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// PostgreSQL schema holding the entity tables.
    pub schema: String,
    pub max_connections: u32,
    pub batch_mode: BatchMode,
    pub max_body_bytes: usize,
}

impl Settings {
    /// Read from the process environment. Call `dotenvy::dotenv()` first to honour `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |k: &str| vars.get(k).map(|v| v.trim()).filter(|v| !v.is_empty());

        let bind = get("BIND_ADDR").unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Load(format!("invalid BIND_ADDR '{}': {}", bind, e)))?;

        let schema = get("DB_SCHEMA").unwrap_or(DEFAULT_SCHEMA).to_string();
        if !crate::config::is_identifier(&schema) {
            return Err(ConfigError::InvalidIdentifier(schema));
        }

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .map_err(|_| ConfigError::Load(format!("invalid DB_MAX_CONNECTIONS: {}", v)))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| ConfigError::Load(format!("invalid MAX_BODY_BYTES: {}", v)))?,
            None => DEFAULT_MAX_BODY_BYTES,
        };
        let batch_mode = get("BATCH_MODE").map(str::parse::<BatchMode>).transpose()?.unwrap_or_default();

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or(DEFAULT_DATABASE_URL).to_string(),
            bind_addr,
            schema,
            max_connections,
            batch_mode,
            max_body_bytes,
        })
    }
}
