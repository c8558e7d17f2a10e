//! Environment-driven configuration for the demo binary.
//!
//! This is deliberately outside the core: [`crate::tree::Tree`] and the `store`
//! backends never read the environment. Only `src/bin/demo.rs` consults
//! [`IndexConfig`], the way the teacher's `ZVaultConfig` is consulted by
//! `main.rs` but never by the library modules it configures.
//!
//! # Environment variables
//!
//! - `MERKLE_INDEX_BACKEND` - `"memory"` or `"sqlite"` (default: `"memory"`)
//! - `MERKLE_INDEX_DB_PATH` - path to the SQLite file (required when backend is
//!   `"sqlite"`)
//! - `MERKLE_INDEX_LOG_LEVEL` - `trace`/`debug`/`info`/`warn`/`error` (default:
//!   `"info"`)
//! - `MERKLE_INDEX_JSON_LOGS` - `"1"` to force JSON log output

use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Which store backend the demo binary should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            other => Err(ConfigError::InvalidValue(
                "MERKLE_INDEX_BACKEND".to_string(),
                format!("unknown backend: {other}"),
            )),
        }
    }
}

/// Demo binary configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub backend: Backend,
    pub db_path: Option<String>,
    pub log_level: String,
    pub json_logs: bool,
}

impl IndexConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend: Backend = env::var("MERKLE_INDEX_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let db_path = match env::var("MERKLE_INDEX_DB_PATH") {
            Ok(path) => Some(path),
            Err(_) if backend == Backend::Sqlite => {
                return Err(ConfigError::MissingEnvVar("MERKLE_INDEX_DB_PATH".to_string()))
            }
            Err(_) => None,
        };

        let log_level = env::var("MERKLE_INDEX_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let json_logs = env::var("MERKLE_INDEX_JSON_LOGS")
            .map(|v| v == "1")
            .unwrap_or(false);

        Ok(Self {
            backend,
            db_path,
            log_level,
            json_logs,
        })
    }
}
