//! Top-level error aggregation.
//!
//! Mirrors the teacher's `ZVaultError`: each subsystem owns its own error enum,
//! and this one just wires them together with `#[from]` so callers outside the
//! crate can match on a single type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::store::StoreError;
use crate::tree::TreeError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
}

impl IndexError {
    /// A short, stable identifier for the error variant, suitable for metrics
    /// labels or API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            IndexError::Store(_) => "store_error",
            IndexError::Tree(_) => "tree_error",
            IndexError::Config(_) => "config_error",
            IndexError::Logging(_) => "logging_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_matches_variant() {
        let err: IndexError = ConfigError::MissingEnvVar("X".into()).into();
        assert_eq!(err.error_code(), "config_error");
    }
}
