//! Structured logging for the index.
//!
//! `tracing` + `tracing-subscriber` drive output; most call sites use the plain
//! target-scoped macros (`tracing::debug!(target: "merkle_index::tree", ...)`, see
//! `tree.rs`). The heavier [`IndexEvent`] wrapper here is reserved for
//! structurally significant occurrences — a leaf insertion, a root publication,
//! a proof generation, a storage migration, subsystem startup — one helper per
//! [`EventCategory`], the way the teacher's `LogEvent` is reserved for
//! deposit/withdrawal state transitions rather than every `tracing::debug!`
//! call site.

use serde::Serialize;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Minimum log level to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Event categories for structured logging.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// A leaf was inserted and its ancestor path recomputed.
    Insert,
    /// A root was published (an epoch was consumed).
    Publish,
    /// A proof was generated or verified.
    Proof,
    /// Store-level occurrences (migrations, connection setup).
    Storage,
    /// Startup/shutdown.
    System,
}

/// A structured log event, serialized to JSON for log aggregation.
#[derive(Debug, Serialize)]
pub struct IndexEvent {
    pub timestamp: String,
    pub level: String,
    pub category: EventCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl IndexEvent {
    pub fn new(level: LogLevel, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level: format!("{:?}", level).to_uppercase(),
            category,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| format!("{{\"error\":\"failed to serialize log\",\"message\":\"{}\"}}", self.message))
    }
}

/// Log a root publication: the one occurrence in this crate significant enough to
/// warrant the structured-event wrapper rather than a bare `tracing::debug!`.
pub fn log_publish_event(epoch: u64, root_hex: &str) {
    let event = IndexEvent::new(LogLevel::Info, EventCategory::Publish, "root published")
        .with_data(serde_json::json!({ "epoch": epoch, "root": root_hex }));

    tracing::info!(target: "merkle_index::epoch", "{}", event.to_json());
}

/// Log a leaf insertion (the 257-write ancestor recompute), keyed by its index.
pub fn log_insert_event(index_hex: &str) {
    let event = IndexEvent::new(LogLevel::Info, EventCategory::Insert, "leaf inserted")
        .with_data(serde_json::json!({ "index": index_hex }));

    tracing::info!(target: "merkle_index::epoch", "{}", event.to_json());
}

/// Log a proof generation against a given root.
pub fn log_proof_event(index_hex: &str, root_hex: &str) {
    let event = IndexEvent::new(LogLevel::Info, EventCategory::Proof, "proof generated")
        .with_data(serde_json::json!({ "index": index_hex, "root": root_hex }));

    tracing::info!(target: "merkle_index::epoch", "{}", event.to_json());
}

/// Log a storage-level occurrence (migrations, connection setup).
pub fn log_storage_event(message: &str) {
    let event = IndexEvent::new(LogLevel::Info, EventCategory::Storage, message);
    tracing::info!(target: "merkle_index::epoch", "{}", event.to_json());
}

/// Log a system-level occurrence (startup/shutdown).
pub fn log_system_event(message: &str) {
    let event = IndexEvent::new(LogLevel::Info, EventCategory::System, message);
    tracing::info!(target: "merkle_index::epoch", "{}", event.to_json());
}

/// Errors initializing the logging subsystem.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    InitFailed(String),
}

/// Initialize the global `tracing` subscriber.
///
/// `json_format` selects JSON output (log aggregation) over pretty-printed output
/// (local development).
pub fn init_logging(level: LogLevel, json_format: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("merkle_index={}", format!("{:?}", level).to_lowercase()))
    });

    if json_format {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE),
        );
        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    } else {
        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE),
        );
        subscriber
            .try_init()
            .map_err(|e| LoggingError::InitFailed(e.to_string()))?;
    }

    log_system_event("logging initialized");
    Ok(())
}

/// Initialize logging from an [`IndexConfig`](crate::config::IndexConfig).
pub fn init_from_config(config: &crate::config::IndexConfig) -> Result<(), LoggingError> {
    init_logging(LogLevel::from(config.log_level.as_str()), config.json_logs)
}
