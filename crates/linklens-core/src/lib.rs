//! LinkLens Core
//!
//! Wires the cleaning engine, the user rule list and the stats store into
//! one service. Frontends (CLI, share sheet, clipboard glue) stay thin and
//! stateless; all state flows through here.

mod config;
mod error;
mod service;

pub use config::Config;
pub use error::CoreError;
pub use service::{ExportView, LinkLens, TextCleanOutcome};

// Re-export core components
pub use linklens_engine::{
    extract_urls, CleanResult, RemovedParam, RuleSnapshot, RuleStore, UrlSanitizer,
};
pub use linklens_rules::{RuleEntry, RuleError, RuleKind, SelectionState, UserRule};
pub use linklens_storage::{StatsSnapshot, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
