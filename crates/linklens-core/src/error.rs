//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Rule error: {0}")]
    Rule(#[from] linklens_rules::RuleError),

    #[error("Storage error: {0}")]
    Storage(#[from] linklens_storage::StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
