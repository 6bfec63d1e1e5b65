//! Rule error types

use thiserror::Error;
use uuid::Uuid;

use crate::model::RuleKind;

/// A rule document that is present but not well-formed.
///
/// Distinct from an absent document: callers treat absence as an empty
/// rule set without logging, while a malformed document is reported.
#[derive(Error, Debug)]
#[error("Malformed rule document: {0}")]
pub struct DocumentError(#[from] serde_json::Error);

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Rule key cannot be empty")]
    EmptyKey,

    #[error("Rule already exists: {key} ({kind})")]
    DuplicateKey { key: String, kind: RuleKind },

    #[error("Rule not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
