//! Cleaning report types

use serde::Serialize;

/// One query parameter stripped from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedParam {
    /// Key as it appeared in the URL (original casing)
    pub key: String,
    /// Raw value, not URL-decoded
    pub value: String,
    /// Description from the matching rule tier, may be empty
    pub label: String,
    /// High-sensitivity marker from the matching rule tier
    pub danger: bool,
}

/// Per-URL cleaning report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanResult {
    pub original_url: String,
    pub cleaned_url: String,
    /// Stripped parameters in query-string order
    pub removed_params: Vec<RemovedParam>,
}

impl CleanResult {
    /// Construct a report for a URL the cleaner did not touch.
    pub fn unchanged(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            original_url: url.clone(),
            cleaned_url: url,
            removed_params: Vec::new(),
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.removed_params.is_empty()
    }
}
