//! LinkLens Cleaning Engine
//!
//! Extracts URLs from free text and strips tracking parameters according to
//! four prioritized rule tiers. Everything the rules do not name is left
//! byte-for-byte untouched.

mod extract;
mod report;
mod sanitizer;
mod store;

pub use extract::extract_urls;
pub use report::{CleanResult, RemovedParam};
pub use sanitizer::{clean_with_snapshot, UrlSanitizer};
pub use store::{builtin_document, RuleSnapshot, RuleSources, RuleStore};
