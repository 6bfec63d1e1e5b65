//! LinkLens Rule Management
//!
//! The rule-set exchange format, the merge/import logic that reconciles
//! built-in and user rule collections, and the editable user rule list
//! backed by a single JSON file.

mod document;
mod error;
mod manager;
mod merge;
mod model;
mod selection;

pub use document::{parse_document, parse_rule_list, serialize_rule_list, ParsedRules};
pub use error::{DocumentError, RuleError};
pub use manager::UserRuleManager;
pub use merge::{import_rules, merge_builtin_and_user};
pub use model::{RuleEntry, RuleKind, UserRule};
pub use selection::{SelectionMode, SelectionState};

pub type Result<T> = std::result::Result<T, RuleError>;
