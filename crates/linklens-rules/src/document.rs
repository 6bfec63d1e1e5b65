//! Rule document codec
//!
//! The exchange format shared by the built-in assets, the user rules file
//! and import/export:
//!
//! ```json
//! {
//!   "blacklist": [ { "key": "utm_source", "label": "...", "danger": false } ],
//!   "whitelist": [ "id", "q" ]
//! }
//! ```
//!
//! Both top-level arrays are optional; `label` defaults to empty and
//! `danger` to false. Keys are lower-cased exactly once, here at parse time.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::DocumentError;
use crate::model::{RuleEntry, RuleKind, UserRule};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    blacklist: Vec<RawBlacklistEntry>,
    #[serde(default)]
    whitelist: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawBlacklistEntry {
    key: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    danger: bool,
}

#[derive(Debug, Serialize)]
struct WireDocument<'a> {
    blacklist: Vec<WireBlacklistEntry<'a>>,
    whitelist: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct WireBlacklistEntry<'a> {
    key: &'a str,
    label: &'a str,
    danger: bool,
}

/// One parsed rule document: a blacklist keyed by canonical key plus a
/// whitelist of canonical keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRules {
    pub blacklist: HashMap<String, RuleEntry>,
    pub whitelist: HashSet<String>,
}

impl ParsedRules {
    pub fn is_empty(&self) -> bool {
        self.blacklist.is_empty() && self.whitelist.is_empty()
    }
}

/// Parse a rule document into lookup form for the sanitizer tiers.
///
/// Blank input is treated as an empty document. Malformed input is an
/// error; callers decide whether to fail open.
pub fn parse_document(text: &str) -> Result<ParsedRules, DocumentError> {
    if text.trim().is_empty() {
        return Ok(ParsedRules::default());
    }

    let raw: RawDocument = serde_json::from_str(text)?;

    let blacklist = raw
        .blacklist
        .into_iter()
        .map(|e| (e.key.to_lowercase(), RuleEntry::new(e.label, e.danger)))
        .collect();
    let whitelist = raw.whitelist.into_iter().map(|k| k.to_lowercase()).collect();

    Ok(ParsedRules {
        blacklist,
        whitelist,
    })
}

/// Parse a rule document into an editable rule list, blacklist entries
/// first, preserving document order. Keys keep their original casing here;
/// canonicalization happens at match and dedup time.
pub fn parse_rule_list(text: &str) -> Result<Vec<UserRule>, DocumentError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: RawDocument = serde_json::from_str(text)?;

    let mut rules = Vec::with_capacity(raw.blacklist.len() + raw.whitelist.len());
    for entry in raw.blacklist {
        rules.push(UserRule::blacklist(entry.key, entry.label, entry.danger));
    }
    for key in raw.whitelist {
        rules.push(UserRule::whitelist(key));
    }

    Ok(rules)
}

/// Serialize a rule list back to the exchange format, with stable field
/// names and array shapes. Blacklist order and whitelist order follow the
/// input list.
pub fn serialize_rule_list(rules: &[UserRule]) -> String {
    let blacklist = rules
        .iter()
        .filter(|r| r.kind == RuleKind::Blacklist)
        .map(|r| WireBlacklistEntry {
            key: &r.key,
            label: &r.label,
            danger: r.danger,
        })
        .collect();
    let whitelist = rules
        .iter()
        .filter(|r| r.kind == RuleKind::Whitelist)
        .map(|r| r.key.as_str())
        .collect();

    let doc = WireDocument {
        blacklist,
        whitelist,
    };

    // A struct of vectors of plain fields cannot fail to serialize.
    serde_json::to_string_pretty(&doc).expect("rule document serialization")
}
