//! Rule data model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to a blacklisted parameter key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Human-readable description of what the parameter does. May be empty.
    pub label: String,
    /// Marks high-sensitivity parameters (device fingerprinting, ad tracking).
    pub danger: bool,
}

impl RuleEntry {
    pub fn new(label: impl Into<String>, danger: bool) -> Self {
        Self {
            label: label.into(),
            danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Parameter is stripped from URLs
    Blacklist,
    /// Parameter is always kept, overriding any blacklist
    Whitelist,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Blacklist => "blacklist",
            RuleKind::Whitelist => "whitelist",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "blacklist" => Ok(RuleKind::Blacklist),
            "whitelist" => Ok(RuleKind::Whitelist),
            _ => Err(format!("Unknown rule kind: {}", s)),
        }
    }
}

/// One editable rule in the user tier.
///
/// Carries a stable id so that bulk operations over a mutating list stay
/// correct regardless of list positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRule {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub danger: bool,
    pub kind: RuleKind,
}

impl UserRule {
    pub fn blacklist(key: impl Into<String>, label: impl Into<String>, danger: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            label: label.into(),
            danger,
            kind: RuleKind::Blacklist,
        }
    }

    /// Whitelist rules carry only a key.
    pub fn whitelist(key: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            label: String::new(),
            danger: false,
            kind: RuleKind::Whitelist,
        }
    }

    /// Lower-cased key used for all matching and deduplication.
    pub fn canonical_key(&self) -> String {
        self.key.to_lowercase()
    }
}
