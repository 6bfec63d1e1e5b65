//! Merge and import logic for rule collections
//!
//! Two reconciliation directions with opposite precedence:
//! export-merge lets user entries override built-in entries, while import
//! never overwrites what the user already has.

use std::collections::{HashMap, HashSet};

use crate::model::{RuleKind, UserRule};

/// Combine built-in and user rules into one document-shaped list.
///
/// Per kind, entries are combined by canonical key; a user entry replaces a
/// built-in entry sharing a key. Built-in-only and user-only keys both
/// survive. Built-in order comes first, user-only keys append after.
pub fn merge_builtin_and_user(builtin: &[UserRule], user: &[UserRule]) -> Vec<UserRule> {
    let mut merged: Vec<UserRule> = Vec::with_capacity(builtin.len() + user.len());
    let mut index: HashMap<(String, RuleKind), usize> = HashMap::new();

    for rule in builtin.iter().chain(user) {
        let slot = (rule.canonical_key(), rule.kind);
        match index.get(&slot) {
            Some(&at) => merged[at] = rule.clone(),
            None => {
                index.insert(slot, merged.len());
                merged.push(rule.clone());
            }
        }
    }

    merged
}

/// Append incoming rules that do not collide with existing ones.
///
/// An incoming entry whose (canonical key, kind) already exists is skipped;
/// the existing entry stays untouched. Returns how many entries were
/// actually appended.
pub fn import_rules(existing: &mut Vec<UserRule>, incoming: &[UserRule]) -> usize {
    let mut present: HashSet<(String, RuleKind)> = existing
        .iter()
        .map(|r| (r.canonical_key(), r.kind))
        .collect();

    let mut imported = 0;
    for rule in incoming {
        let slot = (rule.canonical_key(), rule.kind);
        if present.contains(&slot) {
            continue;
        }
        present.insert(slot);
        existing.push(rule.clone());
        imported += 1;
    }

    imported
}
