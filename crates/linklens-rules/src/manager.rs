//! User rule list management
//!
//! The editable rule list behind the user tier. Every successful mutation
//! rewrites the backing file in full; a failed write is reported to the
//! caller while the in-memory list keeps the applied change.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::document::{parse_rule_list, serialize_rule_list};
use crate::error::RuleError;
use crate::merge::{import_rules, merge_builtin_and_user};
use crate::model::{RuleKind, UserRule};
use crate::Result;

pub struct UserRuleManager {
    rules: Vec<UserRule>,
    path: PathBuf,
}

impl UserRuleManager {
    /// Load the user rule list from `path`.
    ///
    /// An absent file is the normal first-run state and yields an empty
    /// list silently; a malformed file also yields an empty list but is
    /// reported as a diagnostic.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let rules = match std::fs::read_to_string(&path) {
            Ok(text) => match parse_rule_list(&text) {
                Ok(rules) => rules,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Malformed user rules file, starting empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No user rules file yet");
                Vec::new()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read user rules file, starting empty");
                Vec::new()
            }
        };

        Self { rules, path }
    }

    pub fn rules(&self) -> &[UserRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&UserRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Add a new rule at the front of the list.
    pub fn add(
        &mut self,
        key: &str,
        label: &str,
        danger: bool,
        kind: RuleKind,
    ) -> Result<UserRule> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RuleError::EmptyKey);
        }
        self.check_duplicate(key, kind, None)?;

        let rule = match kind {
            RuleKind::Blacklist => UserRule::blacklist(key, label.trim(), danger),
            RuleKind::Whitelist => UserRule::whitelist(key),
        };
        self.rules.insert(0, rule.clone());
        self.save()?;

        tracing::info!(key = %rule.key, kind = %rule.kind, "Added user rule");
        Ok(rule)
    }

    /// Replace an existing rule in place, keeping its position and id.
    pub fn edit(
        &mut self,
        id: Uuid,
        key: &str,
        label: &str,
        danger: bool,
        kind: RuleKind,
    ) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RuleError::EmptyKey);
        }
        self.check_duplicate(key, kind, Some(id))?;

        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(RuleError::NotFound(id))?;

        rule.key = key.to_string();
        rule.kind = kind;
        match kind {
            RuleKind::Blacklist => {
                rule.label = label.trim().to_string();
                rule.danger = danger;
            }
            RuleKind::Whitelist => {
                rule.label.clear();
                rule.danger = false;
            }
        }

        self.save()
    }

    pub fn delete(&mut self, id: Uuid) -> Result<()> {
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        if self.rules.len() == before {
            return Err(RuleError::NotFound(id));
        }
        self.save()
    }

    /// Delete several rules by id in one pass. Ids that no longer exist are
    /// ignored. Returns how many rules were removed.
    pub fn delete_many(&mut self, ids: &[Uuid]) -> Result<usize> {
        let before = self.rules.len();
        self.rules.retain(|r| !ids.contains(&r.id));
        let removed = before - self.rules.len();
        if removed > 0 {
            self.save()?;
            tracing::info!(removed, "Deleted user rules");
        }
        Ok(removed)
    }

    /// Import an external rule document. Entries whose (canonical key, kind)
    /// already exists are skipped. Returns the number of appended rules.
    pub fn import_document(&mut self, text: &str) -> Result<usize> {
        let incoming = parse_rule_list(text).map_err(RuleError::Document)?;
        let imported = import_rules(&mut self.rules, &incoming);
        if imported > 0 {
            self.save()?;
            tracing::info!(imported, "Imported user rules");
        }
        Ok(imported)
    }

    /// Serialize the user tier alone.
    pub fn export_user(&self) -> String {
        serialize_rule_list(&self.rules)
    }

    /// Serialize built-in and user tiers combined, user entries winning on
    /// shared keys.
    pub fn export_merged(&self, builtin: &[UserRule]) -> String {
        serialize_rule_list(&merge_builtin_and_user(builtin, &self.rules))
    }

    fn check_duplicate(&self, key: &str, kind: RuleKind, exclude: Option<Uuid>) -> Result<()> {
        let canonical = key.to_lowercase();
        let clash = self.rules.iter().any(|r| {
            exclude != Some(r.id) && r.kind == kind && r.canonical_key() == canonical
        });
        if clash {
            return Err(RuleError::DuplicateKey {
                key: key.to_string(),
                kind,
            });
        }
        Ok(())
    }

    /// Rewrite the backing file in full. On failure the in-memory list is
    /// left as mutated and the error goes to the caller.
    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, self.export_user())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn manager() -> (tempfile::TempDir, UserRuleManager) {
        let dir = tempdir().unwrap();
        let mgr = UserRuleManager::load(dir.path().join("user_rules.json"));
        (dir, mgr)
    }

    #[test]
    fn test_load_absent_file_is_empty() {
        let (_dir, mgr) = manager();
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_rules.json");
        std::fs::write(&path, "{{{").unwrap();

        let mgr = UserRuleManager::load(&path);
        assert!(mgr.is_empty());
    }

    #[test]
    fn test_add_inserts_at_front_and_persists() {
        let (dir, mut mgr) = manager();
        mgr.add("utm_source", "UTM source channel", false, RuleKind::Blacklist)
            .unwrap();
        mgr.add("fbclid", "Facebook click id", true, RuleKind::Blacklist)
            .unwrap();

        assert_eq!(mgr.rules()[0].key, "fbclid");

        // A fresh manager sees the saved state.
        let reloaded = UserRuleManager::load(dir.path().join("user_rules.json"));
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.rules()[0].key, "fbclid");
    }

    #[test]
    fn test_add_rejects_duplicate_key_case_insensitive() {
        let (_dir, mut mgr) = manager();
        mgr.add("gclid", "", false, RuleKind::Blacklist).unwrap();

        let err = mgr.add("GCLID", "", false, RuleKind::Blacklist).unwrap_err();
        assert!(matches!(err, RuleError::DuplicateKey { .. }));
        assert_eq!(mgr.len(), 1);

        // Same key in the other kind is allowed.
        mgr.add("gclid", "", false, RuleKind::Whitelist).unwrap();
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn test_add_rejects_blank_key() {
        let (_dir, mut mgr) = manager();
        assert!(matches!(
            mgr.add("   ", "", false, RuleKind::Blacklist),
            Err(RuleError::EmptyKey)
        ));
    }

    #[test]
    fn test_edit_excludes_self_from_duplicate_check() {
        let (_dir, mut mgr) = manager();
        let rule = mgr
            .add("utm_medium", "UTM medium", false, RuleKind::Blacklist)
            .unwrap();

        // Re-saving the same key on the same rule is fine.
        mgr.edit(rule.id, "utm_medium", "UTM medium (ads)", true, RuleKind::Blacklist)
            .unwrap();
        assert_eq!(mgr.rules()[0].label, "UTM medium (ads)");
        assert!(mgr.rules()[0].danger);

        // But colliding with another rule is not.
        let other = mgr.add("yclid", "", false, RuleKind::Blacklist).unwrap();
        assert!(matches!(
            mgr.edit(other.id, "utm_medium", "", false, RuleKind::Blacklist),
            Err(RuleError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_edit_to_whitelist_clears_metadata() {
        let (_dir, mut mgr) = manager();
        let rule = mgr
            .add("ref", "Referrer", true, RuleKind::Blacklist)
            .unwrap();

        mgr.edit(rule.id, "ref", "ignored", true, RuleKind::Whitelist)
            .unwrap();
        let edited = mgr.get(rule.id).unwrap();
        assert_eq!(edited.label, "");
        assert!(!edited.danger);
    }

    #[test]
    fn test_delete_many_ignores_stale_ids() {
        let (_dir, mut mgr) = manager();
        let a = mgr.add("a_param", "", false, RuleKind::Blacklist).unwrap();
        let b = mgr.add("b_param", "", false, RuleKind::Blacklist).unwrap();

        let removed = mgr.delete_many(&[a.id, Uuid::new_v4()]).unwrap();
        assert_eq!(removed, 1);
        assert!(mgr.get(b.id).is_some());
        assert!(mgr.get(a.id).is_none());
    }

    #[test]
    fn test_import_document_counts_only_new() {
        let (_dir, mut mgr) = manager();
        mgr.add("fbclid", "mine", true, RuleKind::Blacklist).unwrap();

        let doc = r#"{
            "blacklist": [
                { "key": "fbclid", "label": "theirs", "danger": false },
                { "key": "mc_eid", "label": "Mailchimp id" }
            ],
            "whitelist": ["page"]
        }"#;

        let imported = mgr.import_document(doc).unwrap();
        assert_eq!(imported, 2);
        assert_eq!(mgr.len(), 3);
        // Import never overwrites what the user already has.
        assert_eq!(mgr.rules()[0].label, "mine");
    }

    #[test]
    fn test_export_merged_user_wins() {
        let (_dir, mut mgr) = manager();
        mgr.add("utm_source", "B", false, RuleKind::Blacklist).unwrap();

        let builtin = vec![UserRule::blacklist("utm_source", "A", false)];
        let text = mgr.export_merged(&builtin);

        let parsed = crate::document::parse_document(&text).unwrap();
        assert_eq!(parsed.blacklist["utm_source"].label, "B");
    }
}
