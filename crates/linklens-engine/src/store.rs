//! Rule store: four-tier snapshots with atomic reload
//!
//! Readers share an immutable `Arc<RuleSnapshot>`; `reload` builds a
//! candidate off-lock and publishes it with a single swap, so a reader
//! never observes a mix of two load generations.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use linklens_rules::{parse_document, ParsedRules, RuleEntry};

const RULES_ZH: &str = include_str!("../assets/rules.zh.json");
const RULES_EN: &str = include_str!("../assets/rules.en.json");

/// Built-in rule document for a BCP-47 language tag. English gets the
/// English document; everything else falls back to the default (Chinese)
/// one.
pub fn builtin_document(language_tag: &str) -> &'static str {
    let primary = language_tag
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase();
    match primary.as_str() {
        "en" => RULES_EN,
        _ => RULES_ZH,
    }
}

/// Where the rule tiers are loaded from.
#[derive(Debug, Clone)]
pub struct RuleSources {
    /// Language tag selecting the built-in document
    pub language_tag: String,
    /// Single mutable user rules file
    pub user_rules_path: PathBuf,
}

/// Immutable, point-in-time materialization of all four tiers.
#[derive(Debug, Default)]
pub struct RuleSnapshot {
    pub user_blacklist: HashMap<String, RuleEntry>,
    pub user_whitelist: HashSet<String>,
    pub builtin_blacklist: HashMap<String, RuleEntry>,
    pub builtin_whitelist: HashSet<String>,
}

pub struct RuleStore {
    sources: RuleSources,
    /// Published snapshot; `None` until the first build
    snapshot: RwLock<Option<Arc<RuleSnapshot>>>,
    /// Serializes builders so concurrent first accesses build exactly once
    /// and concurrent reloads do not interleave
    build_lock: Mutex<()>,
}

impl RuleStore {
    pub fn new(sources: RuleSources) -> Self {
        Self {
            sources,
            snapshot: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// Current snapshot, building lazily on first access.
    pub fn snapshot(&self) -> Arc<RuleSnapshot> {
        if let Some(snap) = self.snapshot.read().as_ref() {
            return Arc::clone(snap);
        }

        let _guard = self.build_lock.lock();
        // Another thread may have built while we waited.
        if let Some(snap) = self.snapshot.read().as_ref() {
            return Arc::clone(snap);
        }

        let snap = Arc::new(self.build());
        *self.snapshot.write() = Some(Arc::clone(&snap));
        snap
    }

    /// Rebuild from the sources and swap the published snapshot.
    ///
    /// File I/O happens before the write lock is taken; the swap itself is
    /// a single pointer store. In-flight readers keep the generation they
    /// already hold.
    pub fn reload(&self) {
        let _guard = self.build_lock.lock();
        let snap = Arc::new(self.build());
        *self.snapshot.write() = Some(snap);
        tracing::debug!("Rule snapshot reloaded");
    }

    fn build(&self) -> RuleSnapshot {
        let builtin = self.load_builtin();
        let user = self.load_user();

        RuleSnapshot {
            user_blacklist: user.blacklist,
            user_whitelist: user.whitelist,
            builtin_blacklist: builtin.blacklist,
            builtin_whitelist: builtin.whitelist,
        }
    }

    fn load_builtin(&self) -> ParsedRules {
        let text = builtin_document(&self.sources.language_tag);
        match parse_document(text) {
            Ok(rules) => rules,
            Err(err) => {
                // Ship-time defect, not a caller problem: run with empty
                // built-in tiers.
                tracing::warn!(error = %err, "Malformed built-in rule document");
                ParsedRules::default()
            }
        }
    }

    fn load_user(&self) -> ParsedRules {
        let path = &self.sources.user_rules_path;
        match std::fs::read_to_string(path) {
            Ok(text) => match parse_document(&text) {
                Ok(rules) => rules,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Malformed user rules file, using empty user tiers");
                    ParsedRules::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No user rules file");
                ParsedRules::default()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to read user rules file, using empty user tiers");
                ParsedRules::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_at(dir: &std::path::Path, tag: &str) -> RuleStore {
        RuleStore::new(RuleSources {
            language_tag: tag.to_string(),
            user_rules_path: dir.join("user_rules.json"),
        })
    }

    #[test]
    fn test_builtin_document_selection() {
        assert_eq!(builtin_document("en"), RULES_EN);
        assert_eq!(builtin_document("en-US"), RULES_EN);
        assert_eq!(builtin_document("zh-CN"), RULES_ZH);
        // Unrecognized tags fall back to the default document.
        assert_eq!(builtin_document("fr"), RULES_ZH);
        assert_eq!(builtin_document(""), RULES_ZH);
    }

    #[test]
    fn test_builtin_assets_parse() {
        assert!(!parse_document(RULES_ZH).unwrap().is_empty());
        assert!(!parse_document(RULES_EN).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_with_absent_user_file() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path(), "en");

        let snap = store.snapshot();
        assert!(snap.user_blacklist.is_empty());
        assert!(snap.user_whitelist.is_empty());
        assert!(snap.builtin_blacklist.contains_key("utm_source"));
    }

    #[test]
    fn test_malformed_user_file_fails_open() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("user_rules.json"), "{broken").unwrap();
        let store = store_at(dir.path(), "en");

        let snap = store.snapshot();
        assert!(snap.user_blacklist.is_empty());
        assert!(!snap.builtin_blacklist.is_empty());
    }

    #[test]
    fn test_reload_swaps_generation() {
        let dir = tempdir().unwrap();
        let store = store_at(dir.path(), "en");

        let before = store.snapshot();
        assert!(before.user_blacklist.is_empty());

        std::fs::write(
            dir.path().join("user_rules.json"),
            r#"{"blacklist":[{"key":"trk","label":"tracker"}],"whitelist":["keep_me"]}"#,
        )
        .unwrap();
        store.reload();

        let after = store.snapshot();
        assert!(after.user_blacklist.contains_key("trk"));
        assert!(after.user_whitelist.contains("keep_me"));
        // The old generation is still internally consistent.
        assert!(before.user_blacklist.is_empty());
        assert!(before.user_whitelist.is_empty());
    }

    #[test]
    fn test_concurrent_first_access_builds_once() {
        let dir = tempdir().unwrap();
        let store = std::sync::Arc::new(store_at(dir.path(), "en"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || store.snapshot())
            })
            .collect();

        let snaps: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        // All threads observe the same published snapshot.
        for snap in &snaps[1..] {
            assert!(Arc::ptr_eq(&snaps[0], snap));
        }
    }
}
