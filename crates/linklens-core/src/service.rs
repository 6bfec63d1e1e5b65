//! Main LinkLens service
//!
//! Owns the rule store, the user rule list and the stats store. Cleaning
//! paths only read the published rule snapshot; rule mutations go through
//! the manager mutex, persist, and then trigger one snapshot reload.

use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use linklens_engine::{builtin_document, CleanResult, RuleSources, RuleStore, UrlSanitizer};
use linklens_rules::{parse_rule_list, serialize_rule_list, RuleKind, UserRule, UserRuleManager};
use linklens_storage::{Database, StatsSnapshot, StatsStore};

use crate::config::Config;
use crate::Result;

/// Which rule collection an export serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportView {
    /// Built-in rules only
    Builtin,
    /// User rules only
    User,
    /// Built-in and user combined, user entries winning on shared keys
    Merged,
}

/// Result of cleaning a whole block of shared text.
#[derive(Debug, Clone)]
pub struct TextCleanOutcome {
    /// Input text with every changed URL replaced by its cleaned form
    pub text: String,
    /// One report per extracted URL, first-occurrence order
    pub reports: Vec<CleanResult>,
}

impl TextCleanOutcome {
    /// Number of URLs that actually changed.
    pub fn changed_links(&self) -> usize {
        self.reports.iter().filter(|r| r.has_changes()).count()
    }

    /// Total parameters stripped across all URLs.
    pub fn removed_params(&self) -> usize {
        self.reports.iter().map(|r| r.removed_params.len()).sum()
    }
}

pub struct LinkLens {
    config: Config,
    store: Arc<RuleStore>,
    sanitizer: UrlSanitizer,
    rules: Mutex<UserRuleManager>,
    stats: StatsStore,
}

impl LinkLens {
    /// Initialize the service, creating the data directory on first run.
    pub fn open(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let store = Arc::new(RuleStore::new(RuleSources {
            language_tag: config.language_tag.clone(),
            user_rules_path: config.user_rules_path(),
        }));
        let sanitizer = UrlSanitizer::new(Arc::clone(&store));
        let rules = Mutex::new(UserRuleManager::load(config.user_rules_path()));
        let stats = StatsStore::new(Database::open(config.database_path())?);

        tracing::info!(data_dir = %config.data_dir.display(), language = %config.language_tag, "LinkLens initialized");

        Ok(Self {
            config,
            store,
            sanitizer,
            rules,
            stats,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- Cleaning ---

    /// Clean every URL in `text`, record statistics, and return the
    /// rewritten text plus per-URL reports.
    pub fn clean_text(&self, text: &str) -> Result<TextCleanOutcome> {
        let (replaced, reports) = self.sanitizer.replace_all_in_text(text);
        let outcome = TextCleanOutcome {
            text: replaced,
            reports,
        };

        let links = outcome.changed_links() as i64;
        let params = outcome.removed_params() as i64;
        if links > 0 {
            self.stats.record(links, params)?;
        }

        Ok(outcome)
    }

    /// Clean the first URL found in `text`. `Ok(None)` means no URL was
    /// found: nothing to do, not a failure.
    pub fn clean_first(&self, text: &str) -> Result<Option<CleanResult>> {
        let Some(report) = self.sanitizer.clean_first(text) else {
            return Ok(None);
        };

        if report.has_changes() {
            self.stats.record(1, report.removed_params.len() as i64)?;
        }

        Ok(Some(report))
    }

    /// Clean a single already-extracted URL. Does not touch statistics.
    pub fn clean_url(&self, url: &str) -> CleanResult {
        self.sanitizer.clean(url)
    }

    // --- User rules ---

    pub fn user_rules(&self) -> Vec<UserRule> {
        self.rules.lock().rules().to_vec()
    }

    pub fn add_rule(&self, key: &str, label: &str, danger: bool, kind: RuleKind) -> Result<UserRule> {
        let rule = self.rules.lock().add(key, label, danger, kind)?;
        self.store.reload();
        Ok(rule)
    }

    pub fn edit_rule(
        &self,
        id: Uuid,
        key: &str,
        label: &str,
        danger: bool,
        kind: RuleKind,
    ) -> Result<()> {
        self.rules.lock().edit(id, key, label, danger, kind)?;
        self.store.reload();
        Ok(())
    }

    pub fn delete_rule(&self, id: Uuid) -> Result<()> {
        self.rules.lock().delete(id)?;
        self.store.reload();
        Ok(())
    }

    pub fn delete_rules(&self, ids: &[Uuid]) -> Result<usize> {
        let removed = self.rules.lock().delete_many(ids)?;
        if removed > 0 {
            self.store.reload();
        }
        Ok(removed)
    }

    /// Import an external rule document; existing entries win. Returns the
    /// number of newly appended rules.
    pub fn import_rules(&self, document_text: &str) -> Result<usize> {
        let imported = self.rules.lock().import_document(document_text)?;
        if imported > 0 {
            self.store.reload();
        }
        Ok(imported)
    }

    /// Serialize one of the three export views of the rule collections.
    pub fn export_rules(&self, view: ExportView) -> Result<String> {
        let builtin = || -> Result<Vec<UserRule>> {
            let text = builtin_document(&self.config.language_tag);
            Ok(parse_rule_list(text).map_err(linklens_rules::RuleError::Document)?)
        };

        let text = match view {
            ExportView::Builtin => serialize_rule_list(&builtin()?),
            ExportView::User => self.rules.lock().export_user(),
            ExportView::Merged => self.rules.lock().export_merged(&builtin()?),
        };
        Ok(text)
    }

    // --- Statistics ---

    pub fn stats(&self) -> Result<StatsSnapshot> {
        Ok(self.stats.totals()?)
    }

    pub fn reset_stats(&self) -> Result<()> {
        Ok(self.stats.reset()?)
    }
}
