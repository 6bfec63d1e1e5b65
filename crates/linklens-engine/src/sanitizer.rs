//! URL sanitization against a rule snapshot
//!
//! Splitting is plain string surgery on `://`, `#`, `?`, `&` and `=`
//! rather than a full URL parse: kept parameters must come out
//! byte-for-byte as they went in, and shared links are frequently not
//! RFC-clean to begin with.

use std::sync::Arc;

use crate::extract::extract_urls;
use crate::report::{CleanResult, RemovedParam};
use crate::store::{RuleSnapshot, RuleStore};

/// Clean one URL against a fixed snapshot. Pure and deterministic.
///
/// Tier precedence per parameter, first match wins: user whitelist, user
/// blacklist, built-in whitelist, built-in blacklist, default keep.
pub fn clean_with_snapshot(snapshot: &RuleSnapshot, raw_url: &str) -> CleanResult {
    let (scheme, rest) = split_scheme(raw_url);

    let (before_hash, fragment) = match rest.find('#') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let Some(query_idx) = before_hash.find('?') else {
        return CleanResult::unchanged(raw_url);
    };
    let base = &before_hash[..query_idx];
    let query = &before_hash[query_idx + 1..];

    let mut removed = Vec::new();
    let mut kept: Vec<&str> = Vec::new();

    for pair in query.split('&') {
        if pair.trim().is_empty() {
            continue;
        }
        let (key, value) = match pair.find('=') {
            Some(idx) => (&pair[..idx], &pair[idx + 1..]),
            None => (pair, ""),
        };
        let canonical = key.to_lowercase();

        if snapshot.user_whitelist.contains(&canonical) {
            kept.push(pair);
        } else if let Some(entry) = snapshot.user_blacklist.get(&canonical) {
            removed.push(RemovedParam {
                key: key.to_string(),
                value: value.to_string(),
                label: entry.label.clone(),
                danger: entry.danger,
            });
        } else if snapshot.builtin_whitelist.contains(&canonical) {
            kept.push(pair);
        } else if let Some(entry) = snapshot.builtin_blacklist.get(&canonical) {
            removed.push(RemovedParam {
                key: key.to_string(),
                value: value.to_string(),
                label: entry.label.clone(),
                danger: entry.danger,
            });
        } else {
            // No rule matched: preservation, never silent removal.
            kept.push(pair);
        }
    }

    // A pass that removed nothing leaves the URL exactly as it came in,
    // including an absent scheme and any empty `&&` runs.
    if removed.is_empty() {
        return CleanResult::unchanged(raw_url);
    }

    let cleaned_query = if kept.is_empty() {
        String::new()
    } else {
        format!("?{}", kept.join("&"))
    };

    CleanResult {
        original_url: raw_url.to_string(),
        cleaned_url: format!("{scheme}{base}{cleaned_query}{fragment}"),
        removed_params: removed,
    }
}

fn split_scheme(url: &str) -> (&str, &str) {
    match url.find("://") {
        Some(idx) => url.split_at(idx + 3),
        None => ("https://", url),
    }
}

/// Sanitizer bound to a rule store. Cheap to clone and safe to call from
/// many threads; each call reads whatever snapshot is currently published.
#[derive(Clone)]
pub struct UrlSanitizer {
    store: Arc<RuleStore>,
}

impl UrlSanitizer {
    pub fn new(store: Arc<RuleStore>) -> Self {
        Self { store }
    }

    /// Clean a single URL.
    pub fn clean(&self, raw_url: &str) -> CleanResult {
        clean_with_snapshot(&self.store.snapshot(), raw_url)
    }

    /// Extract the first URL in `text` and clean it. `None` means there was
    /// nothing to do, which is not an error.
    pub fn clean_first(&self, text: &str) -> Option<CleanResult> {
        let url = extract_urls(text).into_iter().next()?;
        Some(self.clean(&url))
    }

    /// Extract and clean every URL in `text`.
    pub fn clean_all(&self, text: &str) -> Vec<CleanResult> {
        let snapshot = self.store.snapshot();
        extract_urls(text)
            .iter()
            .map(|url| clean_with_snapshot(&snapshot, url))
            .collect()
    }

    /// Replace every URL in `text` with its cleaned form, leaving the
    /// surrounding text untouched. Returns the rewritten text and one
    /// report per extracted URL.
    pub fn replace_all_in_text(&self, text: &str) -> (String, Vec<CleanResult>) {
        let snapshot = self.store.snapshot();
        let mut result = text.to_string();
        let mut reports = Vec::new();

        for url in extract_urls(text) {
            let report = clean_with_snapshot(&snapshot, &url);
            if report.has_changes() {
                result = result.replace(&report.original_url, &report.cleaned_url);
            }
            reports.push(report);
        }

        (result, reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RuleSources;
    use linklens_rules::RuleEntry;
    use tempfile::tempdir;

    fn snapshot() -> RuleSnapshot {
        let mut snap = RuleSnapshot::default();
        snap.builtin_blacklist
            .insert("utm_source".into(), RuleEntry::new("UTM source channel", false));
        snap.builtin_blacklist
            .insert("fbclid".into(), RuleEntry::new("Facebook click id", true));
        snap.builtin_whitelist.insert("id".into());
        snap
    }

    #[test]
    fn test_no_query_passthrough() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a");
        assert_eq!(result.cleaned_url, "https://x.com/a");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_strips_blacklisted_param() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?utm_source=share&id=42");
        assert_eq!(result.cleaned_url, "https://x.com/a?id=42");
        assert_eq!(result.removed_params.len(), 1);
        assert_eq!(result.removed_params[0].key, "utm_source");
        assert_eq!(result.removed_params[0].value, "share");
        assert_eq!(result.removed_params[0].label, "UTM source channel");
    }

    #[test]
    fn test_key_match_is_case_insensitive_value_untouched() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?UTM_Source=X&q=A%20B");
        assert_eq!(result.cleaned_url, "https://x.com/a?q=A%20B");
        assert_eq!(result.removed_params[0].key, "UTM_Source");
        assert_eq!(result.removed_params[0].value, "X");
    }

    #[test]
    fn test_fragment_preserved() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?utm_source=x#frag");
        assert_eq!(result.cleaned_url, "https://x.com/a#frag");
        assert_eq!(result.removed_params[0].key, "utm_source");
        assert_eq!(result.removed_params[0].value, "x");
    }

    #[test]
    fn test_kept_order_and_bytes_preserved() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/?a=1&utm_source=x&b=2");
        assert_eq!(result.cleaned_url, "https://x.com/?a=1&b=2");
    }

    #[test]
    fn test_unknown_param_kept_by_default() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?foo=bar");
        assert_eq!(result.cleaned_url, "https://x.com/a?foo=bar");
        assert!(result.removed_params.is_empty());
    }

    #[test]
    fn test_user_whitelist_beats_builtin_blacklist() {
        let mut snap = snapshot();
        snap.user_whitelist.insert("utm_source".into());

        let result = clean_with_snapshot(&snap, "https://x.com/a?utm_source=keep");
        assert_eq!(result.cleaned_url, "https://x.com/a?utm_source=keep");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_user_blacklist_label_wins_over_builtin() {
        let mut snap = snapshot();
        snap.user_blacklist
            .insert("utm_source".into(), RuleEntry::new("mine", true));

        let result = clean_with_snapshot(&snap, "https://x.com/a?utm_source=x");
        assert_eq!(result.removed_params[0].label, "mine");
        assert!(result.removed_params[0].danger);
    }

    #[test]
    fn test_all_params_removed_drops_question_mark() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?utm_source=x&fbclid=y");
        assert_eq!(result.cleaned_url, "https://x.com/a");
        assert_eq!(result.removed_params.len(), 2);
        assert!(result.removed_params[1].danger);
    }

    #[test]
    fn test_blank_tokens_dropped_not_counted() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?&a=1&&utm_source=x&");
        assert_eq!(result.cleaned_url, "https://x.com/a?a=1");
        assert_eq!(result.removed_params.len(), 1);
    }

    #[test]
    fn test_valueless_param() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?fbclid&b");
        assert_eq!(result.cleaned_url, "https://x.com/a?b");
        assert_eq!(result.removed_params[0].value, "");
    }

    #[test]
    fn test_schemeless_unchanged_without_removals() {
        let result = clean_with_snapshot(&snapshot(), "x.com/a?foo=bar");
        assert_eq!(result.cleaned_url, "x.com/a?foo=bar");
        assert!(!result.has_changes());
    }

    #[test]
    fn test_schemeless_gains_scheme_when_cleaned() {
        let result = clean_with_snapshot(&snapshot(), "x.com/a?utm_source=x&b=2");
        assert_eq!(result.cleaned_url, "https://x.com/a?b=2");
    }

    #[test]
    fn test_idempotent() {
        let snap = snapshot();
        let first = clean_with_snapshot(&snap, "https://x.com/a?a=1&utm_source=x&fbclid=y#f");
        let second = clean_with_snapshot(&snap, &first.cleaned_url);
        assert_eq!(second.cleaned_url, first.cleaned_url);
        assert!(!second.has_changes());
    }

    #[test]
    fn test_fragment_params_not_processed() {
        let result = clean_with_snapshot(&snapshot(), "https://x.com/a?b=1#?utm_source=x");
        assert_eq!(result.cleaned_url, "https://x.com/a?b=1#?utm_source=x");
        assert!(!result.has_changes());
    }

    fn sanitizer_with_user_rules(user_json: &str) -> (tempfile::TempDir, UrlSanitizer) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("user_rules.json");
        std::fs::write(&path, user_json).unwrap();
        let store = Arc::new(RuleStore::new(RuleSources {
            language_tag: "en".into(),
            user_rules_path: path,
        }));
        (dir, UrlSanitizer::new(store))
    }

    #[test]
    fn test_clean_first_none_when_no_url() {
        let (_dir, sanitizer) = sanitizer_with_user_rules("{}");
        assert!(sanitizer.clean_first("nothing to see").is_none());
    }

    #[test]
    fn test_replace_all_in_text() {
        let (_dir, sanitizer) = sanitizer_with_user_rules(
            r#"{"blacklist":[{"key":"trk","label":"tracker","danger":false}]}"#,
        );

        let text = "first https://a.com/x?trk=1&p=2 then https://b.com/y?p=3 end";
        let (replaced, reports) = sanitizer.replace_all_in_text(text);

        assert_eq!(replaced, "first https://a.com/x?p=2 then https://b.com/y?p=3 end");
        assert_eq!(reports.len(), 2);
        assert!(reports[0].has_changes());
        assert!(!reports[1].has_changes());
    }
}
