//! URL extraction from free text
//!
//! Shared text in chat apps routinely glues a URL straight onto CJK prose
//! ("点击 https://... 查看"), so the match is cut at CJK ideographs,
//! fullwidth punctuation and Chinese quote/bracket marks as well as
//! whitespace. Rule matching is a separate concern; extraction only finds
//! candidates.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

// Boundary set: whitespace, CJK punctuation (U+3000-303F), fullwidth forms
// (U+FF00-FFEF), CJK ideographs (U+4E00-9FFF, U+3400-4DBF), curly quotes,
// ellipsis, em dash, interpunct.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)https?://[^\s\x{3000}-\x{303F}\x{FF00}-\x{FFEF}\x{4E00}-\x{9FFF}\x{3400}-\x{4DBF}\x{2018}\x{2019}\x{201C}\x{201D}\x{2026}\x{2014}\x{00B7}]+",
    )
    .expect("URL extraction regex")
});

const TRIM_TAIL: &[char] = &[')', ']', '\'', '"', '>', ','];

// Heuristic floor against degenerate hits like "http://a".
const MIN_URL_CHARS: usize = 10;

/// Extract candidate URLs from arbitrary text, first-occurrence order,
/// deduplicated. Trailing closing punctuation is stripped from each match.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut urls = Vec::new();

    for m in URL_RE.find_iter(text) {
        let candidate = m.as_str().trim_end_matches(TRIM_TAIL);
        if candidate.chars().count() <= MIN_URL_CHARS {
            continue;
        }
        if seen.insert(candidate) {
            urls.push(candidate.to_string());
        }
    }

    urls
}
