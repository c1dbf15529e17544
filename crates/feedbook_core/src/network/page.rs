//! Title/description extraction from fetched HTML.
//!
//! # Invariants
//! - Extracted values are single-line, whitespace-collapsed and truncated to
//!   the entry field limits, so they always pass entry validation when
//!   non-empty.

use crate::model::entry::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static META_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*name\s*=\s*["'](?:og:)?description["'][^>]*content\s*=\s*["']([^"']*)["']"#)
        .expect("valid meta description regex")
});
static META_DESCRIPTION_REVERSED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<meta\s[^>]*content\s*=\s*["']([^"']*)["'][^>]*name\s*=\s*["'](?:og:)?description["']"#)
        .expect("valid reversed meta description regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Human-facing metadata found in an HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Extracts `<title>` and the description meta tag from raw page bytes.
pub fn extract_page_metadata(content: &[u8]) -> PageMetadata {
    let html = String::from_utf8_lossy(content);

    let title = TITLE_RE
        .captures(&html)
        .and_then(|caps| caps.get(1))
        .and_then(|value| clean_text(value.as_str(), TITLE_MAX_CHARS));

    let description = META_DESCRIPTION_RE
        .captures(&html)
        .or_else(|| META_DESCRIPTION_REVERSED_RE.captures(&html))
        .and_then(|caps| caps.get(1))
        .and_then(|value| clean_text(value.as_str(), DESCRIPTION_MAX_CHARS));

    PageMetadata { title, description }
}

/// Decodes common entities, collapses whitespace and truncates to
/// `max_chars`; `None` when nothing printable is left.
pub(crate) fn clean_text(raw: &str, max_chars: usize) -> Option<String> {
    let decoded = decode_entities(raw);
    let collapsed = WHITESPACE_RE.replace_all(&decoded, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_chars).collect::<String>().trim_end().to_string())
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
