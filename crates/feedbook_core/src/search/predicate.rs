//! Entry filtering for the displayed list.
//!
//! # Responsibility
//! - Describe `find` queries as plain comparable data.
//! - Evaluate them against entries without touching the store.
//!
//! # Invariants
//! - Matching is case-insensitive substring matching for text fields and
//!   exact membership for tags.
//! - All given criteria must hold (conjunction); an empty descriptor matches
//!   everything.

use crate::model::entry::{Entry, Tag};
use std::collections::BTreeSet;

/// Per-field search terms for one `find` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindDescriptor {
    /// Each must occur in the title or the description.
    pub keywords: Vec<String>,
    pub title: Vec<String>,
    pub description: Vec<String>,
    pub link: Vec<String>,
    pub tags: BTreeSet<Tag>,
}

impl FindDescriptor {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.title.is_empty()
            && self.description.is_empty()
            && self.link.is_empty()
            && self.tags.is_empty()
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        let title = entry.title.as_str().to_lowercase();
        let description = entry.description.as_str().to_lowercase();
        let link = entry.link.as_str().to_lowercase();

        self.keywords.iter().all(|keyword| {
            let keyword = keyword.to_lowercase();
            title.contains(&keyword) || description.contains(&keyword)
        }) && contains_all(&title, &self.title)
            && contains_all(&description, &self.description)
            && contains_all(&link, &self.link)
            && self.tags.iter().all(|tag| entry.tags.contains(tag))
    }
}

fn contains_all(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .all(|needle| haystack.contains(&needle.to_lowercase()))
}

/// Predicate applied to the contextual book to produce the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EntryPredicate {
    #[default]
    All,
    Matches(FindDescriptor),
}

impl EntryPredicate {
    pub fn test(&self, entry: &Entry) -> bool {
        match self {
            Self::All => true,
            Self::Matches(descriptor) => descriptor.matches(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryPredicate, FindDescriptor};
    use crate::model::entry::{parse_tags, Description, Entry, Link, Tag, Title};

    fn rust_entry() -> Entry {
        Entry::new(
            Title::parse("Rust 2024 edition released").unwrap(),
            Description::parse("Async closures land").unwrap(),
            Link::parse("https://blog.rust-lang.org/2025/02/20/Rust-1.85.0.html").unwrap(),
            parse_tags(["rust", "release"]).unwrap(),
        )
    }

    #[test]
    fn keywords_match_title_or_description_case_insensitively() {
        let descriptor = FindDescriptor {
            keywords: vec!["EDITION".to_string(), "closures".to_string()],
            ..FindDescriptor::default()
        };
        assert!(descriptor.matches(&rust_entry()));
    }

    #[test]
    fn all_fields_must_hold() {
        let descriptor = FindDescriptor {
            title: vec!["rust".to_string()],
            link: vec!["python.org".to_string()],
            ..FindDescriptor::default()
        };
        assert!(!descriptor.matches(&rust_entry()));
    }

    #[test]
    fn tags_require_membership() {
        let mut descriptor = FindDescriptor::default();
        descriptor.tags.insert(Tag::parse("Rust").unwrap());
        assert!(descriptor.matches(&rust_entry()));
        descriptor.tags.insert(Tag::parse("go").unwrap());
        assert!(!descriptor.matches(&rust_entry()));
    }

    #[test]
    fn all_predicate_accepts_everything() {
        assert!(EntryPredicate::All.test(&rust_entry()));
        assert!(EntryPredicate::default().test(&rust_entry()));
    }
}
