//! Append-only log of accepted command strings.
//!
//! # Invariants
//! - Only input that parsed successfully is recorded, whether or not its
//!   execution succeeded.
//! - Entries are never removed or reordered.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandHistory {
    entries: Vec<String>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, raw: impl Into<String>) {
        self.entries.push(raw.into());
    }

    /// Recorded inputs from earliest to latest.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn most_recent_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
