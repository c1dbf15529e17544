//! Ordered, uniqueness-enforcing entry collection.
//!
//! # Responsibility
//! - Hold entries in display order.
//! - Reject inserts and edits that would break link uniqueness.
//!
//! # Invariants
//! - No two entries in one book satisfy `Entry::is_same_entry`.
//! - Failed operations leave the book unchanged.

use crate::model::entry::{Entry, Link};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Book-level failure for uniqueness and lookup contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryBookError {
    /// Another entry with the same link already exists.
    Duplicate(Link),
    /// No entry with this link exists.
    NotFound(Link),
}

impl Display for EntryBookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(link) => write!(f, "entry with link `{link}` already exists"),
            Self::NotFound(link) => write!(f, "entry with link `{link}` not found"),
        }
    }
}

impl Error for EntryBookError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryBook {
    entries: Vec<Entry>,
}

impl EntryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a book from entries in order, failing on the first duplicate.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Result<Self, EntryBookError> {
        let mut book = Self::new();
        for entry in entries {
            book.add(entry)?;
        }
        Ok(book)
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.position_of(entry).is_some()
    }

    pub fn position_of(&self, entry: &Entry) -> Option<usize> {
        self.entries
            .iter()
            .position(|existing| existing.is_same_entry(entry))
    }

    /// Appends `entry` at the end of the book.
    pub fn add(&mut self, entry: Entry) -> Result<(), EntryBookError> {
        if self.contains(&entry) {
            return Err(EntryBookError::Duplicate(entry.link));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Replaces `target` with `edited` at the same position.
    ///
    /// `edited` may keep the target's link; it may not take the link of any
    /// other entry.
    pub fn set(&mut self, target: &Entry, edited: Entry) -> Result<(), EntryBookError> {
        let Some(index) = self.position_of(target) else {
            return Err(EntryBookError::NotFound(target.link.clone()));
        };
        let collides = self
            .entries
            .iter()
            .enumerate()
            .any(|(position, existing)| position != index && existing.is_same_entry(&edited));
        if collides {
            return Err(EntryBookError::Duplicate(edited.link));
        }
        self.entries[index] = edited;
        Ok(())
    }

    /// Removes and returns the entry matching `target`.
    pub fn remove(&mut self, target: &Entry) -> Result<Entry, EntryBookError> {
        match self.position_of(target) {
            Some(index) => Ok(self.entries.remove(index)),
            None => Err(EntryBookError::NotFound(target.link.clone())),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
