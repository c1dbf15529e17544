//! In-memory model store for both entry books.
//!
//! # Responsibility
//! - Own the active and archive books, the context flag and the filtered view.
//! - Publish presentation state through observable cells.
//!
//! # Invariants
//! - Every mutating method recomputes the filtered view before returning, so
//!   readers never observe a view that lags behind the books or predicate.
//! - Moves between books are atomic: both books change or neither does.
//! - A selected entry is always present in the filtered view (or `None`).
//! - Every successful book mutation records what storage is owed, so the
//!   service never rewrites both books for a flipped read flag.
//!
//! # See also
//! - `crate::service::command_service` drains the pending save.

use crate::command::result::{CommandResult, EngineFailure};
use crate::model::context::{ModelContext, ViewMode};
use crate::model::entry::{Entry, Link};
use crate::model::entry_book::{EntryBook, EntryBookError};
use crate::search::predicate::EntryPredicate;
use crate::store::observable::Observable;

/// Entry in `context`'s book whose read flag was set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMark {
    pub context: ModelContext,
    pub link: Link,
}

/// Persistence owed since the last drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingSave {
    /// Entries were added, removed, moved or rewritten.
    Books,
    /// Only read flags changed.
    ReadState(Vec<ReadMark>),
}

#[derive(Debug, Default)]
pub struct ModelStore {
    active: EntryBook,
    archive: EntryBook,
    context: ModelContext,
    predicate: EntryPredicate,
    filtered: Observable<Vec<Entry>>,
    selected: Observable<Option<Entry>>,
    view_mode: Observable<ViewMode>,
    last_result: Observable<Option<CommandResult>>,
    last_exception: Observable<Option<EngineFailure>>,
    pending: Option<PendingSave>,
}

impl ModelStore {
    /// Creates a store in `List` context showing every active entry.
    pub fn new(active: EntryBook, archive: EntryBook) -> Self {
        let mut store = Self {
            active,
            archive,
            ..Self::default()
        };
        store.refresh_filtered();
        store
    }

    pub fn context(&self) -> ModelContext {
        self.context
    }

    /// Switches the book the view and index-based commands operate on.
    pub fn set_context(&mut self, context: ModelContext) {
        self.context = context;
        self.refresh_filtered();
    }

    pub fn active_book(&self) -> &EntryBook {
        &self.active
    }

    pub fn archive_book(&self) -> &EntryBook {
        &self.archive
    }

    /// Both books as `(active, archive)`, for persistence.
    pub fn books(&self) -> (&EntryBook, &EntryBook) {
        (&self.active, &self.archive)
    }

    /// Replaces both books wholesale, e.g. after loading from storage.
    pub fn set_books(&mut self, active: EntryBook, archive: EntryBook) {
        self.active = active;
        self.archive = archive;
        self.refresh_filtered();
    }

    /// Whether the contextual book already holds an entry with this link.
    pub fn has_entry(&self, entry: &Entry) -> bool {
        self.contextual_book().contains(entry)
    }

    /// Appends `entry` to the active book.
    pub fn add_entry(&mut self, entry: Entry) -> Result<(), EntryBookError> {
        self.active.add(entry)?;
        self.mark_books_dirty();
        self.refresh_filtered();
        Ok(())
    }

    /// Removes `target` from the contextual book.
    pub fn delete_entry(&mut self, target: &Entry) -> Result<Entry, EntryBookError> {
        let removed = self.contextual_book_mut().remove(target)?;
        self.mark_books_dirty();
        self.refresh_filtered();
        Ok(removed)
    }

    /// Removes every displayed entry from the contextual book and returns how
    /// many went. Entries hidden by the predicate stay.
    pub fn clear_filtered(&mut self) -> usize {
        let targets = self.filtered.get().clone();
        let book = self.contextual_book_mut();
        let removed = targets
            .iter()
            .filter(|target| book.remove(target).is_ok())
            .count();
        if removed > 0 {
            self.mark_books_dirty();
        }
        self.refresh_filtered();
        removed
    }

    /// Replaces `target` in the contextual book, keeping its position.
    /// A selection on `target` follows the replacement even when the link
    /// changed.
    pub fn set_entry(&mut self, target: &Entry, edited: Entry) -> Result<(), EntryBookError> {
        self.contextual_book_mut().set(target, edited.clone())?;
        if self
            .selected
            .get()
            .as_ref()
            .is_some_and(|selected| selected.is_same_entry(target))
        {
            self.selected.set(Some(edited));
        }
        self.mark_books_dirty();
        self.refresh_filtered();
        Ok(())
    }

    /// Sets the read flag on `target` in the contextual book and returns the
    /// stored entry. An entry that is already read is left alone and owes
    /// nothing to storage.
    pub fn mark_entry_read(&mut self, target: &Entry) -> Result<Entry, EntryBookError> {
        if target.read {
            return Ok(target.clone());
        }
        let mut read = target.clone();
        read.mark_read();
        self.contextual_book_mut().set(target, read.clone())?;
        let mark = ReadMark {
            context: self.context,
            link: read.link.clone(),
        };
        self.note_read(mark);
        self.refresh_filtered();
        Ok(read)
    }

    /// Moves `target` from the active book into the archive with `content`.
    pub fn archive_entry(
        &mut self,
        target: &Entry,
        content: Option<Vec<u8>>,
    ) -> Result<(), EntryBookError> {
        move_entry(&mut self.active, &mut self.archive, target, content)?;
        self.mark_books_dirty();
        self.refresh_filtered();
        Ok(())
    }

    /// Moves `target` from the archive back into the active book with `content`.
    pub fn unarchive_entry(
        &mut self,
        target: &Entry,
        content: Option<Vec<u8>>,
    ) -> Result<(), EntryBookError> {
        move_entry(&mut self.archive, &mut self.active, target, content)?;
        self.mark_books_dirty();
        self.refresh_filtered();
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active.clear();
        self.mark_books_dirty();
        self.refresh_filtered();
    }

    pub fn clear_archive(&mut self) {
        self.archive.clear();
        self.mark_books_dirty();
        self.refresh_filtered();
    }

    pub fn predicate(&self) -> &EntryPredicate {
        &self.predicate
    }

    /// Replaces the view predicate and recomputes the view.
    pub fn update_filtered_entry_list(&mut self, predicate: EntryPredicate) {
        self.predicate = predicate;
        self.refresh_filtered();
    }

    /// Entries currently displayed, in book order.
    pub fn filtered_entries(&self) -> &[Entry] {
        self.filtered.get()
    }

    pub fn filtered_entry_list(&self) -> &Observable<Vec<Entry>> {
        &self.filtered
    }

    pub fn selected_entry(&self) -> &Observable<Option<Entry>> {
        &self.selected
    }

    pub fn set_selected_entry(&mut self, entry: Option<Entry>) {
        self.selected.set(entry);
    }

    pub fn view_mode(&self) -> &Observable<ViewMode> {
        &self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode.set(view_mode);
    }

    pub fn last_result(&self) -> &Observable<Option<CommandResult>> {
        &self.last_result
    }

    pub fn set_last_result(&mut self, result: Option<CommandResult>) {
        self.last_result.set(result);
    }

    pub fn last_exception(&self) -> &Observable<Option<EngineFailure>> {
        &self.last_exception
    }

    pub fn set_last_exception(&mut self, failure: Option<EngineFailure>) {
        self.last_exception.set(failure);
    }

    /// Drains the persistence owed since the last call.
    pub(crate) fn take_pending_save(&mut self) -> Option<PendingSave> {
        self.pending.take()
    }

    fn mark_books_dirty(&mut self) {
        self.pending = Some(PendingSave::Books);
    }

    fn note_read(&mut self, mark: ReadMark) {
        match &mut self.pending {
            Some(PendingSave::Books) => {}
            Some(PendingSave::ReadState(marks)) => marks.push(mark),
            None => self.pending = Some(PendingSave::ReadState(vec![mark])),
        }
    }

    fn contextual_book(&self) -> &EntryBook {
        match self.context {
            ModelContext::List => &self.active,
            ModelContext::Archives => &self.archive,
        }
    }

    fn contextual_book_mut(&mut self) -> &mut EntryBook {
        match self.context {
            ModelContext::List => &mut self.active,
            ModelContext::Archives => &mut self.archive,
        }
    }

    fn refresh_filtered(&mut self) {
        let visible = self
            .contextual_book()
            .iter()
            .filter(|entry| self.predicate.test(entry))
            .cloned()
            .collect::<Vec<_>>();

        let reselected = match self.selected.get() {
            None => None,
            Some(selected) => match visible.iter().find(|entry| entry.is_same_entry(selected)) {
                None => Some(None),
                Some(current) if current != selected => Some(Some(current.clone())),
                Some(_) => None,
            },
        };

        self.filtered.set(visible);
        if let Some(selection) = reselected {
            self.selected.set(selection);
        }
    }
}

fn move_entry(
    from: &mut EntryBook,
    to: &mut EntryBook,
    target: &Entry,
    content: Option<Vec<u8>>,
) -> Result<(), EntryBookError> {
    if !from.contains(target) {
        return Err(EntryBookError::NotFound(target.link.clone()));
    }
    if to.contains(target) {
        return Err(EntryBookError::Duplicate(target.link.clone()));
    }
    let moved = from.remove(target)?;
    to.add(moved.with_content(content))
}

#[cfg(test)]
mod tests {
    use super::{ModelStore, PendingSave, ReadMark};
    use crate::model::context::ModelContext;
    use crate::model::entry::{Description, Entry, Link, Title};
    use crate::model::entry_book::{EntryBook, EntryBookError};
    use crate::search::predicate::{EntryPredicate, FindDescriptor};
    use std::collections::BTreeSet;

    fn entry(title: &str, link: &str) -> Entry {
        Entry::new(
            Title::parse(title).unwrap(),
            Description::empty(),
            Link::parse(link).unwrap(),
            BTreeSet::new(),
        )
    }

    #[test]
    fn add_then_has_entry_and_duplicate_rejected() {
        let mut store = ModelStore::default();
        let alice = entry("Alice", "http://a.com");
        store.add_entry(alice.clone()).unwrap();
        assert!(store.has_entry(&alice));

        let err = store.add_entry(entry("Alias", "http://a.com")).unwrap_err();
        assert!(matches!(err, EntryBookError::Duplicate(_)));
        assert_eq!(store.active_book().len(), 1);
        assert_eq!(store.filtered_entries().len(), 1);
    }

    #[test]
    fn archive_move_is_atomic_on_duplicate() {
        let alice = entry("Alice", "http://a.com");
        let active = EntryBook::from_entries([alice.clone()]).unwrap();
        let archive = EntryBook::from_entries([entry("Old Alice", "http://a.com")]).unwrap();
        let mut store = ModelStore::new(active, archive);

        let err = store.archive_entry(&alice, Some(b"x".to_vec())).unwrap_err();
        assert!(matches!(err, EntryBookError::Duplicate(_)));
        assert_eq!(store.active_book().len(), 1);
        assert_eq!(store.archive_book().len(), 1);
        assert!(store.archive_book().entries()[0].content.is_none());
    }

    #[test]
    fn archive_attaches_content_and_view_follows_context() {
        let alice = entry("Alice", "http://a.com");
        let mut store = ModelStore::new(
            EntryBook::from_entries([alice.clone()]).unwrap(),
            EntryBook::new(),
        );

        store.archive_entry(&alice, Some(b"<html/>".to_vec())).unwrap();
        assert!(store.filtered_entries().is_empty());

        store.set_context(ModelContext::Archives);
        assert_eq!(store.filtered_entries().len(), 1);
        assert_eq!(
            store.filtered_entries()[0].content.as_deref(),
            Some(&b"<html/>"[..])
        );
    }

    #[test]
    fn selection_is_cleared_when_entry_leaves_view() {
        let alice = entry("Alice", "http://a.com");
        let mut store = ModelStore::new(
            EntryBook::from_entries([alice.clone(), entry("Bob", "http://b.com")]).unwrap(),
            EntryBook::new(),
        );
        store.set_selected_entry(Some(alice.clone()));

        store.update_filtered_entry_list(EntryPredicate::Matches(FindDescriptor {
            title: vec!["bob".to_string()],
            ..FindDescriptor::default()
        }));

        assert_eq!(store.filtered_entries().len(), 1);
        assert!(store.selected_entry().get().is_none());
    }

    #[test]
    fn selection_tracks_edited_entry() {
        let alice = entry("Alice", "http://a.com");
        let mut store = ModelStore::new(
            EntryBook::from_entries([alice.clone()]).unwrap(),
            EntryBook::new(),
        );
        store.set_selected_entry(Some(alice.clone()));

        let renamed = entry("Alicia", "http://a.com");
        store.set_entry(&alice, renamed.clone()).unwrap();

        assert_eq!(store.selected_entry().get().as_ref(), Some(&renamed));
    }

    #[test]
    fn filtered_view_revision_moves_on_every_mutation() {
        let mut store = ModelStore::default();
        let before = store.filtered_entry_list().revision();
        store.add_entry(entry("Alice", "http://a.com")).unwrap();
        store.clear_active();
        assert_eq!(store.filtered_entry_list().revision(), before + 2);
    }

    #[test]
    fn selection_follows_link_edit() {
        let alice = entry("Alice", "http://a.com");
        let mut store = ModelStore::new(
            EntryBook::from_entries([alice.clone()]).unwrap(),
            EntryBook::new(),
        );
        store.set_selected_entry(Some(alice.clone()));

        let moved = entry("Alice", "http://b.com");
        store.set_entry(&alice, moved.clone()).unwrap();

        assert_eq!(store.selected_entry().get().as_ref(), Some(&moved));
    }

    #[test]
    fn clear_filtered_keeps_hidden_entries() {
        let mut store = ModelStore::new(
            EntryBook::from_entries([
                entry("Alice", "http://a.com"),
                entry("Bob", "http://b.com"),
                entry("Bobby", "http://c.com"),
            ])
            .unwrap(),
            EntryBook::new(),
        );
        store.update_filtered_entry_list(EntryPredicate::Matches(FindDescriptor {
            title: vec!["bob".to_string()],
            ..FindDescriptor::default()
        }));

        assert_eq!(store.clear_filtered(), 2);
        assert!(store.filtered_entries().is_empty());
        store.update_filtered_entry_list(EntryPredicate::All);
        assert_eq!(store.filtered_entries().len(), 1);
        assert_eq!(store.active_book().entries()[0].title.as_str(), "Alice");
    }

    #[test]
    fn read_marks_are_pending_until_a_book_changes() {
        let alice = entry("Alice", "http://a.com");
        let bob = entry("Bob", "http://b.com");
        let mut store = ModelStore::new(
            EntryBook::from_entries([alice.clone(), bob.clone()]).unwrap(),
            EntryBook::new(),
        );
        assert_eq!(store.take_pending_save(), None);

        let read = store.mark_entry_read(&alice).unwrap();
        assert!(read.read);
        assert!(store.active_book().entries()[0].read);
        store.mark_entry_read(&read).unwrap();
        assert_eq!(
            store.take_pending_save(),
            Some(PendingSave::ReadState(vec![ReadMark {
                context: ModelContext::List,
                link: alice.link.clone(),
            }]))
        );
        assert_eq!(store.take_pending_save(), None);

        store.mark_entry_read(&bob).unwrap();
        store.delete_entry(&read).unwrap();
        assert_eq!(store.take_pending_save(), Some(PendingSave::Books));
    }
}
