//! Entry book persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Load both books at start-up and save them after mutating commands.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `save_books` replaces both books in one transaction; a failed save
//!   leaves the previous snapshot intact.
//! - `save_read_state` only flips `is_read` on rows that already exist and
//!   never changes order, content or tags.
//! - Read paths validate every row through the entry validators and reject
//!   invalid persisted state instead of masking it.
//!
//! # See also
//! - `crate::db` for connection setup and the schema.
//! - `crate::store::model_store::PendingSave` for which save runs when.

use crate::db::DbError;
use crate::model::entry::{Description, Entry, EntryValidationError, Link, Tag, Title};
use crate::model::context::ModelContext;
use crate::model::entry_book::{EntryBook, EntryBookError};
use crate::store::model_store::ReadMark;
use log::{error, info};
use rusqlite::{params, Connection, Transaction};
use std::collections::{BTreeSet, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

const BOOK_ACTIVE: &str = "active";
const BOOK_ARCHIVE: &str = "archive";

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Persisted rows violate an entry or book invariant.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted entry data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Both books as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredBooks {
    pub active: EntryBook,
    pub archive: EntryBook,
}

/// Storage used by the command service to survive restarts.
pub trait EntryBookStorage {
    /// Returns `None` when nothing has ever been saved.
    fn load_books(&self) -> RepoResult<Option<StoredBooks>>;
    fn save_books(&mut self, active: &EntryBook, archive: &EntryBook) -> RepoResult<()>;
    /// Persists read flags set since the last save of either kind.
    fn save_read_state(&mut self, marks: &[ReadMark]) -> RepoResult<()>;
}

/// SQLite-backed storage that owns its connection.
pub struct SqliteEntryBookRepository {
    conn: Connection,
}

impl SqliteEntryBookRepository {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl EntryBookStorage for SqliteEntryBookRepository {
    fn load_books(&self) -> RepoResult<Option<StoredBooks>> {
        let saved = self
            .conn
            .query_row("SELECT COUNT(*) FROM book_state;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        if saved == 0 {
            return Ok(None);
        }

        let mut tags = load_tags(&self.conn)?;
        let active = load_book(&self.conn, BOOK_ACTIVE, &mut tags)?;
        let archive = load_book(&self.conn, BOOK_ARCHIVE, &mut tags)?;
        Ok(Some(StoredBooks { active, archive }))
    }

    fn save_books(&mut self, active: &EntryBook, archive: &EntryBook) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = write_books(&mut self.conn, active, archive);
        match &result {
            Ok(()) => info!(
                "event=books_save module=repo status=ok active={} archive={} duration_ms={}",
                active.len(),
                archive.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=books_save module=repo status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn save_read_state(&mut self, marks: &[ReadMark]) -> RepoResult<()> {
        let result = write_read_marks(&mut self.conn, marks);
        match &result {
            Ok(()) => info!(
                "event=read_state_save module=repo status=ok marks={}",
                marks.len()
            ),
            Err(err) => error!("event=read_state_save module=repo status=error error={err}"),
        }
        result
    }
}

fn book_name(context: ModelContext) -> &'static str {
    match context {
        ModelContext::List => BOOK_ACTIVE,
        ModelContext::Archives => BOOK_ARCHIVE,
    }
}

fn write_read_marks(conn: &mut Connection, marks: &[ReadMark]) -> RepoResult<()> {
    let tx = conn.transaction()?;
    {
        let mut update =
            tx.prepare("UPDATE entries SET is_read = 1 WHERE book = ?1 AND link = ?2;")?;
        for mark in marks {
            let changed = update.execute(params![book_name(mark.context), mark.link.as_str()])?;
            if changed != 1 {
                return Err(RepoError::InvalidData(format!(
                    "no saved {} entry for {}",
                    book_name(mark.context),
                    mark.link
                )));
            }
        }
    }
    tx.commit()?;
    Ok(())
}

fn write_books(conn: &mut Connection, active: &EntryBook, archive: &EntryBook) -> RepoResult<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM entries;", [])?;
    insert_book(&tx, BOOK_ACTIVE, active)?;
    insert_book(&tx, BOOK_ARCHIVE, archive)?;
    tx.execute(
        "INSERT INTO book_state (id, saved_at) VALUES (1, ?1)
         ON CONFLICT (id) DO UPDATE SET saved_at = excluded.saved_at;",
        [now_millis()],
    )?;
    tx.commit()?;
    Ok(())
}

fn insert_book(tx: &Transaction<'_>, book: &str, entries: &EntryBook) -> RepoResult<()> {
    let mut insert_entry = tx.prepare(
        "INSERT INTO entries (book, position, title, description, link, content, is_read)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
    )?;
    let mut insert_tag =
        tx.prepare("INSERT INTO entry_tags (book, link, tag) VALUES (?1, ?2, ?3);")?;

    for (position, entry) in entries.iter().enumerate() {
        insert_entry.execute(params![
            book,
            i64::try_from(position).unwrap_or(i64::MAX),
            entry.title.as_str(),
            entry.description.as_str(),
            entry.link.as_str(),
            entry.content.as_deref(),
            i64::from(entry.read),
        ])?;
        for tag in &entry.tags {
            insert_tag.execute(params![book, entry.link.as_str(), tag.as_str()])?;
        }
    }
    Ok(())
}

type TagIndex = HashMap<(String, String), Vec<String>>;

fn load_tags(conn: &Connection) -> RepoResult<TagIndex> {
    let mut stmt = conn.prepare("SELECT book, link, tag FROM entry_tags ORDER BY tag ASC;")?;
    let mut rows = stmt.query([])?;
    let mut index = TagIndex::new();
    while let Some(row) = rows.next()? {
        index
            .entry((row.get("book")?, row.get("link")?))
            .or_default()
            .push(row.get("tag")?);
    }
    Ok(index)
}

fn load_book(conn: &Connection, book: &str, tags: &mut TagIndex) -> RepoResult<EntryBook> {
    let mut stmt = conn.prepare(
        "SELECT title, description, link, content, is_read
         FROM entries
         WHERE book = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([book])?;
    let mut entries = Vec::new();

    while let Some(row) = rows.next()? {
        let link_text: String = row.get("link")?;
        let raw_tags = tags
            .remove(&(book.to_string(), link_text.clone()))
            .unwrap_or_default();
        let title = Title::parse(&row.get::<_, String>("title")?).map_err(invalid("title"))?;
        let description = Description::parse(&row.get::<_, String>("description")?)
            .map_err(invalid("description"))?;
        let link = Link::parse(&link_text).map_err(invalid("link"))?;
        let tags = raw_tags
            .iter()
            .map(|tag| Tag::parse(tag))
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(invalid("tag"))?;
        let read = match row.get::<_, i64>("is_read")? {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid is_read value `{other}` in entries.is_read"
                )));
            }
        };

        let mut entry = Entry::new(title, description, link, tags)
            .with_content(row.get::<_, Option<Vec<u8>>>("content")?);
        entry.read = read;
        entries.push(entry);
    }

    EntryBook::from_entries(entries).map_err(|err: EntryBookError| {
        RepoError::InvalidData(format!("{book} book: {err}"))
    })
}

fn invalid(column: &'static str) -> impl Fn(EntryValidationError) -> RepoError {
    move |err| RepoError::InvalidData(format!("entries.{column}: {err}"))
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
