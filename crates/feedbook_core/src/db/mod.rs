//! SQLite storage for both entry books.
//!
//! # Responsibility
//! - Open configured connections with the current schema applied.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`; a database written
//!   by a newer build is refused rather than downgraded.
//! - No entry data is read or written before migrations succeed.
//!
//! # See also
//! - `crate::repo::entry_repo` for the queries run on these connections.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to bring the books database into a usable state.
#[derive(Debug)]
pub enum DbError {
    /// The database could not be opened or its connection settings applied.
    Open {
        mode: &'static str,
        source: rusqlite::Error,
    },
    /// Migration `version` failed; every pending migration was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer FeedBook with a schema this build
    /// cannot read.
    NewerSchema { found: u32, supported: u32 },
    /// A statement against an already open database failed.
    Query(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { mode, source } => {
                write!(f, "could not open the {mode} books database: {source}")
            }
            Self::Migration { version, source } => {
                write!(f, "books schema migration {version} failed: {source}")
            }
            Self::NewerSchema { found, supported } => write!(
                f,
                "books database has schema version {found} but this build reads up to {supported}"
            ),
            Self::Query(err) => write!(f, "books database query failed: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Query(err) => Some(err),
            Self::NewerSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}
