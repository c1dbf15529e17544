//! Core engine for FeedBook, a command-driven feed reading list.
//! This crate is the single source of truth for entry and book invariants.

pub mod command;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod network;
pub mod parser;
pub mod repo;
pub mod search;
pub mod service;
pub mod store;

pub use command::{
    BatchItem, BatchStatus, Command, CommandError, CommandHistory, CommandResult, EngineFailure,
    FailureKind,
};
pub use config::{Config, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::context::{ModelContext, ReaderStyle, ViewMode, ViewType};
pub use model::entry::{Description, Entry, EntryValidationError, Link, Tag, Title};
pub use model::entry_book::{EntryBook, EntryBookError};
pub use model::index::Index;
pub use network::{ArticleFetcher, FeedError, FeedItem, HttpArticleFetcher, Network};
pub use parser::{command_defs, parse, CommandDef, ParseError, ParseResult};
pub use repo::entry_repo::{
    EntryBookStorage, RepoError, RepoResult, SqliteEntryBookRepository, StoredBooks,
};
pub use search::predicate::{EntryPredicate, FindDescriptor};
pub use service::command_service::{CommandService, EngineError};
pub use store::model_store::{ModelStore, PendingSave, ReadMark};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
