//! Command engine use-case service.
//!
//! # Responsibility
//! - Run the parse, execute, persist pipeline for one raw input line.
//! - Publish outcomes into the store's observable cells.
//!
//! # Invariants
//! - Commands run one at a time through `&mut self`.
//! - Only successfully parsed input is appended to history, after execution.
//! - After a successful command the store's pending save is drained: book
//!   changes rewrite both books, read flags alone update just those rows.
//! - A failed save forces the next save to rewrite both books, so storage
//!   catches up with every change the failed save missed.
//! - A failed command is never saved because it left the books unchanged.
//! - On failure `last_exception` is set; on success `last_result` is set and
//!   `last_exception` is cleared.
//!
//! # See also
//! - `crate::command` for per-command semantics.
//! - `crate::repo::entry_repo` for the storage contract.

use crate::command::{CommandError, CommandHistory, CommandResult, EngineFailure, FailureKind};
use crate::model::context::ModelContext;
use crate::network::Network;
use crate::parser::{parse, ParseError};
use crate::repo::entry_repo::{EntryBookStorage, RepoError, StoredBooks};
use crate::store::model_store::{ModelStore, PendingSave};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Any failure surfaced by [`CommandService::execute`].
#[derive(Debug)]
pub enum EngineError {
    Parse(ParseError),
    Command(CommandError),
    Storage(RepoError),
}

impl EngineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Parse(_) => FailureKind::Parse,
            Self::Command(_) => FailureKind::Command,
            Self::Storage(_) => FailureKind::Storage,
        }
    }

    /// Presentation snapshot of this error.
    pub fn to_failure(&self) -> EngineFailure {
        EngineFailure {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Command(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "Could not save entries: {err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Command(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ParseError> for EngineError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

impl From<CommandError> for EngineError {
    fn from(value: CommandError) -> Self {
        Self::Command(value)
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

/// Engine facade owned by a front end.
pub struct CommandService<S: EntryBookStorage> {
    store: ModelStore,
    history: CommandHistory,
    network: Network,
    storage: S,
    /// Set while storage lags behind the books after a failed save.
    storage_behind: bool,
}

impl<S: EntryBookStorage> CommandService<S> {
    /// Loads both books from `storage`; a fresh store starts empty.
    pub fn open(storage: S, network: Network) -> Result<Self, RepoError> {
        let StoredBooks { active, archive } = storage.load_books()?.unwrap_or_default();
        info!(
            "event=books_load module=service status=ok active={} archive={}",
            active.len(),
            archive.len()
        );
        Ok(Self {
            store: ModelStore::new(active, archive),
            history: CommandHistory::new(),
            network,
            storage,
            storage_behind: false,
        })
    }

    /// Parses and executes one raw input line.
    ///
    /// # Errors
    /// - `Parse` for malformed input; nothing else changes.
    /// - `Command` for rejected execution; only history changes.
    /// - `Storage` when the post-command save fails. The in-memory books
    ///   keep the command's effect.
    pub fn execute(&mut self, raw: &str) -> Result<CommandResult, EngineError> {
        let started_at = Instant::now();
        let outcome = self.run(raw.trim());

        match &outcome {
            Ok(result) => {
                self.store.set_last_exception(None);
                self.store.set_last_result(Some(result.clone()));
            }
            Err(err) => {
                warn!(
                    "event=command_execute module=service status=error error_kind={} duration_ms={}",
                    err.kind(),
                    started_at.elapsed().as_millis()
                );
                self.store.set_last_exception(Some(err.to_failure()));
            }
        }
        outcome
    }

    fn run(&mut self, raw: &str) -> Result<CommandResult, EngineError> {
        let started_at = Instant::now();
        let command = parse(raw, self.store.context())?;
        let outcome = command.execute(&mut self.store, &self.history, &self.network);
        self.history.add(raw);
        let result = outcome?;

        self.save_pending()?;
        info!(
            "event=command_execute module=service status=ok command={} duration_ms={}",
            command.word(),
            started_at.elapsed().as_millis()
        );
        Ok(result)
    }

    fn save_pending(&mut self) -> Result<(), RepoError> {
        let Some(pending) = self.store.take_pending_save() else {
            return Ok(());
        };
        let saved = match pending {
            PendingSave::ReadState(marks) if !self.storage_behind => {
                self.storage.save_read_state(&marks)
            }
            _ => {
                let (active, archive) = self.store.books();
                self.storage.save_books(active, archive)
            }
        };
        self.storage_behind = saved.is_err();
        saved
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    pub fn context(&self) -> ModelContext {
        self.store.context()
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn network(&self) -> &Network {
        &self.network
    }
}
