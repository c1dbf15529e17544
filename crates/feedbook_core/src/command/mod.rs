//! Typed commands and their execution against the model store.
//!
//! # Responsibility
//! - Represent every accepted command as one variant of a closed enum.
//! - Apply commands to the store and report outcomes as `CommandResult`.
//!
//! # Invariants
//! - A failed command leaves both books exactly as they were, except batch
//!   commands where failures are isolated per entry.
//! - Index arguments always resolve against the displayed filtered view.
//!
//! # See also
//! - `crate::parser` for how raw input becomes a `Command`.
//! - `crate::service::command_service` for the persist step that follows.

mod execute;
pub mod history;
pub mod result;

use crate::model::context::{ModelContext, ViewMode};
use crate::model::entry::{Description, Entry, Link, Tag, Title};
use crate::model::entry_book::EntryBookError;
use crate::model::index::Index;
use crate::search::predicate::FindDescriptor;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use history::CommandHistory;
pub use result::{BatchItem, BatchStatus, CommandResult, EngineFailure, FailureKind};

pub type CommandOutcome = Result<CommandResult, CommandError>;

/// Input for `add`; missing fields are filled from the fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRequest {
    pub link: Link,
    pub title: Option<Title>,
    pub description: Option<Description>,
    pub tags: BTreeSet<Tag>,
}

/// Fields replaced by `edit`; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDescriptor {
    pub title: Option<Title>,
    pub description: Option<Description>,
    pub link: Option<Link>,
    pub tags: Option<BTreeSet<Tag>>,
}

impl EditDescriptor {
    pub fn is_any_field_edited(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.link.is_some()
            || self.tags.is_some()
    }

    /// Returns `entry` with the edited fields applied. Content and read state
    /// carry over unchanged.
    pub fn apply(&self, entry: &Entry) -> Entry {
        let mut edited = entry.clone();
        if let Some(title) = &self.title {
            edited.title = title.clone();
        }
        if let Some(description) = &self.description {
            edited.description = description.clone();
        }
        if let Some(link) = &self.link {
            edited.link = link.clone();
        }
        if let Some(tags) = &self.tags {
            edited.tags = tags.clone();
        }
        edited
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(AddRequest),
    Subscribe(Entry),
    Delete(Index),
    DeleteAll,
    ClearArchives,
    ClearList,
    Edit {
        index: Index,
        descriptor: EditDescriptor,
    },
    Archive(Index),
    ArchiveAll,
    Unarchive(Index),
    Find(FindDescriptor),
    List,
    Archives,
    Select(Index),
    SetViewMode(ViewMode),
    History,
    Refresh(Index),
    RefreshAll,
    Feed(Link),
    /// Google News feed built from the keywords.
    GoogleNews(Link),
    Offline(bool),
    Help,
    Exit,
}

impl Command {
    /// Canonical command word, used for logging.
    pub fn word(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Subscribe(_) => "subscribe",
            Self::Delete(_) => "delete",
            Self::DeleteAll => "deleteall",
            Self::ClearArchives => "cleararchives",
            Self::ClearList => "clear",
            Self::Edit { .. } => "edit",
            Self::Archive(_) => "archive",
            Self::ArchiveAll => "archiveall",
            Self::Unarchive(_) => "unarchive",
            Self::Find(_) => "find",
            Self::List => "list",
            Self::Archives => "archives",
            Self::Select(_) => "select",
            Self::SetViewMode(_) => "view",
            Self::History => "history",
            Self::Refresh(_) => "refresh",
            Self::RefreshAll => "refreshall",
            Self::Feed(_) => "feed",
            Self::GoogleNews(_) => "googlenews",
            Self::Offline(_) => "offline",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }
}

/// Recoverable business-rule violation raised during execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Index is past the end of the displayed list.
    InvalidIndex { index: Index, size: usize },
    /// Target book already holds an entry with this link.
    DuplicateEntry { link: Link, context: ModelContext },
    /// Command is not legal in the current context.
    InvalidContext {
        command: &'static str,
        context: ModelContext,
    },
    /// Refresh could not retrieve content (offline or unreachable).
    RefreshFailed { link: Link },
    /// The feed document could not be downloaded.
    FeedUnavailable { link: Link },
    /// The downloaded document is not a readable RSS or Atom feed.
    InvalidFeed { link: Link, reason: String },
    /// Store invariant breach surfaced from the entry book.
    Book(EntryBookError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIndex { .. } => write!(f, "The entry index provided is invalid"),
            Self::DuplicateEntry { context, .. } => {
                write!(f, "This entry already exists in the {context}")
            }
            Self::InvalidContext { command, context } => {
                write!(f, "`{command}` cannot be used in the {context} context")
            }
            Self::RefreshFailed { link } => {
                write!(f, "Could not fetch article content for {link}")
            }
            Self::FeedUnavailable { link } => write!(f, "Could not download the feed at {link}"),
            Self::InvalidFeed { link, reason } => {
                write!(f, "The document at {link} is not a readable feed: {reason}")
            }
            Self::Book(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Book(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntryBookError> for CommandError {
    fn from(value: EntryBookError) -> Self {
        Self::Book(value)
    }
}
