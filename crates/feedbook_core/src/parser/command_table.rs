//! Context-scoped command word table.
//!
//! # Invariants
//! - Within one context, every word and alias resolves to at most one
//!   command.
//! - A word missing from a context's table is unknown there; nothing hints
//!   that it exists elsewhere.

use crate::model::context::ModelContext;

const LIST_ONLY: &[ModelContext] = &[ModelContext::List];
const ARCHIVES_ONLY: &[ModelContext] = &[ModelContext::Archives];
const EVERYWHERE: &[ModelContext] = &[ModelContext::List, ModelContext::Archives];

/// Identifies which argument parser handles a resolved word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    Subscribe,
    Delete,
    DeleteAll,
    ClearArchives,
    ClearList,
    Edit,
    Archive,
    ArchiveAll,
    Unarchive,
    Find,
    List,
    Archives,
    Select,
    View,
    History,
    Refresh,
    RefreshAll,
    Feed,
    GoogleNews,
    Offline,
    Help,
    Exit,
}

/// One row of the command table, also used to render help.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDef {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub summary: &'static str,
    /// Full usage message shown on format errors.
    pub usage: &'static str,
    pub kind: CommandKind,
    contexts: &'static [ModelContext],
}

impl CommandDef {
    pub fn is_available_in(&self, context: ModelContext) -> bool {
        self.contexts.contains(&context)
    }

    fn matches(&self, word: &str) -> bool {
        self.name == word || self.aliases.contains(&word)
    }
}

pub const ADD_USAGE: &str = "add: Adds an entry to the reading list. A missing title or description is \
taken from the linked page.\n\
Parameters: l/LINK [t/TITLE] [d/DESCRIPTION] [c/TAG]...\n\
Example: add l/https://blog.rust-lang.org/ c/rust";
pub const SUBSCRIBE_USAGE: &str = "subscribe: Subscribes to a feed by adding it to the reading list. \
Without tags, the link host becomes the tag.\n\
Parameters: [t/TITLE] [d/DESCRIPTION] l/LINK [c/TAG]...\n\
Example: subscribe t/This Week in Rust d/Weekly newsletter l/https://this-week-in-rust.org/rss.xml";
pub const DELETE_USAGE: &str = "delete: Deletes the entry identified by the index number used in the \
displayed entry list.\n\
Parameters: INDEX (must be a positive integer)\n\
Example: delete 1";
pub const DELETE_ALL_USAGE: &str = "deleteall: Deletes every entry in the reading list.\n\
Example: deleteall";
pub const CLEAR_ARCHIVES_USAGE: &str = "cleararchives: Deletes every archived entry.\n\
Example: cleararchives";
pub const CLEAR_USAGE: &str = "clear: Deletes every entry currently displayed, leaving entries hidden \
by the last find untouched.\n\
Example: find c/old then clear";
pub const EDIT_USAGE: &str = "edit: Edits the entry identified by the index number used in the displayed \
entry list. Existing values will be overwritten by the input values.\n\
Parameters: INDEX (must be a positive integer) [t/TITLE] [d/DESCRIPTION] [l/LINK] [c/TAG]...\n\
Example: edit 1 t/Rust Blog c/rust";
pub const ARCHIVE_USAGE: &str = "archive: Archives the entry identified by the index number used in the \
displayed entry list, saving a copy of its article.\n\
Parameters: INDEX (must be a positive integer)\n\
Example: archive 1";
pub const ARCHIVE_ALL_USAGE: &str = "archiveall: Archives every entry in the reading list.\n\
Example: archiveall";
pub const UNARCHIVE_USAGE: &str = "unarchive: Un-archives the entry identified by the index number used in \
the displayed entry list.\n\
Parameters: INDEX (must be a positive integer)\n\
Example: unarchive 1";
pub const FIND_USAGE: &str = "find: Finds entries matching all of the given keywords (case-insensitive) \
and displays them as a list with index numbers.\n\
Parameters: [KEYWORD]... [t/TITLE_KEYWORD]... [d/DESCRIPTION_KEYWORD]... [l/LINK_KEYWORD]... [c/TAG]...\n\
Example: find rust c/release";
pub const LIST_USAGE: &str = "list: Lists all entries in the reading list.\n\
Example: list";
pub const ARCHIVES_USAGE: &str = "archives: Lists all archived entries.\n\
Example: archives";
pub const SELECT_USAGE: &str = "select: Selects the entry identified by the index number used in the \
displayed entry list and marks it as read.\n\
Parameters: INDEX (must be a positive integer)\n\
Example: select 1";
pub const VIEW_USAGE: &str = "view: Changes how selected entries are displayed.\n\
Parameters: browser | reader [s/default|dark]\n\
Example: view reader s/dark";
pub const HISTORY_USAGE: &str = "history: Lists all the commands that you have entered in reverse \
chronological order.\n\
Example: history";
pub const REFRESH_USAGE: &str = "refresh: Re-fetches the article of the entry identified by the index \
number used in the displayed entry list.\n\
Parameters: INDEX (must be a positive integer)\n\
Example: refresh 1";
pub const REFRESH_ALL_USAGE: &str = "refreshall: Re-fetches the article of every entry in the current \
list.\n\
Example: refreshall";
pub const FEED_USAGE: &str = "feed: Loads every item of an RSS or Atom feed into the reading list. \
Items already in the list are skipped.\n\
Parameters: LINK\n\
Example: feed https://blog.rust-lang.org/feed.xml";
pub const GOOGLE_NEWS_USAGE: &str = "googlenews: Loads Google News stories matching the keywords into \
the reading list, or the top stories without keywords.\n\
Parameters: [KEYWORD]...\n\
Example: googlenews rust language";
pub const OFFLINE_USAGE: &str = "offline: Enables or disables offline mode. While offline, articles are \
never fetched.\n\
Parameters: enable | disable\n\
Example: offline enable";
pub const HELP_USAGE: &str = "help: Shows program usage instructions.\n\
Example: help";
pub const EXIT_USAGE: &str = "exit: Exits the program.\n\
Example: exit";

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        name: "add",
        aliases: &["a"],
        summary: "Add an entry by link",
        usage: ADD_USAGE,
        kind: CommandKind::Add,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "subscribe",
        aliases: &["sub"],
        summary: "Subscribe to a feed",
        usage: SUBSCRIBE_USAGE,
        kind: CommandKind::Subscribe,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "delete",
        aliases: &["del"],
        summary: "Delete an entry",
        usage: DELETE_USAGE,
        kind: CommandKind::Delete,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "deleteall",
        aliases: &["delall"],
        summary: "Delete every entry in the reading list",
        usage: DELETE_ALL_USAGE,
        kind: CommandKind::DeleteAll,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "cleararchives",
        aliases: &["cleararcs"],
        summary: "Delete every archived entry",
        usage: CLEAR_ARCHIVES_USAGE,
        kind: CommandKind::ClearArchives,
        contexts: ARCHIVES_ONLY,
    },
    CommandDef {
        name: "clear",
        aliases: &[],
        summary: "Delete the displayed entries",
        usage: CLEAR_USAGE,
        kind: CommandKind::ClearList,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "edit",
        aliases: &["e"],
        summary: "Edit an entry",
        usage: EDIT_USAGE,
        kind: CommandKind::Edit,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "archive",
        aliases: &["arch"],
        summary: "Archive an entry",
        usage: ARCHIVE_USAGE,
        kind: CommandKind::Archive,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "archiveall",
        aliases: &["archall"],
        summary: "Archive every entry",
        usage: ARCHIVE_ALL_USAGE,
        kind: CommandKind::ArchiveAll,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "unarchive",
        aliases: &["unarch"],
        summary: "Move an archived entry back to the reading list",
        usage: UNARCHIVE_USAGE,
        kind: CommandKind::Unarchive,
        contexts: ARCHIVES_ONLY,
    },
    CommandDef {
        name: "find",
        aliases: &["f"],
        summary: "Filter the displayed list",
        usage: FIND_USAGE,
        kind: CommandKind::Find,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "list",
        aliases: &["l"],
        summary: "Show the reading list",
        usage: LIST_USAGE,
        kind: CommandKind::List,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "archives",
        aliases: &["arcs"],
        summary: "Show the archives",
        usage: ARCHIVES_USAGE,
        kind: CommandKind::Archives,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "select",
        aliases: &["s"],
        summary: "Select an entry",
        usage: SELECT_USAGE,
        kind: CommandKind::Select,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "view",
        aliases: &["v"],
        summary: "Change the view mode",
        usage: VIEW_USAGE,
        kind: CommandKind::View,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "history",
        aliases: &["hist"],
        summary: "Show entered commands",
        usage: HISTORY_USAGE,
        kind: CommandKind::History,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "refresh",
        aliases: &["ref"],
        summary: "Re-fetch one article",
        usage: REFRESH_USAGE,
        kind: CommandKind::Refresh,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "refreshall",
        aliases: &["refall"],
        summary: "Re-fetch every article in the current list",
        usage: REFRESH_ALL_USAGE,
        kind: CommandKind::RefreshAll,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "feed",
        aliases: &[],
        summary: "Load the items of a feed",
        usage: FEED_USAGE,
        kind: CommandKind::Feed,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "googlenews",
        aliases: &["gn"],
        summary: "Load Google News stories",
        usage: GOOGLE_NEWS_USAGE,
        kind: CommandKind::GoogleNews,
        contexts: LIST_ONLY,
    },
    CommandDef {
        name: "offline",
        aliases: &[],
        summary: "Toggle offline mode",
        usage: OFFLINE_USAGE,
        kind: CommandKind::Offline,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "help",
        aliases: &["h"],
        summary: "Show help",
        usage: HELP_USAGE,
        kind: CommandKind::Help,
        contexts: EVERYWHERE,
    },
    CommandDef {
        name: "exit",
        aliases: &["quit"],
        summary: "Exit",
        usage: EXIT_USAGE,
        kind: CommandKind::Exit,
        contexts: EVERYWHERE,
    },
];

/// Commands available in `context`, in table order.
pub fn command_defs(context: ModelContext) -> Vec<&'static CommandDef> {
    COMMAND_DEFS
        .iter()
        .filter(|def| def.is_available_in(context))
        .collect()
}

/// Resolves a command word or alias within `context`.
pub fn resolve_command(word: &str, context: ModelContext) -> Option<&'static CommandDef> {
    COMMAND_DEFS
        .iter()
        .find(|def| def.is_available_in(context) && def.matches(word))
}
