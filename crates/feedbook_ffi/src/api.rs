//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the command engine to Dart via FRB: submit raw command lines,
//!   read snapshots of the displayed list and presentation state.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One engine per process, serialised behind a `Mutex`. Only the
//!   worker-pool calls (`engine_open`, `engine_execute`) take that lock.
//! - Sync readers only see the published `EngineView`, refreshed after every
//!   open and execute, so they never wait on a network fetch.
//! - Return values are plain owned data; no core types cross the boundary.
//!
//! # See also
//! - `feedbook_core::service::command_service` for the engine itself.

use feedbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_db,
    ping as ping_inner, CommandResult, CommandService, Config, EngineError, Entry,
    HttpArticleFetcher, Network, SqliteEntryBookRepository,
};
use log::{info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};

type Engine = CommandService<SqliteEntryBookRepository>;

static ENGINE: Mutex<Option<Engine>> = Mutex::new(None);
static VIEW: Mutex<Option<EngineView>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Outcome of one submitted command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub ok: bool,
    /// Feedback on success, error message on failure.
    pub message: String,
    /// `parse|command|storage|engine` on failure.
    pub error_kind: Option<String>,
    pub show_help: bool,
    pub exit: bool,
    /// Context after the command ran (`list|archives`).
    pub context: String,
}

/// One row of the displayed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    /// One-based position, as typed in index commands.
    pub index: u32,
    pub title: String,
    pub description: String,
    pub link: String,
    pub tags: Vec<String>,
    pub read: bool,
    pub has_content: bool,
}

/// Failure published by the last command, if it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureItem {
    /// `parse|command|storage`.
    pub kind: String,
    pub message: String,
}

/// Presentation state copied out of the engine after each call.
#[derive(Debug, Clone, Default)]
struct EngineView {
    context: String,
    view_mode: String,
    entries: Vec<EntryItem>,
    selected: Option<EntryItem>,
    last_result: Option<String>,
    last_failure: Option<FailureItem>,
}

/// Opens (or reopens) the engine on the SQLite file at `db_path`.
///
/// # FFI contract
/// - Async on the Dart side (FRB worker pool); performs file IO and loads
///   both books.
/// - Never panics; returns empty string on success and error message on failure.
pub fn engine_open(db_path: String) -> String {
    match open_engine(db_path.trim()) {
        Ok(engine) => {
            let mut guard = lock_engine();
            publish(&engine);
            *guard = Some(engine);
            info!("event=engine_open module=ffi status=ok");
            String::new()
        }
        Err(message) => {
            warn!("event=engine_open module=ffi status=error");
            message
        }
    }
}

fn open_engine(db_path: &str) -> Result<Engine, String> {
    if db_path.is_empty() {
        return Err("db_path cannot be empty".to_string());
    }
    let config = Config::default();
    let fetcher = HttpArticleFetcher::new(config.fetch_timeout(), &config.user_agent())
        .map_err(|err| format!("http client init failed: {err}"))?;
    let conn = open_db(db_path).map_err(|err| format!("database open failed: {err}"))?;
    CommandService::open(
        SqliteEntryBookRepository::new(conn),
        Network::with_offline(fetcher, config.offline),
    )
    .map_err(|err| format!("loading entries failed: {err}"))
}

/// Submits one raw command line.
///
/// # FFI contract
/// - Async on the Dart side (FRB worker pool); may block on article fetches
///   bounded by the fetch timeout, never on the UI isolate.
/// - Never panics; failures are reported in the response envelope.
pub fn engine_execute(line: String) -> CommandResponse {
    let mut guard = lock_engine();
    let Some(engine) = guard.as_mut() else {
        return not_open_response();
    };
    let outcome = engine.execute(&line);
    publish(engine);
    let context = engine.context().to_string();
    match outcome {
        Ok(result) => success_response(result, context),
        Err(err) => failure_response(&err, context),
    }
}

/// Snapshot of the displayed (filtered) list; empty before `engine_open`.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_entries() -> Vec<EntryItem> {
    read_view(|view| view.entries.clone())
}

/// Current context (`list|archives`); empty before `engine_open`.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_context() -> String {
    read_view(|view| view.context.clone())
}

/// Current view mode (`browser|reader|reader (dark)`); empty before
/// `engine_open`.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_view_mode() -> String {
    read_view(|view| view.view_mode.clone())
}

/// Entry opened by the last `select`, with its current list position.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_selected_entry() -> Option<EntryItem> {
    read_view(|view| view.selected.clone())
}

/// Feedback of the most recent successful command.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_last_result() -> Option<String> {
    read_view(|view| view.last_result.clone())
}

/// Failure of the last command; `None` once a later command succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn engine_last_failure() -> Option<FailureItem> {
    read_view(|view| view.last_failure.clone())
}

fn read_view<T: Default>(read: impl FnOnce(&EngineView) -> T) -> T {
    VIEW.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map(read)
        .unwrap_or_default()
}

fn publish(engine: &Engine) {
    let store = engine.store();
    let filtered = store.filtered_entries();
    let selected = store.selected_entry().get().as_ref().and_then(|selected| {
        filtered
            .iter()
            .position(|entry| entry.is_same_entry(selected))
            .map(|position| to_entry_item(position, selected))
    });
    let view = EngineView {
        context: engine.context().to_string(),
        view_mode: store.view_mode().get().to_string(),
        entries: filtered
            .iter()
            .enumerate()
            .map(|(position, entry)| to_entry_item(position, entry))
            .collect(),
        selected,
        last_result: store
            .last_result()
            .get()
            .as_ref()
            .map(|result| result.feedback.clone()),
        last_failure: store
            .last_exception()
            .get()
            .as_ref()
            .map(|failure| FailureItem {
                kind: failure.kind.to_string(),
                message: failure.message.clone(),
            }),
    };
    *VIEW.lock().unwrap_or_else(PoisonError::into_inner) = Some(view);
}

fn lock_engine() -> MutexGuard<'static, Option<Engine>> {
    // Never propagate poisoning across the boundary.
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn success_response(result: CommandResult, context: String) -> CommandResponse {
    CommandResponse {
        ok: true,
        message: result.feedback,
        error_kind: None,
        show_help: result.show_help,
        exit: result.exit,
        context,
    }
}

fn failure_response(err: &EngineError, context: String) -> CommandResponse {
    CommandResponse {
        ok: false,
        message: err.to_string(),
        error_kind: Some(err.kind().to_string()),
        show_help: false,
        exit: false,
        context,
    }
}

fn not_open_response() -> CommandResponse {
    CommandResponse {
        ok: false,
        message: "engine is not open; call engine_open first".to_string(),
        error_kind: Some("engine".to_string()),
        show_help: false,
        exit: false,
        context: String::new(),
    }
}

fn to_entry_item(position: usize, entry: &Entry) -> EntryItem {
    EntryItem {
        index: u32::try_from(position + 1).unwrap_or(u32::MAX),
        title: entry.title.to_string(),
        description: entry.description.to_string(),
        link: entry.link.to_string(),
        tags: entry.tags.iter().map(ToString::to_string).collect(),
        read: entry.read,
        has_content: entry.content.is_some(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, engine_context, engine_entries, engine_execute, engine_last_failure,
        engine_last_result, engine_open, engine_selected_entry, engine_view_mode, init_logging,
        ping,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp".to_string());
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn engine_rejects_empty_path() {
        assert!(!engine_open("  ".to_string()).is_empty());
    }

    // The engine is process-wide, so the whole flow lives in one test.
    #[test]
    fn engine_flow_over_ffi() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("ffi.sqlite3");
        assert_eq!(engine_open(db_path.to_str().unwrap().to_string()), "");

        assert!(engine_execute("offline enable".to_string()).ok);
        let added = engine_execute("subscribe t/Rust l/https://blog.rust-lang.org/".to_string());
        assert!(added.ok, "{}", added.message);
        assert_eq!(added.context, "list");

        let entries = engine_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[0].tags, ["blogrustlangorg"]);

        let failed = engine_execute("unarchive 1".to_string());
        assert!(!failed.ok);
        assert_eq!(failed.error_kind.as_deref(), Some("parse"));
        let failure = engine_last_failure().unwrap();
        assert_eq!(failure.kind, "parse");
        assert_eq!(failure.message, failed.message);

        assert!(engine_selected_entry().is_none());
        assert!(engine_execute("select 1".to_string()).ok);
        assert!(engine_last_failure().is_none());
        assert_eq!(engine_last_result().as_deref(), Some("Selected entry: 1"));
        let selected = engine_selected_entry().unwrap();
        assert_eq!(selected.index, 1);
        assert!(selected.read);

        assert!(engine_execute("archive 1".to_string()).ok);
        assert!(engine_entries().is_empty());
        assert!(engine_execute("archives".to_string()).ok);
        assert_eq!(engine_context(), "archives");
        assert!(!engine_entries()[0].has_content);

        assert!(engine_execute("view reader s/dark".to_string()).ok);
        assert_eq!(engine_view_mode(), "reader (dark)");

        let help = engine_execute("help".to_string());
        assert!(help.show_help);

        // Reopening loads what the previous engine saved.
        assert_eq!(engine_open(db_path.to_str().unwrap().to_string()), "");
        assert_eq!(engine_context(), "list");
        assert!(engine_entries().is_empty());
        assert!(engine_execute("archives".to_string()).ok);
        assert_eq!(engine_entries().len(), 1);
    }
}
