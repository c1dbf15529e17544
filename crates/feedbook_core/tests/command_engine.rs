use feedbook_core::{
    open_db, open_db_in_memory, BatchStatus, CommandService, EngineError, EntryBookStorage,
    FailureKind, ModelContext, Network, ParseError, SqliteEntryBookRepository,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type Service = CommandService<SqliteEntryBookRepository>;

fn service_with(network: Network) -> Service {
    let repo = SqliteEntryBookRepository::new(open_db_in_memory().unwrap());
    CommandService::open(repo, network).unwrap()
}

fn unreachable_service() -> Service {
    service_with(Network::new(|_: &str| -> Option<Vec<u8>> { None }))
}

fn titles(service: &Service) -> Vec<String> {
    service
        .store()
        .filtered_entries()
        .iter()
        .map(|entry| entry.title.to_string())
        .collect()
}

#[test]
fn archive_with_absent_content_then_unarchive_restores_entry() {
    let mut service = unreachable_service();
    service
        .execute("subscribe t/Alice l/http://a.com")
        .unwrap();

    let result = service.execute("archive 1").unwrap();
    assert!(result.feedback.contains("article content unavailable"));
    assert!(service.store().active_book().is_empty());
    assert!(service.store().filtered_entries().is_empty());

    service.execute("archives").unwrap();
    assert_eq!(service.context(), ModelContext::Archives);
    assert_eq!(titles(&service), ["Alice"]);
    assert_eq!(service.store().archive_book().entries()[0].content, None);

    service.execute("unarchive 1").unwrap();
    assert!(service.store().archive_book().is_empty());
    assert_eq!(service.store().active_book().len(), 1);
    assert_eq!(
        service.store().active_book().entries()[0].link.as_str(),
        "http://a.com/"
    );
}

#[test]
fn archive_stores_fetched_content() {
    let mut service = service_with(Network::new(|url: &str| -> Option<Vec<u8>> {
        Some(format!("<html>{url}</html>").into_bytes())
    }));
    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("archive 1").unwrap();

    let archived = &service.store().archive_book().entries()[0];
    assert_eq!(archived.content.as_deref(), Some(&b"<html>http://a.com/</html>"[..]));
}

#[test]
fn subscribe_derives_host_tag() {
    let mut service = unreachable_service();
    service
        .execute("subscribe t/Title d/Desc l/http://x.com/a.xml")
        .unwrap();
    let entry = &service.store().active_book().entries()[0];
    let tags = entry.tags.iter().map(|tag| tag.as_str()).collect::<Vec<_>>();
    assert_eq!(tags, ["xcom"]);
}

#[test]
fn duplicate_add_fails_and_keeps_size() {
    let mut service = unreachable_service();
    service.execute("subscribe l/http://a.com").unwrap();
    let err = service
        .execute("subscribe t/Other l/http://a.com")
        .unwrap_err();
    assert_eq!(err.to_string(), "This entry already exists in the list");
    assert_eq!(service.store().active_book().len(), 1);

    for spelling in ["subscribe l/HTTP://A.COM/", "subscribe l/http://a.com:80/#latest"] {
        let err = service.execute(spelling).unwrap_err();
        assert_eq!(err.to_string(), "This entry already exists in the list");
    }
    assert_eq!(service.store().active_book().len(), 1);
}

#[test]
fn delete_out_of_range_never_mutates() {
    let mut service = unreachable_service();
    service.execute("subscribe l/http://a.com").unwrap();
    let err = service.execute("delete 2").unwrap_err();
    assert!(matches!(err, EngineError::Command(_)));
    assert_eq!(err.to_string(), "The entry index provided is invalid");
    assert_eq!(service.store().active_book().len(), 1);
}

#[test]
fn find_matching_nothing_leaves_book_unchanged() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Rust Blog l/http://a.com").unwrap();
    service.execute("subscribe t/Go Blog l/http://b.com").unwrap();

    let result = service.execute("find python").unwrap();
    assert_eq!(result.feedback, "0 entries listed!");
    assert!(service.store().filtered_entries().is_empty());
    assert_eq!(service.store().active_book().len(), 2);

    service.execute("find BLOG t/rust").unwrap();
    assert_eq!(titles(&service), ["Rust Blog"]);
}

#[test]
fn index_commands_resolve_against_filtered_view() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Rust l/http://a.com").unwrap();
    service.execute("subscribe t/Go l/http://b.com").unwrap();
    service.execute("find go").unwrap();

    service.execute("delete 1").unwrap();
    service.execute("list").unwrap();
    assert_eq!(titles(&service), ["Rust"]);
}

#[test]
fn edit_collision_fails_and_identical_edit_keeps_position() {
    let mut service = unreachable_service();
    service.execute("subscribe t/First l/http://a.com").unwrap();
    service.execute("subscribe t/Second l/http://b.com").unwrap();

    let err = service.execute("edit 2 l/http://a.com").unwrap_err();
    assert_eq!(err.to_string(), "This entry already exists in the list");
    assert_eq!(titles(&service), ["First", "Second"]);

    service.execute("edit 1 t/First").unwrap();
    assert_eq!(titles(&service), ["First", "Second"]);

    service.execute("edit 1 t/Renamed c/").unwrap();
    assert_eq!(titles(&service), ["Renamed", "Second"]);
    assert!(service.store().active_book().entries()[0].tags.is_empty());
}

#[test]
fn history_counts_parsed_commands_only() {
    let mut service = unreachable_service();
    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("delete 9").unwrap_err();
    service.execute("frobnicate").unwrap_err();
    service.execute("").unwrap_err();
    service.execute("list").unwrap();

    assert_eq!(service.history().len(), 3);
    let result = service.execute("history").unwrap();
    assert_eq!(
        result.feedback,
        "Entered commands (from most recent to earliest):\nlist\ndelete 9\nsubscribe l/http://a.com"
    );
}

#[test]
fn context_specific_commands_follow_the_current_context() {
    let mut service = unreachable_service();
    let err = service.execute("unarchive 1").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Parse(ParseError::UnknownCommand {
            context: ModelContext::List
        })
    ));

    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("archive 1").unwrap();
    service.execute("subscribe l/http://b.com").unwrap();
    service.execute("archives").unwrap();
    assert!(service.execute("archive 1").is_err());

    service.execute("clear").unwrap();
    assert!(service.store().archive_book().is_empty());
    assert_eq!(service.store().active_book().len(), 1);
}

#[test]
fn offline_mode_skips_fetching() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut service = service_with(Network::new(move |_: &str| -> Option<Vec<u8>> {
        counter.fetch_add(1, Ordering::SeqCst);
        Some(b"body".to_vec())
    }));

    service.execute("offline enable").unwrap();
    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("archive 1").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    service.execute("archives").unwrap();
    let err = service.execute("refresh 1").unwrap_err();
    assert_eq!(err.kind(), FailureKind::Command);

    service.execute("offline disable").unwrap();
    service.execute("refresh 1").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        service.store().archive_book().entries()[0].content.as_deref(),
        Some(&b"body"[..])
    );
}

#[test]
fn archive_all_reports_each_entry() {
    let mut service = service_with(Network::new(|url: &str| -> Option<Vec<u8>> {
        url.contains("a.com").then(|| b"a".to_vec())
    }));
    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("subscribe l/http://b.com").unwrap();
    service.execute("subscribe l/http://c.com").unwrap();
    service.execute("archive 3").unwrap();
    service.execute("subscribe l/http://c.com").unwrap();

    let result = service.execute("archiveall").unwrap();
    assert_eq!(result.batch.len(), 3);
    assert!(result.batch[0].is_done());
    assert!(result.batch[1].is_done());
    assert!(matches!(result.batch[2].status, BatchStatus::Skipped(_)));
    assert!(result.feedback.starts_with("Archived 2 of 3 entries"));

    assert_eq!(service.store().active_book().len(), 1);
    assert_eq!(service.store().archive_book().len(), 3);
}

#[test]
fn add_fills_missing_fields_from_page() {
    let mut service = service_with(Network::new(|_: &str| -> Option<Vec<u8>> {
        Some(
            br#"<title>Rust Blog</title><meta name="description" content="Empowering everyone">"#
                .to_vec(),
        )
    }));
    service.execute("add l/https://blog.rust-lang.org/ c/rust").unwrap();

    let entry = &service.store().active_book().entries()[0];
    assert_eq!(entry.title.as_str(), "Rust Blog");
    assert_eq!(entry.description.as_str(), "Empowering everyone");
    assert_eq!(entry.content, None);
    let tags = entry.tags.iter().map(|tag| tag.as_str()).collect::<Vec<_>>();
    assert_eq!(tags, ["rust"]);
}

#[test]
fn add_falls_back_to_host_when_page_is_unreachable() {
    let mut service = unreachable_service();
    service.execute("add l/https://news.example.com/feed").unwrap();
    let entry = &service.store().active_book().entries()[0];
    assert_eq!(entry.title.as_str(), "news.example.com");
    assert!(entry.description.is_empty());
    assert!(entry.tags.is_empty());
}

#[test]
fn select_marks_entry_read_and_view_mode_changes() {
    let mut service = unreachable_service();
    service.execute("subscribe l/http://a.com").unwrap();
    service.execute("select 1").unwrap();

    let selected = service.store().selected_entry().get().clone().unwrap();
    assert!(selected.read);
    assert!(service.store().active_book().entries()[0].read);

    service.execute("view reader").unwrap();
    assert_eq!(service.store().view_mode().get().to_string(), "reader");
    service.execute("delete 1").unwrap();
    assert!(service.store().selected_entry().get().is_none());
}

#[test]
fn books_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.sqlite3");
    let offline = || Network::with_offline(|_: &str| -> Option<Vec<u8>> { None }, true);

    {
        let repo = SqliteEntryBookRepository::new(open_db(&path).unwrap());
        let mut service = CommandService::open(repo, offline()).unwrap();
        service.execute("subscribe t/Kept l/http://a.com c/x").unwrap();
        service.execute("subscribe t/Moved l/http://b.com").unwrap();
        service.execute("archive 2").unwrap();
    }

    let repo = SqliteEntryBookRepository::new(open_db(&path).unwrap());
    let stored = repo.load_books().unwrap().unwrap();
    assert_eq!(stored.active.len(), 1);
    assert_eq!(stored.archive.len(), 1);

    let service = CommandService::open(repo, offline()).unwrap();
    assert_eq!(service.context(), ModelContext::List);
    assert_eq!(titles(&service), ["Kept"]);
}

#[test]
fn filtered_list_subscribers_see_every_update() {
    let mut service = unreachable_service();
    let seen = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&seen);
    let id = service
        .store()
        .filtered_entry_list()
        .subscribe(move |entries| sink.store(entries.len(), Ordering::SeqCst));
    let revision = service.store().filtered_entry_list().revision();

    service.execute("subscribe l/http://a.com").unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(service.store().filtered_entry_list().revision() > revision);

    assert!(service.store().filtered_entry_list().unsubscribe(id));
    service.execute("subscribe l/http://b.com").unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn link_edit_keeps_the_selection() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Moving l/http://a.com").unwrap();
    service.execute("select 1").unwrap();

    service.execute("edit 1 l/http://b.com").unwrap();

    let selected = service.store().selected_entry().get().clone().unwrap();
    assert_eq!(selected.link.as_str(), "http://b.com/");
    assert!(selected.read);
}

#[test]
fn unarchive_into_a_list_that_has_the_link_fails() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Old l/http://a.com").unwrap();
    service.execute("archive 1").unwrap();
    service.execute("subscribe t/New l/http://a.com").unwrap();
    service.execute("archives").unwrap();

    let err = service.execute("unarchive 1").unwrap_err();
    assert_eq!(err.to_string(), "This entry already exists in the list");
    assert_eq!(service.store().archive_book().len(), 1);
    assert_eq!(service.store().active_book().len(), 1);
    assert_eq!(service.store().active_book().entries()[0].title.as_str(), "New");
}

#[test]
fn refresh_all_isolates_failures_per_entry() {
    let mut service = service_with(Network::new(|url: &str| -> Option<Vec<u8>> {
        url.contains("a.com").then(|| b"fresh".to_vec())
    }));
    service.execute("subscribe t/Up l/http://a.com").unwrap();
    service.execute("subscribe t/Down l/http://b.com").unwrap();

    let result = service.execute("refreshall").unwrap();
    assert_eq!(
        result.feedback,
        "Refreshed 1 of 2 entries\nSkipped Down: article content unavailable"
    );
    let entries = service.store().active_book().entries();
    assert_eq!(entries[0].content.as_deref(), Some(&b"fresh"[..]));
    assert_eq!(entries[1].content, None);
}

#[test]
fn refresh_in_list_context_stores_content() {
    let mut service = service_with(Network::new(|_: &str| -> Option<Vec<u8>> {
        Some(b"<p>body</p>".to_vec())
    }));
    service.execute("subscribe t/Live l/http://a.com").unwrap();

    let result = service.execute("refresh 1").unwrap();
    assert_eq!(result.feedback, "Refreshed entry: Live");
    assert_eq!(
        service.store().active_book().entries()[0].content.as_deref(),
        Some(&b"<p>body</p>"[..])
    );
    assert_eq!(service.context(), ModelContext::List);
}

#[test]
fn edit_is_unknown_in_archives() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Kept l/http://a.com").unwrap();
    service.execute("archive 1").unwrap();
    service.execute("archives").unwrap();

    let err = service.execute("edit 1 t/Renamed").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Parse(ParseError::UnknownCommand {
            context: ModelContext::Archives
        })
    ));
    assert_eq!(
        service.store().archive_book().entries()[0].title.as_str(),
        "Kept"
    );
}

const RUST_FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Rust</title>
  <item><title>First post</title><link>https://blog.example.com/1</link>
    <description>One</description></item>
  <item><title>No link</title></item>
  <item><title>Second post</title><link>https://blog.example.com/2</link></item>
</channel></rss>"#;

#[test]
fn feed_loads_new_items_and_skips_known_ones() {
    let mut service = service_with(Network::new(|url: &str| -> Option<Vec<u8>> {
        url.ends_with("/rss").then(|| RUST_FEED.as_bytes().to_vec())
    }));
    service.execute("subscribe t/Known l/https://blog.example.com/2").unwrap();

    let result = service.execute("feed https://feeds.example.com/rss").unwrap();
    assert_eq!(result.batch.len(), 3);
    assert!(result.feedback.starts_with("Loaded 1 of 3 entries"));
    assert!(result.feedback.contains("Skipped No link: item has no link"));
    assert!(result.feedback.contains("Skipped Second post: already in list"));

    assert_eq!(titles(&service), ["Known", "First post"]);
    let loaded = &service.store().active_book().entries()[1];
    assert_eq!(loaded.description.as_str(), "One");
    let tags = loaded.tags.iter().map(|tag| tag.as_str()).collect::<Vec<_>>();
    assert_eq!(tags, ["feedsexamplecom"]);
}

#[test]
fn unreadable_feed_fails_without_changes() {
    let mut service = service_with(Network::new(|url: &str| -> Option<Vec<u8>> {
        url.contains("page").then(|| b"<html><body>hi</body></html>".to_vec())
    }));

    let err = service.execute("feed https://example.com/page").unwrap_err();
    assert_eq!(err.kind(), FailureKind::Command);
    assert!(err.to_string().contains("not a readable feed"));

    let err = service.execute("feed https://example.com/missing").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Could not download the feed at https://example.com/missing"
    );
    assert!(service.store().active_book().is_empty());
}

#[test]
fn google_news_queries_the_search_feed() {
    let requested = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = Arc::clone(&requested);
    let mut service = service_with(Network::new(move |url: &str| -> Option<Vec<u8>> {
        log.lock().unwrap().push(url.to_string());
        Some(RUST_FEED.as_bytes().to_vec())
    }));

    service.execute("gn rust lang").unwrap();
    assert_eq!(
        *requested.lock().unwrap(),
        ["https://news.google.com/rss/search?q=rust+lang"]
    );
    assert_eq!(service.store().active_book().len(), 2);
}

#[test]
fn clear_removes_only_the_displayed_entries() {
    let mut service = unreachable_service();
    service.execute("subscribe t/Rust news l/http://a.com").unwrap();
    service.execute("subscribe t/Go news l/http://b.com").unwrap();
    service.execute("subscribe t/Rust tips l/http://c.com").unwrap();
    service.execute("find rust").unwrap();

    let result = service.execute("clear").unwrap();
    assert_eq!(result.feedback, "Cleared 2 displayed entries");
    assert!(service.store().filtered_entries().is_empty());

    service.execute("list").unwrap();
    assert_eq!(titles(&service), ["Go news"]);
}
