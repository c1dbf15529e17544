//! Execution of each command variant against the store.

use super::{
    AddRequest, BatchItem, BatchStatus, Command, CommandError, CommandHistory, CommandOutcome,
    CommandResult, EditDescriptor,
};
use crate::model::context::{ModelContext, ViewMode};
use crate::model::entry::{Description, Entry, Link, Tag, Title};
use crate::model::entry_book::EntryBookError;
use crate::model::index::Index;
use crate::network::{extract_page_metadata, parse_feed, FeedItem, Network, PageMetadata};
use crate::search::predicate::{EntryPredicate, FindDescriptor};
use crate::store::model_store::ModelStore;
use log::{info, warn};
use std::collections::BTreeSet;

impl Command {
    /// Applies this command to `store`.
    ///
    /// # Errors
    /// - Returns `CommandError` for out-of-range indices, duplicates, wrong
    ///   context or a failed single-entry refresh. The store is unchanged in
    ///   every such case.
    pub fn execute(
        &self,
        store: &mut ModelStore,
        history: &CommandHistory,
        network: &Network,
    ) -> CommandOutcome {
        match self {
            Self::Add(request) => add(store, network, request),
            Self::Subscribe(entry) => subscribe(store, entry),
            Self::Delete(index) => delete(store, *index),
            Self::DeleteAll => {
                require_context(store, ModelContext::List, self.word())?;
                store.clear_active();
                Ok(CommandResult::new("Entry list has been cleared!"))
            }
            Self::ClearArchives => {
                require_context(store, ModelContext::Archives, self.word())?;
                store.clear_archive();
                Ok(CommandResult::new("Archives have been cleared!"))
            }
            Self::ClearList => {
                let removed = store.clear_filtered();
                Ok(CommandResult::new(format!("Cleared {removed} displayed entries")))
            }
            Self::Edit { index, descriptor } => edit(store, *index, descriptor),
            Self::Archive(index) => archive(store, network, *index),
            Self::ArchiveAll => archive_all(store, network),
            Self::Unarchive(index) => unarchive(store, network, *index),
            Self::Find(descriptor) => find(store, descriptor),
            Self::List => {
                store.update_filtered_entry_list(EntryPredicate::All);
                store.set_context(ModelContext::List);
                Ok(CommandResult::new("Listed all entries"))
            }
            Self::Archives => {
                store.update_filtered_entry_list(EntryPredicate::All);
                store.set_context(ModelContext::Archives);
                Ok(CommandResult::new("Listed all archived entries"))
            }
            Self::Select(index) => select(store, *index),
            Self::SetViewMode(view_mode) => set_view_mode(store, *view_mode),
            Self::History => Ok(format_history(history)),
            Self::Refresh(index) => refresh(store, network, *index),
            Self::RefreshAll => refresh_all(store, network),
            Self::Feed(source) | Self::GoogleNews(source) => {
                load_feed(store, network, source, self.word())
            }
            Self::Offline(enabled) => {
                network.set_offline(*enabled);
                Ok(CommandResult::new(if *enabled {
                    "Offline mode enabled"
                } else {
                    "Offline mode disabled"
                }))
            }
            Self::Help => Ok(CommandResult::help("Opened help window.")),
            Self::Exit => Ok(CommandResult::exit("Exiting FeedBook as requested ...")),
        }
    }
}

fn require_context(
    store: &ModelStore,
    expected: ModelContext,
    command: &'static str,
) -> Result<(), CommandError> {
    let context = store.context();
    if context == expected {
        Ok(())
    } else {
        Err(CommandError::InvalidContext { command, context })
    }
}

/// Resolves a displayed-list position to the entry shown there.
fn resolve(store: &ModelStore, index: Index) -> Result<Entry, CommandError> {
    let visible = store.filtered_entries();
    visible
        .get(index.zero_based())
        .cloned()
        .ok_or(CommandError::InvalidIndex {
            index,
            size: visible.len(),
        })
}

fn duplicate_in(context: ModelContext) -> impl Fn(EntryBookError) -> CommandError {
    move |err| match err {
        EntryBookError::Duplicate(link) => CommandError::DuplicateEntry { link, context },
        other => CommandError::Book(other),
    }
}

fn add(store: &mut ModelStore, network: &Network, request: &AddRequest) -> CommandOutcome {
    require_context(store, ModelContext::List, "add")?;
    if store
        .active_book()
        .iter()
        .any(|existing| existing.link == request.link)
    {
        return Err(CommandError::DuplicateEntry {
            link: request.link.clone(),
            context: ModelContext::List,
        });
    }

    let metadata = if request.title.is_none() || request.description.is_none() {
        network
            .fetch_article(&request.link)
            .map(|content| extract_page_metadata(&content))
            .unwrap_or_default()
    } else {
        PageMetadata::default()
    };

    let title = request
        .title
        .clone()
        .or_else(|| metadata.title.and_then(|value| Title::parse(&value).ok()))
        .unwrap_or_else(|| Title::from_link(&request.link));
    let description = request
        .description
        .clone()
        .or_else(|| {
            metadata
                .description
                .and_then(|value| Description::parse(&value).ok())
        })
        .unwrap_or_default();

    let entry = Entry::new(
        title,
        description,
        request.link.clone(),
        request.tags.clone(),
    );
    store
        .add_entry(entry.clone())
        .map_err(duplicate_in(ModelContext::List))?;
    Ok(CommandResult::new(format!("New entry added: {entry}")))
}

fn subscribe(store: &mut ModelStore, entry: &Entry) -> CommandOutcome {
    require_context(store, ModelContext::List, "subscribe")?;
    store
        .add_entry(entry.clone())
        .map_err(duplicate_in(ModelContext::List))?;
    Ok(CommandResult::new(format!("New entry subscribed: {entry}")))
}

fn delete(store: &mut ModelStore, index: Index) -> CommandOutcome {
    let target = resolve(store, index)?;
    store.delete_entry(&target)?;
    Ok(CommandResult::new(format!("Deleted entry: {target}")))
}

fn edit(store: &mut ModelStore, index: Index, descriptor: &EditDescriptor) -> CommandOutcome {
    require_context(store, ModelContext::List, "edit")?;
    let target = resolve(store, index)?;
    let edited = descriptor.apply(&target);
    if !target.is_same_entry(&edited) && store.has_entry(&edited) {
        return Err(CommandError::DuplicateEntry {
            link: edited.link,
            context: ModelContext::List,
        });
    }
    store
        .set_entry(&target, edited.clone())
        .map_err(duplicate_in(ModelContext::List))?;
    Ok(CommandResult::new(format!("Edited entry: {edited}")))
}

fn archive(store: &mut ModelStore, network: &Network, index: Index) -> CommandOutcome {
    require_context(store, ModelContext::List, "archive")?;
    let target = resolve(store, index)?;
    if store.archive_book().contains(&target) {
        return Err(CommandError::DuplicateEntry {
            link: target.link,
            context: ModelContext::Archives,
        });
    }

    let content = network.fetch_article(&target.link);
    let has_content = content.is_some();
    store
        .archive_entry(&target, content)
        .map_err(duplicate_in(ModelContext::Archives))?;
    Ok(CommandResult::new(format!(
        "Entry archived: {target}{}",
        content_note(has_content)
    )))
}

fn archive_all(store: &mut ModelStore, network: &Network) -> CommandOutcome {
    require_context(store, ModelContext::List, "archiveall")?;
    let targets = store.active_book().entries().to_vec();
    let mut batch = Vec::with_capacity(targets.len());

    for target in &targets {
        let status = if store.archive_book().contains(target) {
            BatchStatus::Skipped("already in archives".to_string())
        } else {
            let content = network.fetch_article(&target.link);
            match store.archive_entry(target, content) {
                Ok(()) => BatchStatus::Done,
                Err(err) => {
                    warn!("event=archive_all module=command status=item_skipped error={err}");
                    BatchStatus::Skipped(err.to_string())
                }
            }
        };
        batch.push(batch_item(target, status));
    }

    Ok(CommandResult::new(batch_summary("Archived", &batch)).with_batch(batch))
}

fn unarchive(store: &mut ModelStore, network: &Network, index: Index) -> CommandOutcome {
    require_context(store, ModelContext::Archives, "unarchive")?;
    let target = resolve(store, index)?;
    if store.active_book().contains(&target) {
        return Err(CommandError::DuplicateEntry {
            link: target.link,
            context: ModelContext::List,
        });
    }

    let content = network.fetch_article(&target.link);
    let has_content = content.is_some();
    store
        .unarchive_entry(&target, content)
        .map_err(duplicate_in(ModelContext::List))?;
    Ok(CommandResult::new(format!(
        "Entry unarchived: {target}{}",
        content_note(has_content)
    )))
}

fn find(store: &mut ModelStore, descriptor: &FindDescriptor) -> CommandOutcome {
    store.update_filtered_entry_list(EntryPredicate::Matches(descriptor.clone()));
    Ok(CommandResult::new(format!(
        "{} entries listed!",
        store.filtered_entries().len()
    )))
}

fn select(store: &mut ModelStore, index: Index) -> CommandOutcome {
    let target = resolve(store, index)?;
    let selected = store.mark_entry_read(&target)?;
    store.set_selected_entry(Some(selected));
    Ok(CommandResult::new(format!("Selected entry: {index}")))
}

fn set_view_mode(store: &mut ModelStore, view_mode: ViewMode) -> CommandOutcome {
    store.set_view_mode(view_mode);
    Ok(CommandResult::new(format!("View mode changed to: {view_mode}")))
}

fn format_history(history: &CommandHistory) -> CommandResult {
    if history.is_empty() {
        return CommandResult::new("You have not yet entered any commands.");
    }
    let lines = history.most_recent_first().collect::<Vec<_>>().join("\n");
    CommandResult::new(format!(
        "Entered commands (from most recent to earliest):\n{lines}"
    ))
}

fn refresh(store: &mut ModelStore, network: &Network, index: Index) -> CommandOutcome {
    let target = resolve(store, index)?;
    let Some(content) = network.fetch_article(&target.link) else {
        return Err(CommandError::RefreshFailed { link: target.link });
    };
    let refreshed = target.clone().with_content(Some(content));
    store.set_entry(&target, refreshed)?;
    Ok(CommandResult::new(format!("Refreshed entry: {}", target.title)))
}

fn refresh_all(store: &mut ModelStore, network: &Network) -> CommandOutcome {
    let targets = match store.context() {
        ModelContext::List => store.active_book().entries().to_vec(),
        ModelContext::Archives => store.archive_book().entries().to_vec(),
    };
    let mut batch = Vec::with_capacity(targets.len());

    for target in &targets {
        let status = match network.fetch_article(&target.link) {
            None => BatchStatus::Skipped("article content unavailable".to_string()),
            Some(content) => {
                let refreshed = target.clone().with_content(Some(content));
                match store.set_entry(target, refreshed) {
                    Ok(()) => BatchStatus::Done,
                    Err(err) => {
                        warn!("event=refresh_all module=command status=item_skipped error={err}");
                        BatchStatus::Skipped(err.to_string())
                    }
                }
            }
        };
        batch.push(batch_item(target, status));
    }

    Ok(CommandResult::new(batch_summary("Refreshed", &batch)).with_batch(batch))
}

/// Adds every item of the feed at `source` to the active book. Items without
/// a usable link, or already listed, are skipped one by one.
fn load_feed(
    store: &mut ModelStore,
    network: &Network,
    source: &Link,
    command: &'static str,
) -> CommandOutcome {
    require_context(store, ModelContext::List, command)?;
    let document = network
        .fetch_article(source)
        .ok_or_else(|| CommandError::FeedUnavailable {
            link: source.clone(),
        })?;
    let items = parse_feed(&document).map_err(|err| CommandError::InvalidFeed {
        link: source.clone(),
        reason: err.to_string(),
    })?;
    info!(
        "event=feed_load module=command status=parsed items={}",
        items.len()
    );

    let tags = Tag::from_link_host(source).into_iter().collect::<BTreeSet<_>>();
    let mut batch = Vec::with_capacity(items.len());
    for item in &items {
        let status = match feed_entry(item, &tags) {
            Err(reason) => BatchStatus::Skipped(reason),
            Ok(entry) => match store.add_entry(entry) {
                Ok(()) => BatchStatus::Done,
                Err(EntryBookError::Duplicate(_)) => {
                    BatchStatus::Skipped("already in list".to_string())
                }
                Err(err) => BatchStatus::Skipped(err.to_string()),
            },
        };
        batch.push(BatchItem {
            title: item
                .title
                .clone()
                .or_else(|| item.link.clone())
                .unwrap_or_else(|| "untitled item".to_string()),
            link: item.link.clone().unwrap_or_default(),
            status,
        });
    }

    Ok(CommandResult::new(batch_summary("Loaded", &batch)).with_batch(batch))
}

fn feed_entry(item: &FeedItem, tags: &BTreeSet<Tag>) -> Result<Entry, String> {
    let raw_link = item.link.as_deref().ok_or("item has no link")?;
    let link = Link::parse(raw_link).map_err(|err| err.to_string())?;
    let title = item
        .title
        .as_deref()
        .and_then(|value| Title::parse(value).ok())
        .unwrap_or_else(|| Title::from_link(&link));
    let description = item
        .description
        .as_deref()
        .and_then(|value| Description::parse(value).ok())
        .unwrap_or_default();
    Ok(Entry::new(title, description, link, tags.clone()))
}

fn batch_item(entry: &Entry, status: BatchStatus) -> BatchItem {
    BatchItem {
        title: entry.title.to_string(),
        link: entry.link.to_string(),
        status,
    }
}

fn batch_summary(verb: &str, batch: &[BatchItem]) -> String {
    let done = batch.iter().filter(|item| item.is_done()).count();
    let mut summary = format!("{verb} {done} of {} entries", batch.len());
    for item in batch {
        if let BatchStatus::Skipped(reason) = &item.status {
            summary.push_str(&format!("\nSkipped {}: {reason}", item.title));
        }
    }
    summary
}

fn content_note(has_content: bool) -> &'static str {
    if has_content {
        ""
    } else {
        " (article content unavailable)"
    }
}
