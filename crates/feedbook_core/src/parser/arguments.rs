//! Per-command argument parsers.

use super::command_table::{
    CommandDef, CommandKind, ADD_USAGE, EDIT_USAGE, FEED_USAGE, FIND_USAGE, OFFLINE_USAGE,
    SUBSCRIBE_USAGE, VIEW_USAGE,
};
use super::fields::{parse_entry_fields, parse_index};
use super::tokenizer::{
    tokenize, PREFIX_DESCRIPTION, PREFIX_LINK, PREFIX_STYLE, PREFIX_TAG, PREFIX_TITLE,
};
use super::{ParseError, ParseResult};
use crate::command::{AddRequest, Command, EditDescriptor};
use crate::model::context::{ReaderStyle, ViewMode};
use crate::model::entry::{Description, Entry, Link, Tag, Title};
use crate::network::google_news_link;
use crate::search::predicate::FindDescriptor;
use std::collections::BTreeSet;

const ENTRY_PREFIXES: &[&str] = &[PREFIX_TITLE, PREFIX_DESCRIPTION, PREFIX_LINK, PREFIX_TAG];

pub(crate) fn parse_arguments(def: &CommandDef, args: &str) -> ParseResult<Command> {
    match def.kind {
        CommandKind::Add => parse_add(args),
        CommandKind::Subscribe => parse_subscribe(args),
        CommandKind::Delete => parse_index(args, def.usage).map(Command::Delete),
        CommandKind::DeleteAll => Ok(Command::DeleteAll),
        CommandKind::ClearArchives => Ok(Command::ClearArchives),
        CommandKind::ClearList => Ok(Command::ClearList),
        CommandKind::Edit => parse_edit(args),
        CommandKind::Archive => parse_index(args, def.usage).map(Command::Archive),
        CommandKind::ArchiveAll => Ok(Command::ArchiveAll),
        CommandKind::Unarchive => parse_index(args, def.usage).map(Command::Unarchive),
        CommandKind::Find => parse_find(args),
        CommandKind::List => Ok(Command::List),
        CommandKind::Archives => Ok(Command::Archives),
        CommandKind::Select => parse_index(args, def.usage).map(Command::Select),
        CommandKind::View => parse_view(args),
        CommandKind::History => Ok(Command::History),
        CommandKind::Refresh => parse_index(args, def.usage).map(Command::Refresh),
        CommandKind::RefreshAll => Ok(Command::RefreshAll),
        CommandKind::Feed => parse_feed_link(args),
        CommandKind::GoogleNews => {
            let keywords = args.split_whitespace().map(str::to_string).collect::<Vec<_>>();
            Ok(Command::GoogleNews(google_news_link(&keywords)?))
        }
        CommandKind::Offline => parse_offline(args),
        CommandKind::Help => Ok(Command::Help),
        CommandKind::Exit => Ok(Command::Exit),
    }
}

fn parse_add(args: &str) -> ParseResult<Command> {
    let map = tokenize(args, ENTRY_PREFIXES);
    if !map.contains(PREFIX_LINK) || !map.preamble().is_empty() {
        return Err(ParseError::InvalidFormat { usage: ADD_USAGE });
    }
    let fields = parse_entry_fields(&map)?;
    let link = fields
        .link
        .ok_or(ParseError::InvalidFormat { usage: ADD_USAGE })?;
    Ok(Command::Add(AddRequest {
        link,
        title: fields.title,
        description: fields.description,
        tags: fields.tags.unwrap_or_default(),
    }))
}

fn parse_feed_link(args: &str) -> ParseResult<Command> {
    let raw = args.trim();
    if raw.is_empty() {
        return Err(ParseError::InvalidFormat { usage: FEED_USAGE });
    }
    Ok(Command::Feed(Link::parse(raw)?))
}

fn parse_subscribe(args: &str) -> ParseResult<Command> {
    let map = tokenize(args, ENTRY_PREFIXES);
    if !map.contains(PREFIX_LINK) || !map.preamble().is_empty() {
        return Err(ParseError::InvalidFormat {
            usage: SUBSCRIBE_USAGE,
        });
    }
    let fields = parse_entry_fields(&map)?;
    let link = fields.link.ok_or(ParseError::InvalidFormat {
        usage: SUBSCRIBE_USAGE,
    })?;
    let title = fields.title.unwrap_or_else(|| Title::from_link(&link));
    let description = fields.description.unwrap_or_else(Description::empty);
    let tags = fields
        .tags
        .unwrap_or_else(|| Tag::from_link_host(&link).into_iter().collect());
    Ok(Command::Subscribe(Entry::new(title, description, link, tags)))
}

fn parse_edit(args: &str) -> ParseResult<Command> {
    let map = tokenize(args, ENTRY_PREFIXES);
    let index = parse_index(map.preamble(), EDIT_USAGE)?;
    let fields = parse_entry_fields(&map)?;
    let descriptor = EditDescriptor {
        title: fields.title,
        description: fields.description,
        link: fields.link,
        tags: fields.tags,
    };
    if !descriptor.is_any_field_edited() {
        return Err(ParseError::MissingEditField);
    }
    Ok(Command::Edit { index, descriptor })
}

fn parse_find(args: &str) -> ParseResult<Command> {
    let map = tokenize(args, ENTRY_PREFIXES);
    let tags = map
        .all_values(PREFIX_TAG)
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| Tag::parse(value))
        .collect::<Result<BTreeSet<_>, _>>()?;
    let descriptor = FindDescriptor {
        keywords: split_keywords([map.preamble()]),
        title: split_keywords(map.all_values(PREFIX_TITLE)),
        description: split_keywords(map.all_values(PREFIX_DESCRIPTION)),
        link: split_keywords(map.all_values(PREFIX_LINK)),
        tags,
    };
    if descriptor.is_empty() {
        return Err(ParseError::InvalidFormat { usage: FIND_USAGE });
    }
    Ok(Command::Find(descriptor))
}

fn split_keywords<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .flat_map(|value| {
            value
                .as_ref()
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect()
}

fn parse_view(args: &str) -> ParseResult<Command> {
    let map = tokenize(args, &[PREFIX_STYLE]);
    let style = match map.value(PREFIX_STYLE) {
        None => None,
        Some("default") => Some(ReaderStyle::Default),
        Some("dark") => Some(ReaderStyle::Dark),
        Some(_) => return Err(ParseError::InvalidFormat { usage: VIEW_USAGE }),
    };
    match map.preamble() {
        "" => Err(ParseError::InvalidFormat { usage: VIEW_USAGE }),
        "browser" if style.is_some() => Err(ParseError::InvalidFormat { usage: VIEW_USAGE }),
        "browser" => Ok(Command::SetViewMode(ViewMode::browser())),
        "reader" => Ok(Command::SetViewMode(ViewMode::reader(
            style.unwrap_or_default(),
        ))),
        other => Err(ParseError::InvalidViewType(other.to_string())),
    }
}

fn parse_offline(args: &str) -> ParseResult<Command> {
    match args.trim() {
        "" => Err(ParseError::InvalidFormat {
            usage: OFFLINE_USAGE,
        }),
        "enable" => Ok(Command::Offline(true)),
        "disable" => Ok(Command::Offline(false)),
        other => Err(ParseError::InvalidOfflineArgument(other.to_string())),
    }
}
