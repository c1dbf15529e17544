//! Field-level argument parsing shared by the per-command parsers.

use super::tokenizer::{
    ArgumentMultimap, PREFIX_DESCRIPTION, PREFIX_LINK, PREFIX_TAG, PREFIX_TITLE,
};
use super::ParseError;
use crate::model::entry::{parse_tags, Description, Link, Tag, Title};
use crate::model::index::Index;
use std::collections::BTreeSet;

/// Parses a one-based positive index. Any other shape is a format error
/// carrying `usage`.
pub fn parse_index(raw: &str, usage: &'static str) -> Result<Index, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidFormat { usage });
    }
    trimmed
        .parse::<usize>()
        .ok()
        .and_then(Index::from_one_based)
        .ok_or(ParseError::InvalidFormat { usage })
}

/// Entry fields as given on the command line, validated in the order
/// title, description, link, tags.
#[derive(Debug, Default)]
pub(crate) struct EntryFields {
    pub title: Option<Title>,
    pub description: Option<Description>,
    pub link: Option<Link>,
    /// `None` when no tag prefix was given at all.
    pub tags: Option<BTreeSet<Tag>>,
}

pub(crate) fn parse_entry_fields(args: &ArgumentMultimap) -> Result<EntryFields, ParseError> {
    let title = args.value(PREFIX_TITLE).map(Title::parse).transpose()?;
    let description = args
        .value(PREFIX_DESCRIPTION)
        .map(Description::parse)
        .transpose()?;
    let link = args.value(PREFIX_LINK).map(Link::parse).transpose()?;
    let tags = parse_tag_values(args)?;
    Ok(EntryFields {
        title,
        description,
        link,
        tags,
    })
}

/// A tag prefix given exactly once with an empty value clears the set.
fn parse_tag_values(args: &ArgumentMultimap) -> Result<Option<BTreeSet<Tag>>, ParseError> {
    if !args.contains(PREFIX_TAG) {
        return Ok(None);
    }
    match args.all_values(PREFIX_TAG) {
        [only] if only.is_empty() => Ok(Some(BTreeSet::new())),
        values => Ok(Some(parse_tags(values)?)),
    }
}
