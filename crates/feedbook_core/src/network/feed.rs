//! RSS and Atom feed reading.
//!
//! # Responsibility
//! - Turn fetched feed bytes into item candidates for the active book.
//! - Build the Google News search feed link for keyword queries.
//!
//! # Invariants
//! - Item text is single-line and truncated to the entry field limits.
//! - Items keep document order; nothing is deduplicated here.

use crate::model::entry::{EntryValidationError, Link, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::network::page::clean_text;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

const GOOGLE_NEWS_FEED: &str = "https://news.google.com/rss";
const GOOGLE_NEWS_SEARCH: &str = "https://news.google.com/rss/search";

static MARKUP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid markup regex"));

/// One `<item>` (RSS) or `<entry>` (Atom) as found in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug)]
pub enum FeedError {
    /// The bytes are not well-formed XML.
    Xml(quick_xml::Error),
    /// Well-formed XML without an `rss`, `feed` or `RDF` root.
    NotAFeed,
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xml(err) => write!(f, "malformed feed: {err}"),
            Self::NotAFeed => write!(f, "document is not an RSS or Atom feed"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Xml(err) => Some(err),
            Self::NotAFeed => None,
        }
    }
}

impl From<quick_xml::Error> for FeedError {
    fn from(value: quick_xml::Error) -> Self {
        Self::Xml(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    Description,
}

/// Reads every item of an RSS 0.9x/2.0, RSS 1.0 (RDF) or Atom document.
///
/// # Errors
/// - `Xml` when the document cannot be tokenized.
/// - `NotAFeed` when no feed root element is present.
pub fn parse_feed(content: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    let mut reader = Reader::from_reader(content);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut is_feed = false;
    let mut items = Vec::new();
    let mut current: Option<Raw> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"rss" | b"feed" | b"RDF" => is_feed = true,
                b"item" | b"entry" => current = Some(Raw::default()),
                b"title" if current.is_some() => field = Some(Field::Title),
                b"link" => {
                    if let Some(item) = current.as_mut() {
                        match alternate_href(&e) {
                            Some(href) => item.set_link(href),
                            None => field = Some(Field::Link),
                        }
                    }
                }
                b"description" | b"summary" if current.is_some() => {
                    field = Some(Field::Description)
                }
                _ => {}
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"link" {
                    if let (Some(item), Some(href)) = (current.as_mut(), alternate_href(&e)) {
                        item.set_link(href);
                    }
                }
            }
            Event::Text(e) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    item.push(field, &e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let (Some(item), Some(field)) = (current.as_mut(), field) {
                    item.push(field, &String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(item) = current.take() {
                        items.push(item.finish());
                    }
                    field = None;
                }
                b"title" | b"link" | b"description" | b"summary" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if is_feed {
        Ok(items)
    } else {
        Err(FeedError::NotAFeed)
    }
}

/// Google News RSS link for `keywords`; the top stories feed when empty.
pub fn google_news_link(keywords: &[String]) -> Result<Link, EntryValidationError> {
    let query = keywords.join(" ");
    if query.trim().is_empty() {
        return Link::parse(GOOGLE_NEWS_FEED);
    }
    let url = Url::parse_with_params(GOOGLE_NEWS_SEARCH, &[("q", query.trim())])
        .map_err(|_| EntryValidationError::InvalidLink(GOOGLE_NEWS_SEARCH.to_string()))?;
    Link::parse(url.as_str())
}

#[derive(Debug, Default)]
struct Raw {
    title: String,
    link: Option<String>,
    link_text: String,
    description: String,
}

impl Raw {
    fn set_link(&mut self, href: String) {
        if self.link.is_none() {
            self.link = Some(href);
        }
    }

    fn push(&mut self, field: Field, text: &str) {
        match field {
            Field::Title => self.title.push_str(text),
            Field::Link => self.link_text.push_str(text),
            Field::Description => self.description.push_str(text),
        }
    }

    fn finish(self) -> FeedItem {
        let link = self
            .link
            .or(Some(self.link_text))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        FeedItem {
            title: clean_text(&strip_markup(&self.title), TITLE_MAX_CHARS),
            link,
            description: clean_text(&strip_markup(&self.description), DESCRIPTION_MAX_CHARS),
        }
    }
}

/// `href` of an Atom link that points at the item itself.
fn alternate_href(element: &BytesStart<'_>) -> Option<String> {
    let href = element.try_get_attribute("href").ok()??;
    let alternate = match element.try_get_attribute("rel").ok()? {
        None => true,
        Some(rel) => rel.unescape_value().ok()? == "alternate",
    };
    if !alternate {
        return None;
    }
    href.unescape_value().ok().map(|value| value.into_owned())
}

fn strip_markup(raw: &str) -> String {
    MARKUP_RE.replace_all(raw, " ").into_owned()
}
