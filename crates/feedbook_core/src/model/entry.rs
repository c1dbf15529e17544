//! Entry domain model.
//!
//! # Responsibility
//! - Define the canonical record for one feed article.
//! - Own field-level validation so invalid entries are unrepresentable.
//!
//! # Invariants
//! - `link` is the logical identity: two entries are the same entry iff their
//!   canonical links are equal, regardless of other fields. Scheme and host
//!   case, default ports, an empty path and fragments never tell links apart.
//! - Tags are lowercase ASCII alphanumerics and kept sorted/deduplicated.
//! - `content` is only ever set by fetch-bearing workflows (move/refresh).
//!
//! # See also
//! - crate::model::entry_book

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use url::Url;

pub const TITLE_MAX_CHARS: usize = 256;
pub const DESCRIPTION_MAX_CHARS: usize = 1024;
pub const TAG_MAX_CHARS: usize = 64;

/// Field validation failure for entry construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValidationError {
    BlankTitle,
    TitleTooLong { max: usize },
    MultilineTitle,
    DescriptionTooLong { max: usize },
    MultilineDescription,
    InvalidLink(String),
    InvalidTag(String),
}

impl Display for EntryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "Entry titles must not be blank"),
            Self::TitleTooLong { max } => {
                write!(f, "Entry titles must be at most {max} characters long")
            }
            Self::MultilineTitle => write!(f, "Entry titles must be a single line"),
            Self::DescriptionTooLong { max } => {
                write!(f, "Entry descriptions must be at most {max} characters long")
            }
            Self::MultilineDescription => write!(f, "Entry descriptions must be a single line"),
            Self::InvalidLink(value) => write!(
                f,
                "Invalid link `{value}`: links must be absolute http or https URLs"
            ),
            Self::InvalidTag(value) => write!(
                f,
                "Invalid tag `{value}`: tags must be 1 to {TAG_MAX_CHARS} alphanumeric characters"
            ),
        }
    }
}

impl Error for EntryValidationError {}

/// Non-blank single-line entry title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    pub fn parse(raw: &str) -> Result<Self, EntryValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EntryValidationError::BlankTitle);
        }
        if trimmed.contains(['\n', '\r']) {
            return Err(EntryValidationError::MultilineTitle);
        }
        if trimmed.chars().count() > TITLE_MAX_CHARS {
            return Err(EntryValidationError::TitleTooLong {
                max: TITLE_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fallback title for entries added without one: the link host, or the
    /// link itself when no host can be read.
    pub fn from_link(link: &Link) -> Self {
        let source = link.host().unwrap_or(link.as_str());
        Self(source.chars().take(TITLE_MAX_CHARS).collect())
    }
}

impl Display for Title {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-line description; empty is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Description(String);

impl Description {
    pub fn parse(raw: &str) -> Result<Self, EntryValidationError> {
        let trimmed = raw.trim();
        if trimmed.contains(['\n', '\r']) {
            return Err(EntryValidationError::MultilineDescription);
        }
        if trimmed.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(EntryValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Description {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Absolute http(s) URL used as entry identity, stored in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link(Url);

impl Link {
    pub fn parse(raw: &str) -> Result<Self, EntryValidationError> {
        let trimmed = raw.trim();
        let invalid = || EntryValidationError::InvalidLink(trimmed.to_string());
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(invalid());
        }
        let mut url = Url::parse(trimmed).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(invalid());
        }
        url.set_fragment(None);
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Lowercase host component, without userinfo or port.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl Display for Link {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Normalized lowercase alphanumeric label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn parse(raw: &str) -> Result<Self, EntryValidationError> {
        let trimmed = raw.trim();
        let valid = !trimmed.is_empty()
            && trimmed.chars().count() <= TAG_MAX_CHARS
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(EntryValidationError::InvalidTag(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Derives a tag from a link host by dropping every non-alphanumeric
    /// character, e.g. `news.example.com` -> `newsexamplecom`.
    pub fn from_link_host(link: &Link) -> Option<Self> {
        let host = link.host()?;
        let normalized = host
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .take(TAG_MAX_CHARS)
            .collect::<String>();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parses and normalizes raw tag values into a sorted set.
pub fn parse_tags<I, S>(values: I) -> Result<BTreeSet<Tag>, EntryValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| Tag::parse(value.as_ref()))
        .collect()
}

/// One tracked feed article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub title: Title,
    pub description: Description,
    /// Logical identity; see [`Entry::is_same_entry`].
    pub link: Link,
    pub tags: BTreeSet<Tag>,
    /// Raw article bytes captured by the last successful fetch.
    pub content: Option<Vec<u8>>,
    pub read: bool,
}

impl Entry {
    /// Creates an unread entry without fetched content.
    pub fn new(title: Title, description: Description, link: Link, tags: BTreeSet<Tag>) -> Self {
        Self {
            title,
            description,
            link,
            tags,
            content: None,
            read: false,
        }
    }

    /// Identity check used for uniqueness, weaker than `==`.
    pub fn is_same_entry(&self, other: &Entry) -> bool {
        self.link == other.link
    }

    /// Returns this entry carrying `content` in place of any previous bytes.
    pub fn with_content(mut self, content: Option<Vec<u8>>) -> Self {
        self.content = content;
        self
    }

    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} Link: {}", self.title, self.link)?;
        if !self.description.is_empty() {
            write!(f, " Description: {}", self.description)?;
        }
        f.write_str(" Tags: ")?;
        for tag in &self.tags {
            write!(f, "[{tag}]")?;
        }
        Ok(())
    }
}
