//! Partition selector and reader view preferences.

use std::fmt::{Display, Formatter};

/// Which entry book commands and views currently operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModelContext {
    /// Active reading list.
    #[default]
    List,
    /// Archived entries.
    Archives,
}

impl ModelContext {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Archives => "archives",
        }
    }
}

impl Display for ModelContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a selected entry is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewType {
    /// Load the live page.
    #[default]
    Browser,
    /// Render stored content as readable text.
    Reader,
}

/// Style modifier, meaningful for [`ViewType::Reader`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReaderStyle {
    #[default]
    Default,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewMode {
    pub view_type: ViewType,
    pub style: ReaderStyle,
}

impl ViewMode {
    pub fn browser() -> Self {
        Self {
            view_type: ViewType::Browser,
            style: ReaderStyle::Default,
        }
    }

    pub fn reader(style: ReaderStyle) -> Self {
        Self {
            view_type: ViewType::Reader,
            style,
        }
    }
}

impl Display for ViewMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.view_type, self.style) {
            (ViewType::Browser, _) => f.write_str("browser"),
            (ViewType::Reader, ReaderStyle::Default) => f.write_str("reader"),
            (ViewType::Reader, ReaderStyle::Dark) => f.write_str("reader (dark)"),
        }
    }
}
