//! Command outcome payloads published to the presentation layer.

use std::fmt::{Display, Formatter};

/// Outcome of a successfully executed command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Human-readable feedback line(s).
    pub feedback: String,
    /// Presentation should show the help listing.
    pub show_help: bool,
    /// Presentation should shut down.
    pub exit: bool,
    /// Per-item outcomes for batch commands; empty otherwise.
    pub batch: Vec<BatchItem>,
}

impl CommandResult {
    pub fn new(feedback: impl Into<String>) -> Self {
        Self {
            feedback: feedback.into(),
            ..Self::default()
        }
    }

    pub fn help(feedback: impl Into<String>) -> Self {
        Self {
            show_help: true,
            ..Self::new(feedback)
        }
    }

    pub fn exit(feedback: impl Into<String>) -> Self {
        Self {
            exit: true,
            ..Self::new(feedback)
        }
    }

    pub fn with_batch(mut self, batch: Vec<BatchItem>) -> Self {
        self.batch = batch;
        self
    }
}

/// One entry's outcome inside `archiveall` / `refreshall`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub title: String,
    pub link: String,
    pub status: BatchStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    Done,
    Skipped(String),
}

impl BatchItem {
    pub fn is_done(&self) -> bool {
        self.status == BatchStatus::Done
    }
}

/// Which stage rejected a submitted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Parse,
    Command,
    Storage,
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse => f.write_str("parse"),
            Self::Command => f.write_str("command"),
            Self::Storage => f.write_str("storage"),
        }
    }
}

/// Displayable snapshot of the most recent engine-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFailure {
    pub kind: FailureKind,
    pub message: String,
}
