//! Command-line grammar for entry commands.
//!
//! # Responsibility
//! - Turn one raw input line into a typed [`Command`] for a given context.
//! - Report malformed input as [`ParseError`] without touching any state.
//!
//! # Invariants
//! - Command words resolve only against the table of the current context;
//!   a word valid only elsewhere is an unknown command.
//! - Entry fields validate in the order title, description, link, tags and
//!   the first failure is reported.
//!
//! # See also
//! - `command_table` for every word, alias and usage string.
//! - `crate::command::Command` for what each parsed line becomes.

mod arguments;
pub mod command_table;
pub mod fields;
pub mod tokenizer;

use crate::command::Command;
use crate::model::context::ModelContext;
use crate::model::entry::EntryValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use command_table::{command_defs, resolve_command, CommandDef, CommandKind, HELP_USAGE};

pub type ParseResult<T> = Result<T, ParseError>;

/// Input rejected before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Wrong argument shape; carries the usage text to show.
    InvalidFormat { usage: &'static str },
    /// Word is not a command in this context.
    UnknownCommand { context: ModelContext },
    /// A field value failed validation.
    InvalidField(EntryValidationError),
    /// `edit` without any field to change.
    MissingEditField,
    InvalidViewType(String),
    InvalidOfflineArgument(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFormat { usage } => write!(f, "Invalid command format!\n{usage}"),
            Self::UnknownCommand { context } => {
                write!(f, "Unknown command in context `{context}`")
            }
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::MissingEditField => write!(f, "At least one field to edit must be provided."),
            Self::InvalidViewType(value) => write!(
                f,
                "Unknown view type `{value}`: expected `browser` or `reader`"
            ),
            Self::InvalidOfflineArgument(value) => write!(
                f,
                "Unknown offline argument `{value}`: expected `enable` or `disable`"
            ),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            _ => None,
        }
    }
}

impl From<EntryValidationError> for ParseError {
    fn from(value: EntryValidationError) -> Self {
        Self::InvalidField(value)
    }
}

/// Parses one input line in `context`.
///
/// # Errors
/// - `InvalidFormat` with the help usage for blank input.
/// - `UnknownCommand` when the first word is not in the context's table.
/// - Argument errors from the resolved command's parser.
pub fn parse(raw: &str, context: ModelContext) -> ParseResult<Command> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidFormat { usage: HELP_USAGE });
    }
    let (word, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    let def = resolve_command(word, context).ok_or(ParseError::UnknownCommand { context })?;
    arguments::parse_arguments(def, rest)
}
