//! Prefix-based argument tokenizer.
//!
//! # Invariants
//! - A prefix is recognised only at the start of the argument string or right
//!   after whitespace, so `http://x.com/t/1` never splits on `t/`.
//! - Values run to the next recognised prefix (or end of input) and are
//!   trimmed; repeated prefixes keep every value in input order.

use std::collections::HashMap;

pub const PREFIX_TITLE: &str = "t/";
pub const PREFIX_DESCRIPTION: &str = "d/";
pub const PREFIX_LINK: &str = "l/";
pub const PREFIX_TAG: &str = "c/";
pub const PREFIX_STYLE: &str = "s/";

/// Tokenized arguments: preamble plus values grouped by prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMultimap {
    preamble: String,
    values: HashMap<&'static str, Vec<String>>,
}

impl ArgumentMultimap {
    /// Text before the first recognised prefix, trimmed.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Last value given for `prefix`.
    pub fn value(&self, prefix: &str) -> Option<&str> {
        self.values
            .get(prefix)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Every value given for `prefix`, in input order.
    pub fn all_values(&self, prefix: &str) -> &[String] {
        self.values.get(prefix).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.values.contains_key(prefix)
    }
}

/// Splits `args` on the given prefixes.
pub fn tokenize(args: &str, prefixes: &[&'static str]) -> ArgumentMultimap {
    let padded = format!(" {args}");
    let mut positions = prefixes
        .iter()
        .flat_map(|&prefix| {
            padded
                .match_indices(prefix)
                .filter(|(offset, _)| {
                    padded[..*offset]
                        .chars()
                        .next_back()
                        .is_some_and(char::is_whitespace)
                })
                .map(move |(offset, _)| (offset, prefix))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    positions.sort_by_key(|(offset, _)| *offset);

    let preamble_end = positions.first().map_or(padded.len(), |(offset, _)| *offset);
    let mut multimap = ArgumentMultimap {
        preamble: padded[..preamble_end].trim().to_string(),
        values: HashMap::new(),
    };

    for (position, (offset, prefix)) in positions.iter().enumerate() {
        let start = offset + prefix.len();
        let end = positions
            .get(position + 1)
            .map_or(padded.len(), |(next, _)| *next);
        multimap
            .values
            .entry(*prefix)
            .or_default()
            .push(padded[start..end].trim().to_string());
    }

    multimap
}

#[cfg(test)]
mod tests {
    use super::{tokenize, PREFIX_DESCRIPTION, PREFIX_LINK, PREFIX_TAG, PREFIX_TITLE};

    const ALL: &[&str] = &[PREFIX_TITLE, PREFIX_DESCRIPTION, PREFIX_LINK, PREFIX_TAG];

    #[test]
    fn splits_preamble_and_values() {
        let map = tokenize(" 1 t/New title c/a c/b", ALL);
        assert_eq!(map.preamble(), "1");
        assert_eq!(map.value(PREFIX_TITLE), Some("New title"));
        assert_eq!(map.all_values(PREFIX_TAG), ["a", "b"]);
        assert!(!map.contains(PREFIX_LINK));
    }

    #[test]
    fn prefixes_inside_words_are_not_split() {
        let map = tokenize("l/http://x.com/t/1 t/Title", ALL);
        assert_eq!(map.value(PREFIX_LINK), Some("http://x.com/t/1"));
        assert_eq!(map.value(PREFIX_TITLE), Some("Title"));
    }

    #[test]
    fn last_value_wins_and_empty_values_are_kept() {
        let map = tokenize(" t/First t/Second c/", ALL);
        assert_eq!(map.value(PREFIX_TITLE), Some("Second"));
        assert_eq!(map.all_values(PREFIX_TAG), [""]);
    }
}
