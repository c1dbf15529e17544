//! Displayed-list position, zero-based internally and one-based for users.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index(usize);

impl Index {
    pub fn from_zero_based(value: usize) -> Self {
        Self(value)
    }

    /// Returns `None` for `0`, which is not a valid user-facing position.
    pub fn from_one_based(value: usize) -> Option<Self> {
        value.checked_sub(1).map(Self)
    }

    pub fn zero_based(self) -> usize {
        self.0
    }

    pub fn one_based(self) -> usize {
        self.0 + 1
    }
}

impl Display for Index {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.one_based())
    }
}

#[cfg(test)]
mod tests {
    use super::Index;

    #[test]
    fn one_based_conversion_rejects_zero() {
        assert!(Index::from_one_based(0).is_none());
        let first = Index::from_one_based(1).unwrap();
        assert_eq!(first.zero_based(), 0);
        assert_eq!(first.to_string(), "1");
    }
}
