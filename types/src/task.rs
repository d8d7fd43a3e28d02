//! Task index type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential task number, assigned from zero at creation and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskIndex(u32);

impl TaskIndex {
    pub const FIRST: Self = Self(0);

    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// The index after this one, or `None` once the index space is used up.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for TaskIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(TaskIndex::FIRST.next(), Some(TaskIndex::new(1)));
    }

    #[test]
    fn next_stops_at_max() {
        assert_eq!(TaskIndex::new(u32::MAX).next(), None);
    }
}
