//! Bounded calculation history
//!
//! [`HistoryLog`] is the session's working memory: an ordered, size-bounded
//! list of [`Calculation`]s, oldest first. When an append pushes it past
//! its maximum size the oldest entries are evicted.
//!
//! The log converts losslessly to and from CSV (see [`tabular`]) and is
//! persisted through a [`HistoryStore`].

use crate::calculation::Calculation;
use crate::memento::Snapshot;
use std::collections::VecDeque;

pub mod store;
pub mod tabular;

pub use store::{write_atomically, HistoryStore};
pub use tabular::{HistoryRow, HISTORY_COLUMNS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    records: VecDeque<Calculation>,
    max_size: usize,
}

impl HistoryLog {
    /// Create an empty log holding at most `max_size` records.
    ///
    /// A log always has room for at least one record, so a `max_size` of
    /// zero is raised to one. Callers that take the size from user input
    /// should reject zero first, as [`crate::config::CalculatorConfig::validate`]
    /// does.
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Add a record at the tail, evicting from the head to stay in bounds.
    ///
    /// Returns the number of evicted records.
    pub fn append(&mut self, record: Calculation) -> usize {
        self.records.push_back(record);
        self.enforce_bound()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Calculation> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Calculation> {
        self.records.get(index)
    }

    pub fn latest(&self) -> Option<&Calculation> {
        self.records.back()
    }

    /// Independent copy of the current contents
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.records.iter().cloned().collect())
    }

    /// Replace the contents with a copy of `snapshot`, leaving it untouched
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.records = snapshot.records().iter().cloned().collect();
        self.enforce_bound();
    }

    /// One `op(a, b) = result` line per record, oldest first
    pub fn display_lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    fn enforce_bound(&mut self) -> usize {
        let mut evicted = 0;
        while self.records.len() > self.max_size {
            self.records.pop_front();
            evicted += 1;
        }
        evicted
    }
}

impl<'a> IntoIterator for &'a HistoryLog {
    type Item = &'a Calculation;
    type IntoIter = std::collections::vec_deque::Iter<'a, Calculation>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
