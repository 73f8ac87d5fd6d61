//! Local mirror of the remote sequence collection.

use std::collections::HashSet;

use log::warn;

use crate::model::SequenceSummary;

/// Ordered summaries, in the order the service listed them.
///
/// The cache is only ever replaced wholesale from a confirmed list result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCache {
    items: Vec<SequenceSummary>,
    ids: HashSet<String>,
    /// Refreshes issued but not yet settled
    pending_refreshes: usize,
}

impl SequenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole collection with a fresh list result.
    ///
    /// Duplicate ids keep their first occurrence.
    pub fn replace(&mut self, items: Vec<SequenceSummary>) {
        let mut ids = HashSet::with_capacity(items.len());
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if ids.insert(item.id.clone()) {
                kept.push(item);
            } else {
                warn!("Dropping duplicate sequence id {} from listing", item.id);
            }
        }
        self.items = kept;
        self.ids = ids;
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn get(&self, index: usize) -> Option<&SequenceSummary> {
        self.items.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&SequenceSummary> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn items(&self) -> &[SequenceSummary] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records that a refresh was issued.
    pub fn begin_refresh(&mut self) {
        self.pending_refreshes += 1;
    }

    /// Records that a refresh settled, successfully or not.
    pub fn end_refresh(&mut self) {
        self.pending_refreshes = self.pending_refreshes.saturating_sub(1);
    }

    /// True while at least one refresh is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.pending_refreshes > 0
    }
}
