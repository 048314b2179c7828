//! Time-ordered queue of pending messages, drained by musical position.
//!
//! Sinks that cannot schedule ahead on their own (MIDI) push delayed note-ons and
//! all note-offs here, then release whatever is due each time the runtime flushes.

use crate::sequencer::beat::Beat;

/// Pending items sorted by release time. Items sharing a time keep insertion order.
#[derive(Debug, Clone)]
pub struct ReleaseQueue<T> {
    items: Vec<(Beat, T)>,
}

impl<T> ReleaseQueue<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Schedule `item` for release at `at`.
    pub fn push(&mut self, at: Beat, item: T) {
        let pos = self.items.partition_point(|(t, _)| *t <= at);
        self.items.insert(pos, (at, item));
    }

    /// Remove and return every item due strictly before `until`, in time order.
    pub fn drain_until(&mut self, until: Beat) -> Vec<T> {
        let due = self.items.partition_point(|(t, _)| *t < until);
        self.items.drain(..due).map(|(_, item)| item).collect()
    }

    /// Remove and return everything, in time order.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.items.drain(..).map(|(_, item)| item).collect()
    }

    /// Time of the earliest pending item.
    pub fn next_due(&self) -> Option<Beat> {
        self.items.first().map(|(t, _)| *t)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> Default for ReleaseQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
