use polarplot_core::LogEntry;
use tracing::trace;

use super::seen_keys::SeenKeySet;

/// Ordered, append-only command log with first-writer-wins deduplication.
///
/// Entries may arrive from the local dispatcher and from the event stream;
/// whichever delivers a `(timestamp, command, response)` triple first
/// appends it and the other copy is dropped.
#[derive(Debug, Clone)]
pub struct SessionLog {
    entries: Vec<LogEntry>,
    seen: SeenKeySet,
}

impl SessionLog {
    pub fn new(seen_key_capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            seen: SeenKeySet::new(seen_key_capacity),
        }
    }

    /// Append `entry` unless its key was already seen.
    ///
    /// Returns `true` when the entry was appended.
    pub fn merge(&mut self, entry: LogEntry) -> bool {
        if !self.seen.insert(entry.dedup_key()) {
            trace!("Duplicate log entry dropped: {}", entry.command);
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Replace the whole log, e.g. with a fresh copy from the backend.
    ///
    /// The seen keys are rebuilt from the newest entries.
    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.seen.clear();
        let skip = entries.len().saturating_sub(self.seen.capacity());
        for entry in entries.iter().skip(skip) {
            self.seen.insert(entry.dedup_key());
        }
        self.entries = entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.seen.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn seen_keys(&self) -> &SeenKeySet {
        &self.seen
    }
}
