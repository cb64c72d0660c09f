//! Capture buffer: bounded staging FIFO plus bounded, deduplicated history

use super::log_entry::LogEntry;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Default history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 10_000;

/// Staging area for not-yet-flushed entries and archive of flushed ones
///
/// The staging buffer evicts its oldest entry once `max_logs` is exceeded.
/// History only grows through [`CaptureBuffer::merge_into_history`], skips
/// ids it already holds, and evicts its oldest entry beyond its capacity.
#[derive(Debug)]
pub struct CaptureBuffer {
    staging: VecDeque<Arc<LogEntry>>,
    max_logs: usize,
    history: VecDeque<Arc<LogEntry>>,
    history_ids: HashSet<String>,
    history_capacity: usize,
    evicted: u64,
}

impl CaptureBuffer {
    pub fn new(max_logs: usize) -> Self {
        Self::with_history_capacity(max_logs, DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_history_capacity(max_logs: usize, history_capacity: usize) -> Self {
        Self {
            staging: VecDeque::with_capacity(max_logs.min(1024)),
            max_logs: max_logs.max(1),
            history: VecDeque::new(),
            history_ids: HashSet::new(),
            history_capacity: history_capacity.max(1),
            evicted: 0,
        }
    }

    /// Stage an entry, evicting the oldest staged entry when full
    ///
    /// Returns the new staging length.
    pub fn append(&mut self, entry: Arc<LogEntry>) -> usize {
        self.staging.push_back(entry);
        while self.staging.len() > self.max_logs {
            self.staging.pop_front();
            self.evicted += 1;
        }
        self.staging.len()
    }

    /// Empty the staging buffer and return its prior contents, oldest first
    pub fn drain(&mut self) -> Vec<Arc<LogEntry>> {
        self.staging.drain(..).collect()
    }

    /// Append entries to history, skipping ids already archived
    pub fn merge_into_history(&mut self, entries: &[Arc<LogEntry>]) {
        for entry in entries {
            if !self.history_ids.insert(entry.id.clone()) {
                continue;
            }
            self.history.push_back(Arc::clone(entry));
            while self.history.len() > self.history_capacity {
                if let Some(oldest) = self.history.pop_front() {
                    self.history_ids.remove(&oldest.id);
                }
            }
        }
    }

    /// Empty staging and history; metrics are not affected
    pub fn clear(&mut self) {
        self.staging.clear();
        self.history.clear();
        self.history_ids.clear();
    }

    /// History followed by staged entries not yet archived
    pub fn snapshot(&self) -> Vec<Arc<LogEntry>> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.history.len() + self.staging.len());
        let mut entries = Vec::with_capacity(self.history.len() + self.staging.len());
        for entry in self.history.iter().chain(self.staging.iter()) {
            if seen.insert(entry.id.as_str()) {
                entries.push(Arc::clone(entry));
            }
        }
        entries
    }

    /// Change the staging capacity, evicting the oldest entries if needed
    pub fn set_max_logs(&mut self, max_logs: usize) {
        self.max_logs = max_logs.max(1);
        while self.staging.len() > self.max_logs {
            self.staging.pop_front();
            self.evicted += 1;
        }
    }

    pub fn max_logs(&self) -> usize {
        self.max_logs
    }

    pub fn staged(&self) -> impl Iterator<Item = &Arc<LogEntry>> {
        self.staging.iter()
    }

    pub fn staged_len(&self) -> usize {
        self.staging.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Entries dropped from staging by FIFO eviction so far
    pub fn evicted_count(&self) -> u64 {
        self.evicted
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new(super::config::DEFAULT_MAX_LOGS)
    }
}
