//! Live capture metrics
//!
//! Cumulative counters (total, per level, per category) are updated at log
//! time, so they are independent of what the bounded buffers still hold.
//! Rates are recomputed on every tick from a one-second rolling window whose
//! records carry their own level.

use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Length of the rolling window and period of the metrics tick
pub const METRICS_WINDOW: Duration = Duration::from_secs(1);

/// Point-in-time metrics published on the `metrics-update` channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_logs: u64,
    /// Entries captured within the last window
    pub logs_per_second: u64,
    pub peak_logs_per_second: u64,
    /// Percentage of error/fatal entries within the last window
    pub error_rate: f64,
    /// Percentage of warn entries within the last window
    pub warning_rate: f64,
    pub logs_by_level: BTreeMap<LogLevel, u64>,
    pub logs_by_category: BTreeMap<String, u64>,
    /// Mean JSON size of captured entries in bytes
    pub average_log_size: f64,
    pub intercepted_logs: u64,
    pub breaker_trips: u64,
}

#[derive(Debug, Clone, Copy)]
struct WindowRecord {
    timestamp_ms: i64,
    level: LogLevel,
}

#[derive(Debug, Default)]
struct AggregatorState {
    window: VecDeque<WindowRecord>,
    by_level: BTreeMap<LogLevel, u64>,
    by_category: BTreeMap<String, u64>,
    size_total: u64,
    logs_per_second: u64,
    peak_logs_per_second: u64,
    error_rate: f64,
    warning_rate: f64,
}

impl AggregatorState {
    fn trim(&mut self, now_ms: i64) {
        let cutoff = now_ms - METRICS_WINDOW.as_millis() as i64;
        while self
            .window
            .front()
            .is_some_and(|record| record.timestamp_ms <= cutoff)
        {
            self.window.pop_front();
        }
    }
}

/// Aggregates metrics for one engine
///
/// # Example
///
/// ```
/// use rust_log_inspector::core::{LogEntry, LogLevel, MetricsAggregator};
///
/// let metrics = MetricsAggregator::new();
/// let entry = LogEntry::new(LogLevel::Error, "db down");
/// metrics.record(&entry);
///
/// let snapshot = metrics.tick(entry.timestamp);
/// assert_eq!(snapshot.total_logs, 1);
/// assert_eq!(snapshot.error_rate, 100.0);
/// ```
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    total_logs: AtomicU64,
    intercepted_logs: AtomicU64,
    breaker_trips: AtomicU64,
    state: Mutex<AggregatorState>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one captured entry
    pub fn record(&self, entry: &LogEntry) {
        self.total_logs.fetch_add(1, Ordering::Relaxed);
        let size = entry.serialized_size() as u64;

        let mut state = self.state.lock();
        state.window.push_back(WindowRecord {
            timestamp_ms: entry.timestamp,
            level: entry.level,
        });
        state.trim(entry.timestamp);
        *state.by_level.entry(entry.level).or_insert(0) += 1;
        if let Some(ref category) = entry.category {
            *state.by_category.entry(category.clone()).or_insert(0) += 1;
        }
        state.size_total += size;
    }

    /// Account for an entry produced by host sink interception
    #[inline]
    pub fn record_intercepted(&self) -> u64 {
        self.intercepted_logs.fetch_add(1, Ordering::Relaxed)
    }

    /// Account for an interception circuit breaker trip; returns the trip count
    /// including this one
    #[inline]
    pub fn record_breaker_trip(&self) -> u64 {
        self.breaker_trips.fetch_add(1, Ordering::Relaxed) + 1
    }

    #[inline]
    pub fn total_logs(&self) -> u64 {
        self.total_logs.load(Ordering::Relaxed)
    }

    /// Recompute window-based rates as of `now_ms` and return a snapshot
    pub fn tick(&self, now_ms: i64) -> Metrics {
        {
            let mut state = self.state.lock();
            state.trim(now_ms);

            let window_len = state.window.len() as u64;
            let errors = state.window.iter().filter(|r| r.level.is_error()).count() as f64;
            let warnings = state
                .window
                .iter()
                .filter(|r| r.level == LogLevel::Warn)
                .count() as f64;
            let divisor = window_len.max(1) as f64;

            state.logs_per_second = window_len;
            state.peak_logs_per_second = state.peak_logs_per_second.max(window_len);
            state.error_rate = errors / divisor * 100.0;
            state.warning_rate = warnings / divisor * 100.0;
        }
        self.snapshot()
    }

    /// Current values without recomputing rates
    pub fn snapshot(&self) -> Metrics {
        let total = self.total_logs();
        let state = self.state.lock();
        Metrics {
            total_logs: total,
            logs_per_second: state.logs_per_second,
            peak_logs_per_second: state.peak_logs_per_second,
            error_rate: state.error_rate,
            warning_rate: state.warning_rate,
            logs_by_level: state.by_level.clone(),
            logs_by_category: state.by_category.clone(),
            average_log_size: if total == 0 {
                0.0
            } else {
                state.size_total as f64 / total as f64
            },
            intercepted_logs: self.intercepted_logs.load(Ordering::Relaxed),
            breaker_trips: self.breaker_trips.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters and the rolling window
    pub fn reset(&self) {
        self.total_logs.store(0, Ordering::Relaxed);
        self.intercepted_logs.store(0, Ordering::Relaxed);
        self.breaker_trips.store(0, Ordering::Relaxed);
        *self.state.lock() = AggregatorState::default();
    }
}
