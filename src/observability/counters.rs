//! Source counters.
//!
//! # Counters
//! - `batches_received`: requests that deserialized successfully
//! - `events_received`: events in those requests
//! - `batches_accepted`: batches the channel took
//! - `events_accepted`: events in those batches

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::observability::metrics;

/// Point-in-time copy of a [`SourceCounter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub batches_received: u64,
    pub events_received: u64,
    pub batches_accepted: u64,
    pub events_accepted: u64,
    /// Milliseconds since the epoch of the last start, 0 if never started.
    pub start_time_ms: u64,
    /// Milliseconds since the epoch of the last stop, 0 if never stopped.
    pub stop_time_ms: u64,
}

impl std::fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "batches received={} accepted={}, events received={} accepted={}",
            self.batches_received, self.batches_accepted, self.events_received, self.events_accepted
        )
    }
}

/// Monotonic, thread-safe counters for one source.
#[derive(Debug)]
pub struct SourceCounter {
    /// Metric label; follows the source name across reconfigures.
    name: RwLock<String>,
    batches_received: AtomicU64,
    events_received: AtomicU64,
    batches_accepted: AtomicU64,
    events_accepted: AtomicU64,
    start_time_ms: AtomicU64,
    stop_time_ms: AtomicU64,
    running: AtomicBool,
    /// Snapshot taken at the last stop.
    frozen: Mutex<Option<CounterSnapshot>>,
}

impl SourceCounter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: RwLock::new(name.into()),
            batches_received: AtomicU64::new(0),
            events_received: AtomicU64::new(0),
            batches_accepted: AtomicU64::new(0),
            events_accepted: AtomicU64::new(0),
            start_time_ms: AtomicU64::new(0),
            stop_time_ms: AtomicU64::new(0),
            running: AtomicBool::new(false),
            frozen: Mutex::new(None),
        }
    }

    pub fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Relabel future metric updates. Values are kept.
    pub fn rename(&self, name: &str) {
        let mut current = self.name.write().unwrap_or_else(PoisonError::into_inner);
        if *current != name {
            tracing::info!(from = %*current, to = %name, "Source counters renamed");
            *current = name.to_string();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Mark the counters as live. Values carry over from earlier runs.
    pub fn start(&self) {
        self.start_time_ms.store(now_ms(), Ordering::SeqCst);
        self.stop_time_ms.store(0, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        if let Ok(mut frozen) = self.frozen.lock() {
            *frozen = None;
        }
    }

    /// Freeze the current values for reporting. No-op when not running.
    pub fn stop(&self) -> CounterSnapshot {
        if self.running.swap(false, Ordering::SeqCst) {
            self.stop_time_ms.store(now_ms(), Ordering::SeqCst);
            let snapshot = self.read();
            if let Ok(mut frozen) = self.frozen.lock() {
                *frozen = Some(snapshot);
            }
            snapshot
        } else {
            self.snapshot()
        }
    }

    /// Snapshot frozen at the last stop, if stopped since the last start.
    pub fn frozen(&self) -> Option<CounterSnapshot> {
        self.frozen.lock().ok().and_then(|frozen| *frozen)
    }

    /// Current values.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.frozen().unwrap_or_else(|| self.read())
    }

    pub fn record_batch_received(&self, events: u64) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
        self.events_received.fetch_add(events, Ordering::Relaxed);
        metrics::record_batch_received(&self.name(), events);
    }

    pub fn record_batch_accepted(&self, events: u64) {
        self.batches_accepted.fetch_add(1, Ordering::Relaxed);
        self.events_accepted.fetch_add(events, Ordering::Relaxed);
        metrics::record_batch_accepted(&self.name(), events);
    }

    pub fn batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn batches_accepted(&self) -> u64 {
        self.batches_accepted.load(Ordering::Relaxed)
    }

    pub fn events_accepted(&self) -> u64 {
        self.events_accepted.load(Ordering::Relaxed)
    }

    fn read(&self) -> CounterSnapshot {
        CounterSnapshot {
            batches_received: self.batches_received(),
            events_received: self.events_received(),
            batches_accepted: self.batches_accepted(),
            events_accepted: self.events_accepted(),
            start_time_ms: self.start_time_ms.load(Ordering::SeqCst),
            stop_time_ms: self.stop_time_ms.load(Ordering::SeqCst),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn received_and_accepted_tracked_separately() {
        let counter = SourceCounter::new("test");
        counter.record_batch_received(3);
        counter.record_batch_received(0);
        counter.record_batch_accepted(3);

        let snap = counter.snapshot();
        assert_eq!(snap.batches_received, 2);
        assert_eq!(snap.events_received, 3);
        assert_eq!(snap.batches_accepted, 1);
        assert_eq!(snap.events_accepted, 3);
    }

    #[test]
    fn stop_freezes_without_reset() {
        let counter = SourceCounter::new("test");
        counter.start();
        counter.record_batch_received(2);

        let frozen = counter.stop();
        assert!(!counter.is_running());
        assert_eq!(frozen.batches_received, 1);
        assert!(frozen.stop_time_ms >= frozen.start_time_ms);

        // a second stop reports the same values
        assert_eq!(counter.stop(), frozen);

        counter.start();
        assert!(counter.frozen().is_none());
        assert_eq!(counter.snapshot().events_received, 2);
    }

    #[test]
    fn rename_keeps_values() {
        let counter = SourceCounter::new("orders");
        counter.record_batch_accepted(4);
        counter.rename("payments");

        assert_eq!(counter.name(), "payments");
        assert_eq!(counter.events_accepted(), 4);
    }

    #[test]
    fn concurrent_increments_not_lost() {
        let counter = Arc::new(SourceCounter::new("test"));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.record_batch_received(2);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(counter.batches_received(), 8000);
        assert_eq!(counter.events_received(), 16000);
    }
}
