// src/motion/event_log.rs - In-memory record of controller events
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRecord {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Cloneable handle onto a bounded event history. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct EventLog {
    inner: Arc<Mutex<VecDeque<EventRecord>>>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<EventRecord>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a message and forward it to tracing.
    pub fn record(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(target: "motion::events", "{}", message);
        let mut entries = self.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(EventRecord {
            timestamp: Utc::now(),
            message,
        });
    }

    pub fn entries(&self) -> Vec<EventRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn last_message(&self) -> Option<String> {
        self.lock().back().map(|e| e.message.clone())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|e| e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stores_and_clears_messages() {
        let log = EventLog::default();
        log.record("Test message 1");
        log.record("Test message 2");
        assert_eq!(log.messages(), vec!["Test message 1", "Test message 2"]);
        assert_eq!(log.last_message().as_deref(), Some("Test message 2"));
        log.clear();
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let log1 = EventLog::default();
        let log2 = log1.clone();
        log1.record("Entry A");
        log2.record("Entry B");
        assert_eq!(log1.messages().len(), 2);
        assert_eq!(log2.messages().len(), 2);
        assert!(log1.contains("Entry B"));
        assert!(log2.contains("Entry A"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = EventLog::new(2);
        log.record("one");
        log.record("two");
        log.record("three");
        assert_eq!(log.messages(), vec!["two", "three"]);
    }
}
