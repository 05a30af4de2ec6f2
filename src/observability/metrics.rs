//! Counters for synthesis and persistence activity
//!
//! All counters are atomics and only ever increase. Values are exact.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    updates_synthesized: AtomicU64,
    persists: AtomicU64,
    persists_skipped: AtomicU64,
    persist_failures: AtomicU64,
    documents_loaded: AtomicU64,
    pipelines_rendered: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_updates_synthesized(&self) {
        self.updates_synthesized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persists(&self) {
        self.persists.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persists_skipped(&self) {
        self.persists_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_persist_failures(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_documents_loaded(&self, count: u64) {
        self.documents_loaded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_pipelines_rendered(&self) {
        self.pipelines_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            updates_synthesized: self.updates_synthesized.load(Ordering::Relaxed),
            persists: self.persists.load(Ordering::Relaxed),
            persists_skipped: self.persists_skipped.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
            documents_loaded: self.documents_loaded.load(Ordering::Relaxed),
            pipelines_rendered: self.pipelines_rendered.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        // A struct of plain integers always serializes
        serde_json::to_value(self.snapshot()).unwrap_or_default()
    }
}

/// A point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub updates_synthesized: u64,
    pub persists: u64,
    pub persists_skipped: u64,
    pub persist_failures: u64,
    pub documents_loaded: u64,
    pub pipelines_rendered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_registry_is_zeroed() {
        assert_eq!(MetricsRegistry::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment() {
        let registry = MetricsRegistry::new();
        registry.increment_persists();
        registry.increment_persists();
        registry.increment_persists_skipped();
        registry.increment_persist_failures();
        registry.increment_updates_synthesized();
        registry.add_documents_loaded(7);
        registry.increment_pipelines_rendered();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.persists, 2);
        assert_eq!(snapshot.persists_skipped, 1);
        assert_eq!(snapshot.persist_failures, 1);
        assert_eq!(snapshot.updates_synthesized, 1);
        assert_eq!(snapshot.documents_loaded, 7);
        assert_eq!(snapshot.pipelines_rendered, 1);
    }

    #[test]
    fn test_to_json() {
        let registry = MetricsRegistry::new();
        registry.add_documents_loaded(3);
        let json = registry.to_json();
        assert_eq!(json["documents_loaded"], 3);
        assert_eq!(json["persists"], 0);
    }

    #[test]
    fn test_thread_safety() {
        let registry = Arc::new(MetricsRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = Arc::clone(&registry);
                thread::spawn(move || {
                    for _ in 0..100 {
                        reg.increment_updates_synthesized();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.snapshot().updates_synthesized, 800);
    }
}
