//! Observability subsystem for weft
//!
//! - Structured one-line JSON logs with a process-wide severity threshold
//! - Typed events
//! - Atomic counters
//!
//! # Principles
//!
//! 1. Observability is read-only: it never changes what gets synthesized
//! 2. A failed log write never fails the caller
//! 3. Deterministic output (sorted field keys)
//!
//! # Usage
//!
//! ```ignore
//! use weft::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::PersistCommit, &[("collection", "users")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_persists();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log an event at its default severity
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log an event at its default severity with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event_with_fields(Event::PersistFailed, &[("reason", "duplicate key")]);
    }
}
