//! Observable events for weft
//!
//! Events are explicit and typed; the logger only ever sees their string
//! form.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// An entity declaration was registered
    EntityRegistered,
    /// A declaration file could not be loaded
    DeclarationRejected,

    // Synthesis
    /// An update command was synthesized for one entity
    UpdateSynthesized,
    /// A pipeline was rendered for a directive
    PipelineRendered,

    // Persistence
    /// A persist attempt begins
    PersistBegin,
    /// A persist attempt was acknowledged by the store
    PersistCommit,
    /// A lazy persist found nothing to write
    PersistSkipped,
    /// The store rejected a persist; entity state restored
    PersistFailed,
    /// A bulk persist finished
    BulkPersistComplete,
    /// Entities were appended as new documents
    AppendCommit,

    // Loading
    /// Documents were loaded into entities
    LoadComplete,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::EntityRegistered => "ENTITY_REGISTERED",
            Event::DeclarationRejected => "DECLARATION_REJECTED",
            Event::UpdateSynthesized => "UPDATE_SYNTHESIZED",
            Event::PipelineRendered => "PIPELINE_RENDERED",
            Event::PersistBegin => "PERSIST_BEGIN",
            Event::PersistCommit => "PERSIST_COMMIT",
            Event::PersistSkipped => "PERSIST_SKIPPED",
            Event::PersistFailed => "PERSIST_FAILED",
            Event::BulkPersistComplete => "BULK_PERSIST_COMPLETE",
            Event::AppendCommit => "APPEND_COMMIT",
            Event::LoadComplete => "LOAD_COMPLETE",
        }
    }

    /// Default severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PersistFailed => Severity::Error,
            Event::DeclarationRejected => Severity::Warn,
            Event::UpdateSynthesized
            | Event::PipelineRendered
            | Event::PersistBegin
            | Event::PersistSkipped => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Event::PersistCommit.as_str(), "PERSIST_COMMIT");
        assert_eq!(Event::ConfigLoaded.to_string(), "CONFIG_LOADED");
    }

    #[test]
    fn test_hot_path_events_are_trace() {
        assert_eq!(Event::UpdateSynthesized.severity(), Severity::Trace);
        assert_eq!(Event::PersistFailed.severity(), Severity::Error);
        assert_eq!(Event::LoadComplete.severity(), Severity::Info);
    }
}
