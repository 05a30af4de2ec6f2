//! Entity update state
//!
//! ```text
//! New (unidentified, pending) --persist--> Persisted
//! Persisted --mutate--> PersistedPending --persist--> Persisted
//! load -----------------------------------> Persisted
//! ```
//!
//! `should_persist` is false only in `Persisted`.

/// Observable lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPhase {
    New,
    Persisted,
    PersistedPending,
}

impl EntityPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPhase::New => "new",
            EntityPhase::Persisted => "persisted",
            EntityPhase::PersistedPending => "persisted_pending",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateState {
    has_pending_change: bool,
    is_identified: bool,
}

impl Default for UpdateState {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateState {
    /// A freshly constructed entity: pending and unidentified
    pub fn new() -> Self {
        Self {
            has_pending_change: true,
            is_identified: false,
        }
    }

    /// An entity read from the store
    pub fn loaded() -> Self {
        Self {
            has_pending_change: false,
            is_identified: true,
        }
    }

    pub fn has_pending_change(&self) -> bool {
        self.has_pending_change
    }

    pub fn is_identified(&self) -> bool {
        self.is_identified
    }

    pub fn should_persist(&self) -> bool {
        self.has_pending_change || !self.is_identified
    }

    pub fn mark_changed(&mut self) {
        self.has_pending_change = true;
    }

    /// Identifier assignment and clearing the pending flag happen together
    pub fn mark_persisted(&mut self) {
        self.has_pending_change = false;
        self.is_identified = true;
    }

    pub fn phase(&self) -> EntityPhase {
        match (self.is_identified, self.has_pending_change) {
            (false, _) => EntityPhase::New,
            (true, false) => EntityPhase::Persisted,
            (true, true) => EntityPhase::PersistedPending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut state = UpdateState::new();
        assert_eq!(state.phase(), EntityPhase::New);
        assert!(state.should_persist());

        state.mark_persisted();
        assert_eq!(state.phase(), EntityPhase::Persisted);
        assert!(!state.should_persist());

        state.mark_changed();
        assert_eq!(state.phase(), EntityPhase::PersistedPending);
        assert!(state.should_persist());

        state.mark_persisted();
        assert!(!state.should_persist());
    }

    #[test]
    fn test_loaded_skips_new() {
        let state = UpdateState::loaded();
        assert_eq!(state.phase(), EntityPhase::Persisted);
        assert!(state.is_identified());
        assert!(!state.has_pending_change());
    }
}
