//! Document store errors

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    // Request errors
    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Malformed update: {0}")]
    MalformedUpdate(String),

    #[error("Malformed pipeline stage {0}: {1}")]
    MalformedStage(usize, String),

    #[error("Unsupported query operator: {0}")]
    UnsupportedOperator(String),

    #[error("Unsupported pipeline stage: {0}")]
    UnsupportedStage(String),

    // Write errors
    #[error("Cannot increment non-numeric field '{0}'")]
    NonNumericIncrement(String),

    #[error("Duplicate _id {0}")]
    DuplicateKey(String),

    // Backend errors
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::MalformedFilter(_) => "WEFT_STORE_MALFORMED_FILTER",
            StoreError::MalformedUpdate(_) => "WEFT_STORE_MALFORMED_UPDATE",
            StoreError::MalformedStage(_, _) => "WEFT_STORE_MALFORMED_STAGE",
            StoreError::UnsupportedOperator(_) => "WEFT_STORE_UNSUPPORTED_OPERATOR",
            StoreError::UnsupportedStage(_) => "WEFT_STORE_UNSUPPORTED_STAGE",
            StoreError::NonNumericIncrement(_) => "WEFT_STORE_NON_NUMERIC_INCREMENT",
            StoreError::DuplicateKey(_) => "WEFT_STORE_DUPLICATE_KEY",
            StoreError::Unavailable(_) => "WEFT_STORE_UNAVAILABLE",
            StoreError::LockPoisoned => "WEFT_STORE_LOCK_POISONED",
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}
