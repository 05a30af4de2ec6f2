//! Session errors

use thiserror::Error;

use crate::entity::EntityError;
use crate::store::StoreError;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Bulk persist mixes collections '{0}' and '{1}'")]
    MixedCollections(String, String),

    #[error("Unexpected store result: {0}")]
    UnexpectedResult(String),
}

impl SessionError {
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Store(e) => e.code(),
            SessionError::Entity(e) => e.code().code(),
            SessionError::MixedCollections(_, _) => "WEFT_SESSION_MIXED_COLLECTIONS",
            SessionError::UnexpectedResult(_) => "WEFT_SESSION_UNEXPECTED_RESULT",
        }
    }
}
