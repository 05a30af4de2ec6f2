//! Update command errors
//!
//! Error codes:
//! - WEFT_UPDATE_MALFORMED_COMMAND (REJECT)
//!
//! Synthesis itself never fails; these errors come from re-reading an
//! update document.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateErrorCode {
    /// An update document is not a map of known clauses to documents
    WeftUpdateMalformedCommand,
}

impl UpdateErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            UpdateErrorCode::WeftUpdateMalformedCommand => "WEFT_UPDATE_MALFORMED_COMMAND",
        }
    }

    pub fn severity(&self) -> &'static str {
        "REJECT"
    }
}

impl fmt::Display for UpdateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateError {
    code: UpdateErrorCode,
    message: String,
}

impl UpdateError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self {
            code: UpdateErrorCode::WeftUpdateMalformedCommand,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> UpdateErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for UpdateError {}

pub type UpdateResult<T> = Result<T, UpdateError>;
