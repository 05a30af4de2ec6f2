//! Sort errors
//!
//! Error codes:
//! - WEFT_SORT_INVALID_SPEC (REJECT)
//! - WEFT_SORT_INVALID_DIRECTION (REJECT)
//!
//! Both are configuration defects raised when a sort is built from an
//! untyped document.

use std::fmt;

/// Sort-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortErrorCode {
    /// The sort source is not a document
    WeftSortInvalidSpec,
    /// A direction other than 1 or -1
    WeftSortInvalidDirection,
}

impl SortErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SortErrorCode::WeftSortInvalidSpec => "WEFT_SORT_INVALID_SPEC",
            SortErrorCode::WeftSortInvalidDirection => "WEFT_SORT_INVALID_DIRECTION",
        }
    }
}

impl fmt::Display for SortErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct SortError {
    code: SortErrorCode,
    message: String,
}

impl SortError {
    pub fn invalid_spec(found: &str) -> Self {
        Self {
            code: SortErrorCode::WeftSortInvalidSpec,
            message: format!("sort specification must be a document, found {}", found),
        }
    }

    pub fn invalid_direction(field: &str, found: &serde_json::Value) -> Self {
        Self {
            code: SortErrorCode::WeftSortInvalidDirection,
            message: format!("sort direction for '{}' must be 1 or -1, found {}", field, found),
        }
    }

    pub fn code(&self) -> SortErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REJECT] {}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SortError {}

pub type SortResult<T> = Result<T, SortError>;
