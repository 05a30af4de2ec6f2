//! Predicate errors
//!
//! Error codes:
//! - WEFT_PREDICATE_MALFORMED_COMBINATION (REJECT)
//!
//! All predicate errors are fatal at the point of combination. No partial
//! tree is ever returned.

use std::fmt;

/// Predicate-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateErrorCode {
    /// A value that is not a filter document was combined with a predicate
    WeftPredicateMalformedCombination,
}

impl PredicateErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PredicateErrorCode::WeftPredicateMalformedCombination => {
                "WEFT_PREDICATE_MALFORMED_COMBINATION"
            }
        }
    }

    pub fn severity(&self) -> &'static str {
        "REJECT"
    }
}

impl fmt::Display for PredicateErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct PredicateError {
    code: PredicateErrorCode,
    message: String,
}

impl PredicateError {
    /// A non-document value where a filter document was required
    pub fn malformed(found: &str) -> Self {
        Self {
            code: PredicateErrorCode::WeftPredicateMalformedCombination,
            message: format!("expected a filter document, found {}", found),
        }
    }

    /// A logical operator whose operand list holds a non-document entry
    pub fn malformed_operand(op: &str, index: usize, found: &str) -> Self {
        Self {
            code: PredicateErrorCode::WeftPredicateMalformedCombination,
            message: format!(
                "operand {} of {} must be a filter document, found {}",
                index, op, found
            ),
        }
    }

    pub fn code(&self) -> PredicateErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PredicateError {
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

impl std::error::Error for PredicateError {}

pub type PredicateResult<T> = Result<T, PredicateError>;

/// Names a JSON value's kind for error messages
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
