//! Operator construction errors
//!
//! Error codes:
//! - WEFT_OPERATOR_INVALID_ARGUMENT (REJECT)

use std::fmt;

/// Operator-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorErrorCode {
    /// An argument outside the operator's fixed domain
    WeftOperatorInvalidArgument,
}

impl OperatorErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            OperatorErrorCode::WeftOperatorInvalidArgument => "WEFT_OPERATOR_INVALID_ARGUMENT",
        }
    }
}

impl fmt::Display for OperatorErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Raised when a node cannot be constructed with the given arguments
#[derive(Debug, Clone)]
pub struct OperatorError {
    code: OperatorErrorCode,
    operator: &'static str,
    message: String,
}

impl OperatorError {
    pub fn invalid_argument(operator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: OperatorErrorCode::WeftOperatorInvalidArgument,
            operator,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> OperatorErrorCode {
        self.code
    }

    /// The operator that rejected its arguments
    pub fn operator(&self) -> &'static str {
        self.operator
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[REJECT] {}: {} ({})",
            self.code.code(),
            self.message,
            self.operator
        )
    }
}

impl std::error::Error for OperatorError {}

pub type OperatorResult<T> = Result<T, OperatorError>;
