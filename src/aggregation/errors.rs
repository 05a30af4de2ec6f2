//! Aggregation errors
//!
//! Error codes:
//! - WEFT_AGGREGATION_MALFORMED_STAGE (REJECT)

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationErrorCode {
    /// A pipeline entry that is not a single-key document with a known stage name
    WeftAggregationMalformedStage,
}

impl AggregationErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            AggregationErrorCode::WeftAggregationMalformedStage => {
                "WEFT_AGGREGATION_MALFORMED_STAGE"
            }
        }
    }
}

impl fmt::Display for AggregationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct AggregationError {
    code: AggregationErrorCode,
    index: usize,
    message: String,
}

impl AggregationError {
    pub fn malformed_stage(index: usize, reason: impl Into<String>) -> Self {
        Self {
            code: AggregationErrorCode::WeftAggregationMalformedStage,
            index,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> AggregationErrorCode {
        self.code
    }

    /// Position of the offending stage
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[REJECT] {}: stage {}: {}",
            self.code.code(),
            self.index,
            self.message
        )
    }
}

impl std::error::Error for AggregationError {}

pub type AggregationResult<T> = Result<T, AggregationError>;
