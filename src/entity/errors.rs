//! Entity record errors
//!
//! Error codes:
//! - WEFT_ENTITY_UNKNOWN_FIELD (REJECT)
//! - WEFT_ENTITY_COUNTER_ASSIGNMENT (REJECT)
//! - WEFT_ENTITY_NOT_A_COUNTER (REJECT)
//! - WEFT_ENTITY_RESERVED_FIELD (REJECT)
//! - WEFT_ENTITY_MALFORMED_DOCUMENT (REJECT)
//!
//! A rejected mutation leaves the entity unchanged.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityErrorCode {
    /// The field is not declared on the entity
    WeftEntityUnknownField,
    /// A counter was assigned directly instead of incremented
    WeftEntityCounterAssignment,
    /// An increment targeted a field without the increment role
    WeftEntityNotACounter,
    /// An extension field used `_id` or the version key
    WeftEntityReservedField,
    /// A stored document could not be mapped onto the entity
    WeftEntityMalformedDocument,
}

impl EntityErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            EntityErrorCode::WeftEntityUnknownField => "WEFT_ENTITY_UNKNOWN_FIELD",
            EntityErrorCode::WeftEntityCounterAssignment => "WEFT_ENTITY_COUNTER_ASSIGNMENT",
            EntityErrorCode::WeftEntityNotACounter => "WEFT_ENTITY_NOT_A_COUNTER",
            EntityErrorCode::WeftEntityReservedField => "WEFT_ENTITY_RESERVED_FIELD",
            EntityErrorCode::WeftEntityMalformedDocument => "WEFT_ENTITY_MALFORMED_DOCUMENT",
        }
    }

    pub fn severity(&self) -> &'static str {
        "REJECT"
    }
}

impl fmt::Display for EntityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct EntityError {
    code: EntityErrorCode,
    message: String,
    entity: String,
}

impl EntityError {
    fn new(code: EntityErrorCode, entity: &str, message: String) -> Self {
        Self {
            code,
            message,
            entity: entity.to_string(),
        }
    }

    pub fn unknown_field(entity: &str, field: &str) -> Self {
        Self::new(
            EntityErrorCode::WeftEntityUnknownField,
            entity,
            format!("field '{}' is not declared", field),
        )
    }

    pub fn counter_assignment(entity: &str, field: &str) -> Self {
        Self::new(
            EntityErrorCode::WeftEntityCounterAssignment,
            entity,
            format!("counter '{}' can only be incremented", field),
        )
    }

    pub fn not_a_counter(entity: &str, field: &str) -> Self {
        Self::new(
            EntityErrorCode::WeftEntityNotACounter,
            entity,
            format!("field '{}' is not a counter", field),
        )
    }

    pub fn reserved_field(entity: &str, field: &str) -> Self {
        Self::new(
            EntityErrorCode::WeftEntityReservedField,
            entity,
            format!("'{}' is reserved and cannot be an extension field", field),
        )
    }

    pub fn malformed_document(entity: &str, reason: impl Into<String>) -> Self {
        Self::new(
            EntityErrorCode::WeftEntityMalformedDocument,
            entity,
            reason.into(),
        )
    }

    pub fn code(&self) -> EntityErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} (entity '{}')",
            self.code.severity(),
            self.code.code(),
            self.message,
            self.entity
        )
    }
}

impl std::error::Error for EntityError {}

pub type EntityResult<T> = Result<T, EntityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = EntityError::counter_assignment("users", "visits");
        assert_eq!(
            err.to_string(),
            "[REJECT] WEFT_ENTITY_COUNTER_ASSIGNMENT: counter 'visits' can only be incremented (entity 'users')"
        );
        assert_eq!(err.entity(), "users");
    }
}
