//! Entity declaration errors
//!
//! Error codes:
//! - WEFT_SCHEMA_DUPLICATE_FIELD (REJECT)
//! - WEFT_SCHEMA_DUPLICATE_WIRE_NAME (REJECT)
//! - WEFT_SCHEMA_CONFLICTING_ROLES (REJECT)
//! - WEFT_SCHEMA_RESERVED_NAME (REJECT)
//! - WEFT_SCHEMA_UNKNOWN_TRANSFORMER (REJECT)
//! - WEFT_SCHEMA_DUPLICATE_ENTITY (REJECT)
//! - WEFT_SCHEMA_UNKNOWN_ENTITY (REJECT)
//! - WEFT_SCHEMA_MALFORMED_DECLARATION (FATAL)
//!
//! Every error here is a configuration defect raised at registration time,
//! never during synthesis.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The declaration is rejected
    Reject,
    /// Startup cannot continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Two fields share a logical name
    WeftSchemaDuplicateField,
    /// Two fields resolve to the same wire name
    WeftSchemaDuplicateWireName,
    /// A field carries more than one policy role
    WeftSchemaConflictingRoles,
    /// A field uses `_id` or the version key as its wire name
    WeftSchemaReservedName,
    /// A declaration names a transformer or producer that does not exist
    WeftSchemaUnknownTransformer,
    /// An entity name was registered twice
    WeftSchemaDuplicateEntity,
    /// No entity is registered under the requested name
    WeftSchemaUnknownEntity,
    /// A declaration file could not be read or parsed
    WeftSchemaMalformedDeclaration,
}

impl SchemaErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::WeftSchemaDuplicateField => "WEFT_SCHEMA_DUPLICATE_FIELD",
            SchemaErrorCode::WeftSchemaDuplicateWireName => "WEFT_SCHEMA_DUPLICATE_WIRE_NAME",
            SchemaErrorCode::WeftSchemaConflictingRoles => "WEFT_SCHEMA_CONFLICTING_ROLES",
            SchemaErrorCode::WeftSchemaReservedName => "WEFT_SCHEMA_RESERVED_NAME",
            SchemaErrorCode::WeftSchemaUnknownTransformer => "WEFT_SCHEMA_UNKNOWN_TRANSFORMER",
            SchemaErrorCode::WeftSchemaDuplicateEntity => "WEFT_SCHEMA_DUPLICATE_ENTITY",
            SchemaErrorCode::WeftSchemaUnknownEntity => "WEFT_SCHEMA_UNKNOWN_ENTITY",
            SchemaErrorCode::WeftSchemaMalformedDeclaration => {
                "WEFT_SCHEMA_MALFORMED_DECLARATION"
            }
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::WeftSchemaMalformedDeclaration => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    entity: Option<String>,
    field: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            entity: None,
            field: None,
        }
    }

    fn at(mut self, entity: &str, field: Option<&str>) -> Self {
        self.entity = Some(entity.to_string());
        self.field = field.map(str::to_string);
        self
    }

    pub fn duplicate_field(entity: &str, field: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaDuplicateField,
            format!("field '{}' is declared more than once", field),
        )
        .at(entity, Some(field))
    }

    pub fn duplicate_wire_name(entity: &str, field: &str, wire: &str, other: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaDuplicateWireName,
            format!(
                "field '{}' resolves to wire name '{}' already used by '{}'",
                field, wire, other
            ),
        )
        .at(entity, Some(field))
    }

    pub fn conflicting_roles(entity: &str, field: &str, roles: &[&str]) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaConflictingRoles,
            format!(
                "field '{}' declares {} policy roles ({}); at most one is allowed",
                field,
                roles.len(),
                roles.join(", ")
            ),
        )
        .at(entity, Some(field))
    }

    pub fn reserved_name(entity: &str, field: &str, wire: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaReservedName,
            format!("field '{}' may not use reserved wire name '{}'", field, wire),
        )
        .at(entity, Some(field))
    }

    pub fn unknown_transformer(entity: &str, field: &str, name: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaUnknownTransformer,
            format!("field '{}' names unknown transformer '{}'", field, name),
        )
        .at(entity, Some(field))
    }

    pub fn duplicate_entity(entity: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaDuplicateEntity,
            format!("entity '{}' is already registered", entity),
        )
        .at(entity, None)
    }

    pub fn unknown_entity(entity: &str) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaUnknownEntity,
            format!("entity '{}' is not registered", entity),
        )
        .at(entity, None)
    }

    pub fn malformed_declaration(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::WeftSchemaMalformedDeclaration,
            format!(
                "malformed declaration '{}': {}",
                path.into(),
                reason.into()
            ),
        )
    }

    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(entity) = &self.entity {
            write!(f, " (entity '{}')", entity)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaErrorCode::WeftSchemaConflictingRoles.code(),
            "WEFT_SCHEMA_CONFLICTING_ROLES"
        );
        assert_eq!(
            SchemaErrorCode::WeftSchemaReservedName.code(),
            "WEFT_SCHEMA_RESERVED_NAME"
        );
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            SchemaErrorCode::WeftSchemaDuplicateField.severity(),
            Severity::Reject
        );
        assert!(SchemaError::malformed_declaration("x.json", "bad").is_fatal());
    }

    #[test]
    fn test_display_carries_context() {
        let err = SchemaError::conflicting_roles("users", "seen", &["set_on_insert", "counter"]);
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] WEFT_SCHEMA_CONFLICTING_ROLES"));
        assert!(display.contains("seen"));
        assert!(display.contains("users"));
        assert_eq!(err.field(), Some("seen"));
    }
}
