//! Declaration validation
//!
//! Checked once at registration, in declaration order; the first violation
//! wins:
//! - Logical field names are unique
//! - Wire names are unique
//! - A wire name is never `_id` or the version key
//! - A field carries at most one policy role

use std::collections::{HashMap, HashSet};

use super::errors::{SchemaError, SchemaResult};
use super::types::{FieldDef, ID_FIELD};

pub(crate) fn validate_fields(
    entity: &str,
    version_field: &str,
    fields: &[FieldDef],
) -> SchemaResult<()> {
    let mut names: HashSet<&str> = HashSet::with_capacity(fields.len());
    let mut wires: HashMap<&str, &str> = HashMap::with_capacity(fields.len());

    for field in fields {
        if !names.insert(field.name()) {
            return Err(SchemaError::duplicate_field(entity, field.name()));
        }

        let wire = field.wire_name();
        if wire == ID_FIELD || wire == version_field {
            return Err(SchemaError::reserved_name(entity, field.name(), wire));
        }
        if let Some(other) = wires.insert(wire, field.name()) {
            return Err(SchemaError::duplicate_wire_name(
                entity,
                field.name(),
                wire,
                other,
            ));
        }

        if field.roles().len() > 1 {
            let kinds: Vec<&str> = field.roles().iter().map(|r| r.kind()).collect();
            return Err(SchemaError::conflicting_roles(entity, field.name(), &kinds));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{PolicyRole, SchemaErrorCode};

    fn codes(fields: &[FieldDef]) -> Option<SchemaErrorCode> {
        validate_fields("things", "version", fields).err().map(|e| e.code())
    }

    #[test]
    fn test_valid_declaration_passes() {
        let fields = vec![
            FieldDef::new("a").alias("x"),
            FieldDef::counter("b"),
            FieldDef::time_inserted("c"),
        ];
        assert_eq!(codes(&fields), None);
    }

    #[test]
    fn test_duplicate_field() {
        let fields = vec![FieldDef::new("a"), FieldDef::new("a")];
        assert_eq!(codes(&fields), Some(SchemaErrorCode::WeftSchemaDuplicateField));
    }

    #[test]
    fn test_duplicate_wire_name() {
        let fields = vec![FieldDef::new("a").alias("x"), FieldDef::new("x")];
        assert_eq!(codes(&fields), Some(SchemaErrorCode::WeftSchemaDuplicateWireName));
    }

    #[test]
    fn test_reserved_names() {
        assert_eq!(
            codes(&[FieldDef::new("id").alias("_id")]),
            Some(SchemaErrorCode::WeftSchemaReservedName)
        );
        assert_eq!(
            codes(&[FieldDef::new("version")]),
            Some(SchemaErrorCode::WeftSchemaReservedName)
        );
    }

    #[test]
    fn test_conflicting_roles() {
        let field = FieldDef::time_inserted("seen").role(PolicyRole::IncrementCoalesce);
        assert_eq!(codes(&[field]), Some(SchemaErrorCode::WeftSchemaConflictingRoles));
    }
}
