//! Entity declaration types
//!
//! An `EntitySchema` is the statically registered policy table for one
//! entity type: its collection, optional schema version, and an ordered
//! list of field declarations. It is built and validated once; afterwards
//! it is shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::expression::{date_value, FieldResolution, ResolutionContext, Transformer};

use super::errors::SchemaResult;
use super::transformers::{self, Producer};
use super::validator;

/// Wire name of the document identifier
pub const ID_FIELD: &str = "_id";

/// Default wire name of the schema version key
pub const DEFAULT_VERSION_FIELD: &str = "version";

/// Collection suffix applied in test mode
pub const TEST_SUFFIX: &str = "_test";

/// How a field takes part in an update command
#[derive(Clone)]
pub enum PolicyRole {
    /// Written only when the document is inserted; the producer supplies a
    /// value when the field is unset
    SetOnInsert(Producer),
    /// Recomputed through the chain on every write, overriding the instance
    /// value
    RefreshOnSet(Vec<Transformer>),
    /// Pending deltas go to the increment clause
    IncrementCoalesce,
}

impl PolicyRole {
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyRole::SetOnInsert(_) => "set_on_insert",
            PolicyRole::RefreshOnSet(_) => "refresh_on_set",
            PolicyRole::IncrementCoalesce => "increment",
        }
    }
}

impl fmt::Debug for PolicyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// One declared field
#[derive(Clone)]
pub struct FieldDef {
    name: String,
    alias: Option<String>,
    normalizers: Vec<Transformer>,
    query_normalizers: Vec<Transformer>,
    roles: Vec<PolicyRole>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            normalizers: Vec::new(),
            query_normalizers: Vec::new(),
            roles: Vec::new(),
        }
    }

    /// Wire name used in stored documents and rendered filters
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Applied to every value assigned to the field
    pub fn normalize(mut self, transformer: Transformer) -> Self {
        self.normalizers.push(transformer);
        self
    }

    /// Applied to literals bound to the field in filters
    pub fn normalize_query(mut self, transformer: Transformer) -> Self {
        self.query_normalizers.push(transformer);
        self
    }

    /// Attaches a policy role. A second role is accepted here and rejected
    /// by `EntitySchemaBuilder::build`.
    pub fn role(mut self, role: PolicyRole) -> Self {
        self.roles.push(role);
        self
    }

    /// Set once on insert to the current time
    pub fn time_inserted(name: impl Into<String>) -> Self {
        Self::new(name).role(PolicyRole::SetOnInsert(Arc::new(|| date_value(&Utc::now()))))
    }

    /// Refreshed to the current time on every write
    pub fn time_updated(name: impl Into<String>) -> Self {
        let now: Transformer = Arc::new(|_: Value| date_value(&Utc::now()));
        Self::new(name).role(PolicyRole::RefreshOnSet(vec![now]))
    }

    /// Atomic counter
    pub fn counter(name: impl Into<String>) -> Self {
        Self::new(name).role(PolicyRole::IncrementCoalesce)
    }

    /// Upper-cased on assignment and in queries
    pub fn upper(name: impl Into<String>) -> Self {
        Self::new(name)
            .normalize(transformers::upper())
            .normalize_query(transformers::upper())
    }

    /// Lower-cased on assignment and in queries
    pub fn lower(name: impl Into<String>) -> Self {
        Self::new(name)
            .normalize(transformers::lower())
            .normalize_query(transformers::lower())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn normalizers(&self) -> &[Transformer] {
        &self.normalizers
    }

    pub fn query_normalizers(&self) -> &[Transformer] {
        &self.query_normalizers
    }

    pub fn roles(&self) -> &[PolicyRole] {
        &self.roles
    }

    /// The field's policy role; a built schema guarantees at most one
    pub fn policy(&self) -> Option<&PolicyRole> {
        self.roles.first()
    }

    pub fn is_counter(&self) -> bool {
        matches!(self.policy(), Some(PolicyRole::IncrementCoalesce))
    }
}

impl fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("normalizers", &self.normalizers.len())
            .field("query_normalizers", &self.query_normalizers.len())
            .field("roles", &self.roles)
            .finish()
    }
}

/// A validated, immutable entity declaration
#[derive(Debug)]
pub struct EntitySchema {
    name: String,
    collection: String,
    version: Option<i64>,
    version_field: String,
    fields: Vec<FieldDef>,
    by_name: HashMap<String, usize>,
    by_wire: HashMap<String, usize>,
    context: ResolutionContext,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection the entity is stored in (suffixed in test mode)
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn version(&self) -> Option<i64> {
        self.version
    }

    pub fn version_field(&self) -> &str {
        &self.version_field
    }

    /// Declared fields in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    pub fn field_by_wire_name(&self, wire: &str) -> Option<&FieldDef> {
        self.by_wire.get(wire).map(|&i| &self.fields[i])
    }

    /// Alias and query-normalizer table for rendering filters, sorts, and
    /// pipelines against this entity
    pub fn resolution_context(&self) -> &ResolutionContext {
        &self.context
    }

    /// Declared fields carrying the given role kind
    pub fn fields_with_role(&self, kind: &'static str) -> impl Iterator<Item = &FieldDef> {
        self.fields
            .iter()
            .filter(move |f| f.policy().map(PolicyRole::kind) == Some(kind))
    }
}

/// Builder for `EntitySchema`
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    name: String,
    version: Option<i64>,
    version_field: String,
    test_mode: bool,
    fields: Vec<FieldDef>,
}

impl EntitySchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            version_field: DEFAULT_VERSION_FIELD.to_string(),
            test_mode: false,
            fields: Vec::new(),
        }
    }

    /// Schema version written on insert
    pub fn version(mut self, version: i64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn version_field(mut self, name: impl Into<String>) -> Self {
        self.version_field = name.into();
        self
    }

    /// Appends `_test` to the collection name
    pub fn test_mode(mut self, enabled: bool) -> Self {
        self.test_mode = enabled;
        self
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Validates the declaration and freezes it.
    ///
    /// # Errors
    ///
    /// - WEFT_SCHEMA_DUPLICATE_FIELD
    /// - WEFT_SCHEMA_DUPLICATE_WIRE_NAME
    /// - WEFT_SCHEMA_CONFLICTING_ROLES
    /// - WEFT_SCHEMA_RESERVED_NAME
    pub fn build(self) -> SchemaResult<EntitySchema> {
        validator::validate_fields(&self.name, &self.version_field, &self.fields)?;

        let mut by_name = HashMap::with_capacity(self.fields.len());
        let mut by_wire = HashMap::with_capacity(self.fields.len());
        let mut context = ResolutionContext::new();

        for (i, field) in self.fields.iter().enumerate() {
            by_name.insert(field.name.clone(), i);
            by_wire.insert(field.wire_name().to_string(), i);
            context = context.with_field(
                field.name.clone(),
                FieldResolution {
                    alias: field.alias.clone(),
                    transformers: field.query_normalizers.clone(),
                },
            );
        }

        let collection = if self.test_mode {
            format!("{}{}", self.name, TEST_SUFFIX)
        } else {
            self.name.clone()
        };

        Ok(EntitySchema {
            name: self.name,
            collection,
            version: self.version,
            version_field: self.version_field,
            fields: self.fields,
            by_name,
            by_wire,
            context,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use serde_json::json;

    fn users() -> EntitySchema {
        EntitySchema::builder("users")
            .version(2)
            .field(FieldDef::lower("email").alias("em"))
            .field(FieldDef::time_inserted("created"))
            .field(FieldDef::time_updated("updated"))
            .field(FieldDef::counter("visits"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup_by_name_and_wire_name() {
        let schema = users();
        assert_eq!(schema.field("email").unwrap().wire_name(), "em");
        assert_eq!(schema.field_by_wire_name("em").unwrap().name(), "email");
        assert!(schema.field("missing").is_none());
        assert_eq!(schema.fields().len(), 4);
    }

    #[test]
    fn test_resolution_context_carries_aliases_and_query_normalizers() {
        let schema = users();
        let ctx = schema.resolution_context();
        assert_eq!(ctx.alias("email"), "em");
        assert_eq!(ctx.transform("email", json!("A@B")), json!("a@b"));
        assert_eq!(ctx.alias("visits"), "visits");
    }

    #[test]
    fn test_roles() {
        let schema = users();
        assert!(schema.field("visits").unwrap().is_counter());
        assert_eq!(
            schema.fields_with_role("set_on_insert").map(|f| f.name()).collect::<Vec<_>>(),
            vec!["created"]
        );
        assert!(schema.field("email").unwrap().policy().is_none());
    }

    #[test]
    fn test_test_mode_suffixes_collection() {
        let schema = EntitySchema::builder("events").test_mode(true).build().unwrap();
        assert_eq!(schema.collection(), "events_test");
        assert_eq!(schema.name(), "events");
        assert_eq!(schema.version_field(), DEFAULT_VERSION_FIELD);
    }

    #[test]
    fn test_build_rejects_conflicting_roles() {
        let err = EntitySchema::builder("users")
            .field(FieldDef::counter("seen").role(PolicyRole::IncrementCoalesce))
            .build()
            .unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::WeftSchemaConflictingRoles);
    }
}
