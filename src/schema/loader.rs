//! Entity registry and JSON declaration loading
//!
//! A declaration directory holds one `*.json` file per entity type. Files
//! are loaded in file-name order; any unreadable, unparsable, or invalid
//! file aborts the load.
//!
//! ```json
//! {
//!   "name": "users",
//!   "version": 2,
//!   "fields": [
//!     {"name": "email", "alias": "em", "normalize": ["lower"], "normalize_query": ["lower"]},
//!     {"name": "created", "roles": [{"set_on_insert": "now"}]},
//!     {"name": "updated", "roles": [{"refresh_on_set": ["now"]}]},
//!     {"name": "visits", "roles": ["increment"]}
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use crate::observability::{log_event_with_fields, Event, ObservationScope};

use super::errors::{SchemaError, SchemaResult};
use super::transformers::{named_producer, named_transformer};
use super::types::{EntitySchema, EntitySchemaBuilder, FieldDef, PolicyRole, DEFAULT_VERSION_FIELD};

/// A policy role as written in a declaration file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDeclaration {
    /// Producer name
    SetOnInsert(String),
    /// Transformer chain
    RefreshOnSet(Vec<String>),
    Increment,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDeclaration {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub normalize: Vec<String>,
    #[serde(default)]
    pub normalize_query: Vec<String>,
    #[serde(default)]
    pub roles: Vec<RoleDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDeclaration {
    pub name: String,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,
}

impl EntityDeclaration {
    /// Resolves every named function into a schema builder
    pub fn into_builder(self) -> SchemaResult<EntitySchemaBuilder> {
        let mut builder = EntitySchema::builder(self.name.clone());
        if let Some(version) = self.version {
            builder = builder.version(version);
        }

        for decl in self.fields {
            let mut field = FieldDef::new(decl.name.clone());
            if let Some(alias) = decl.alias {
                field = field.alias(alias);
            }

            let lookup = |name: &str| {
                named_transformer(name)
                    .ok_or_else(|| SchemaError::unknown_transformer(&self.name, &decl.name, name))
            };
            for name in &decl.normalize {
                field = field.normalize(lookup(name.as_str())?);
            }
            for name in &decl.normalize_query {
                field = field.normalize_query(lookup(name.as_str())?);
            }

            for role in &decl.roles {
                let role = match role {
                    RoleDeclaration::SetOnInsert(producer) => {
                        PolicyRole::SetOnInsert(named_producer(producer).ok_or_else(|| {
                            SchemaError::unknown_transformer(&self.name, &decl.name, producer)
                        })?)
                    }
                    RoleDeclaration::RefreshOnSet(chain) => PolicyRole::RefreshOnSet(
                        chain
                            .iter()
                            .map(|name| lookup(name.as_str()))
                            .collect::<SchemaResult<Vec<_>>>()?,
                    ),
                    RoleDeclaration::Increment => PolicyRole::IncrementCoalesce,
                };
                field = field.role(role);
            }

            builder = builder.field(field);
        }

        Ok(builder)
    }
}

/// Registry of entity declarations, keyed by entity name
#[derive(Debug)]
pub struct EntityRegistry {
    version_field: String,
    test_mode: bool,
    schemas: BTreeMap<String, Arc<EntitySchema>>,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_VERSION_FIELD, false)
    }

    /// Declarations loaded from files use this version key and test mode
    pub fn with_options(version_field: impl Into<String>, test_mode: bool) -> Self {
        Self {
            version_field: version_field.into(),
            test_mode,
            schemas: BTreeMap::new(),
        }
    }

    /// Registers a built schema. A name can be registered only once.
    pub fn register(&mut self, schema: EntitySchema) -> SchemaResult<Arc<EntitySchema>> {
        if self.schemas.contains_key(schema.name()) {
            return Err(SchemaError::duplicate_entity(schema.name()));
        }

        let fields = schema.fields().len().to_string();
        log_event_with_fields(
            Event::EntityRegistered,
            &[
                ("collection", schema.collection()),
                ("entity", schema.name()),
                ("fields", fields.as_str()),
            ],
        );

        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Builds, validates, and registers a parsed declaration
    pub fn register_declaration(
        &mut self,
        declaration: EntityDeclaration,
    ) -> SchemaResult<Arc<EntitySchema>> {
        let schema = declaration
            .into_builder()?
            .version_field(self.version_field.clone())
            .test_mode(self.test_mode)
            .build()?;
        self.register(schema)
    }

    /// Loads one declaration file
    pub fn load_file(&mut self, path: &Path) -> SchemaResult<Arc<EntitySchema>> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_declaration(
                path.display().to_string(),
                format!("failed to read file: {}", e),
            )
        })?;

        let declaration: EntityDeclaration = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_declaration(
                path.display().to_string(),
                format!("invalid JSON: {}", e),
            )
        })?;

        self.register_declaration(declaration).map_err(|e| {
            let path = path.display().to_string();
            log_event_with_fields(
                Event::DeclarationRejected,
                &[("path", path.as_str()), ("reason", e.message())],
            );
            e
        })
    }

    /// Loads every `*.json` file in `dir`, returning how many were loaded
    pub fn load_dir(&mut self, dir: &Path) -> SchemaResult<usize> {
        let dir_name = dir.display().to_string();
        let scope = ObservationScope::with_fields("DECLARATIONS_LOAD", &[("dir", dir_name.as_str())]);

        let result = self.load_dir_inner(dir);
        match &result {
            Ok(count) => scope.complete_with_fields(&[("entities", count.to_string().as_str())]),
            Err(e) => scope.fail(e.message()),
        }
        result
    }

    fn load_dir_inner(&mut self, dir: &Path) -> SchemaResult<usize> {
        let entries = fs::read_dir(dir).map_err(|e| {
            SchemaError::malformed_declaration(
                dir.display().to_string(),
                format!("failed to read declaration directory: {}", e),
            )
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_declaration(
                    dir.display().to_string(),
                    format!("failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_file(path)?;
        }
        Ok(paths.len())
    }

    pub fn get(&self, name: &str) -> SchemaResult<Arc<EntitySchema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| SchemaError::unknown_entity(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Registered entity names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
