//! Entity declarations for weft
//!
//! An entity type is declared once, either in code through
//! `EntitySchema::builder` or in a JSON file loaded by `EntityRegistry`.
//! The declaration drives every other subsystem: aliases and query
//! normalizers feed the resolution context, and policy roles decide which
//! update clause a field lands in.
//!
//! # Design Principles
//!
//! - Validated once at registration, never during synthesis
//! - Immutable after build, shared behind `Arc`
//! - At most one policy role per field
//! - Declaration files are loaded in a deterministic order

mod errors;
mod loader;
mod transformers;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{EntityDeclaration, EntityRegistry, FieldDeclaration, RoleDeclaration};
pub use transformers::{
    lower, named_producer, named_transformer, trim, upper, Producer, PRODUCER_NAMES,
    TRANSFORMER_NAMES,
};
pub use types::{
    EntitySchema, EntitySchemaBuilder, FieldDef, PolicyRole, DEFAULT_VERSION_FIELD, ID_FIELD,
    TEST_SUFFIX,
};
