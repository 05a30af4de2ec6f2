//! Expression subsystem for weft
//!
//! Every query predicate, sort specification, pipeline stage and operator in
//! this crate is an expression: a node that converts to a wire-protocol value.
//!
//! # Design Principles
//!
//! - Pure: `to_representation()` has no side effects and is repeatable
//! - Resolved: `express(ctx)` never returns an unresolved nested node
//! - Lenient: unknown aliases and missing transformers pass through verbatim
//!
//! # Wire Shape
//!
//! Field references render as `"$<alias>"`, plain names as `"<alias>"`.
//! Literals bound to a field run through that field's transformer chain.

mod context;
mod field;
mod repr;

pub use context::{FieldResolution, ResolutionContext, Transformer};
pub use field::{date_value, FieldName, FieldPath, Literal, LiteralInput, FIELD_PATH_SIGIL};
pub use repr::{doc, Expression, Repr};
