//! Load directives for weft
//!
//! A `LoadDirective` collects the filter, sort, paging and extra stages of a
//! read against one entity type and renders them as a single pipeline,
//! resolved through the entity's aliases and query normalizers.
//!
//! Execution belongs to the session; a directive only produces documents.

mod load;

pub use load::{LoadDirective, COUNT_FIELD};
