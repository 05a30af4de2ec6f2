//! weft - declarative entities compiled into document-store commands
//!
//! Entity types are declared once (fields, wire aliases, normalizers and
//! update policies). Instances are mutated in memory and compiled into a
//! single upsert command per persist. Queries are built from composable
//! predicate, sort and aggregation values and rendered as pipelines.

pub mod aggregation;
pub mod cli;
pub mod config;
pub mod directive;
pub mod entity;
pub mod expression;
pub mod observability;
pub mod operators;
pub mod predicate;
pub mod schema;
pub mod session;
pub mod sort;
pub mod store;
pub mod update;
