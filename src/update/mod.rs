//! Update-instruction synthesis for weft
//!
//! Compiles an entity's field state into one atomic upsert command made of
//! up to three mutually exclusive clauses: `$set`, `$setOnInsert` and
//! `$inc`.
//!
//! # Design Principles
//!
//! - One command per entity, never a sequence of writes
//! - A key appears in at most one clause
//! - Counter deltas are never folded into `$set`, so concurrent increments
//!   from different writers are never lost
//! - Policy conflicts are rejected when the schema is built, not here

mod command;
mod errors;
mod synthesizer;

pub use command::{UpdateCommand, INC, SET, SET_ON_INSERT};
pub use errors::{UpdateError, UpdateErrorCode, UpdateResult};
pub use synthesizer::UpdateSynthesizer;
