//! Sessions for weft
//!
//! A `Session` ties entities to an injected `DocumentStore`: it synthesizes
//! update commands, submits them as upserts keyed by `_id`, and reads
//! directive results back as entities.
//!
//! # Design Principles
//!
//! - Identifiers are UUID v4 strings, assigned only on a successful write
//! - A failed write leaves every entity exactly as it was before
//! - Lazy persists skip entities with nothing to write

mod errors;
mod persist;

pub use errors::{SessionError, SessionResult};
pub use persist::Session;
