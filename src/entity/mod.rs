//! Entity records for weft
//!
//! An `Entity` is one instance of a declared entity type: its declared
//! field values, counters with pending deltas, extension fields, and the
//! update state that decides whether a write is needed.
//!
//! # Design Principles
//!
//! - Single writer: mutation takes `&mut Entity`
//! - Values are normalized on assignment, never on load
//! - Identifier assignment and clearing the pending flag are one step
//! - A rejected mutation leaves the entity unchanged

mod counter;
mod errors;
mod record;
mod state;

pub use counter::{Counter, Tally};
pub use errors::{EntityError, EntityErrorCode, EntityResult};
pub use record::Entity;
pub use state::{EntityPhase, UpdateState};
