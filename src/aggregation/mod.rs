//! Aggregation pipeline builder for weft
//!
//! # Design Principles
//!
//! - Append-only: each stage method returns a new pipeline value
//! - No-op stages (`limit(0)`, `sample(0)`, empty match, empty sort) are
//!   elided at append time, never at render time
//! - `a | b` concatenates stage lists in order, without deduplication
//! - Filter and sort stages stay typed until `render`, so they pick up the
//!   caller's alias and normalizer table

mod errors;
mod pipeline;
mod stage;

pub use errors::{AggregationError, AggregationErrorCode, AggregationResult};
pub use pipeline::{Aggregation, DEFAULT_LOOKUP_OUTPUT};
pub use stage::{Stage, StageBody, StageName};
