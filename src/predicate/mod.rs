//! Logical predicate combinator for weft
//!
//! Builds filter documents as immutable trees of `Predicate` values.
//!
//! # Design Principles
//!
//! - Homogeneous chains are flat: `(a & b) & c` is one 3-clause `$and`
//! - Operator mixing nests explicitly: `(a | b) & c` keeps the `$or` inside
//! - The empty predicate is the identity for both combinators
//! - Clause order is append order; nothing is sorted or deduplicated
//! - A rendered filter re-parses into a predicate that renders identically

mod combinator;
mod errors;
mod field;

pub use combinator::{all_of, and, any_of, express_filter, or, LogicalOp, Predicate};
pub use errors::{PredicateError, PredicateErrorCode, PredicateResult};
pub use field::{equals, field, greater_than, less_than, FieldCondition};

pub(crate) use errors::kind_of;
