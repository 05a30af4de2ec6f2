//! Sort combinator for weft
//!
//! A `SortOp` is an ordered field-to-direction map. Merging two sorts is a
//! map update: a key keeps its first position and takes the right-hand
//! direction. The empty sort is the identity.

mod errors;
mod sort_op;

pub use errors::{SortError, SortErrorCode, SortResult};
pub use sort_op::{express_sort, SortDirection, SortOp};
