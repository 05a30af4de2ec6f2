//! Operator and accumulator catalog for weft
//!
//! A flat set of pure expression nodes. Each node has a fixed arity chosen
//! at construction and renders the exact document the protocol expects for
//! its operator. Operand types are never checked here; that is the store's
//! job.
//!
//! # Families
//!
//! - arithmetic: `$add`, `$subtract`, `$multiply`, `$divide`, `$mod`, `$abs`,
//!   `$ifNull`, `$convert`
//! - string: `$toUpper`, `$toLower`, `$concat`, `$substrCP`, `$split`, `$trim`
//! - date: component extraction, `$dateToString`, hour alignment
//! - conditional: `$cond`, `$switch`, comparison expressions
//! - accumulator: `$first` .. `$percentile`
//! - query: field conditions used inside filters

/// Implements `From<node> for Repr` for catalog nodes
macro_rules! impl_into_repr {
    ($($node:ty),* $(,)?) => {
        $(
            impl From<$node> for $crate::expression::Repr {
                fn from(node: $node) -> Self {
                    $crate::expression::Repr::node(node)
                }
            }
        )*
    };
}

mod accumulator;
mod arithmetic;
mod conditional;
mod date;
mod errors;
mod query;
mod string;

pub use accumulator::{
    add_to_set, avg, first, last, max, merge_objects, min, push, std_dev_pop, std_dev_samp, sum,
    Accumulator, AccumulatorOp, ArrayElemAt, Count, Median, Percentile,
};
pub use arithmetic::{
    add, divide, modulo, multiply, sanitize_number, subtract, to_double, to_int, Abs, Arithmetic,
    ArithmeticOp, Convert, ConvertTarget, IfNull,
};
pub use conditional::{Cmp, CmpOp, Cond, Switch};
pub use date::{DateAlign, DateComponent, DatePart, DateToString};
pub use errors::{OperatorError, OperatorErrorCode, OperatorResult};
pub use query::{QueryOp, TimeRange};
pub use string::{to_lower, to_upper, CaseConversion, Concat, Split, StringCase, Substr, Trim};
