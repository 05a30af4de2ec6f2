//! Group accumulators and array access

use serde_json::{json, Value};

use crate::expression::{doc, Expression, Repr};

/// Single-input accumulator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorOp {
    First,
    Last,
    Min,
    Max,
    Sum,
    Avg,
    Push,
    AddToSet,
    MergeObjects,
    StdDevPop,
    StdDevSamp,
}

impl AccumulatorOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccumulatorOp::First => "$first",
            AccumulatorOp::Last => "$last",
            AccumulatorOp::Min => "$min",
            AccumulatorOp::Max => "$max",
            AccumulatorOp::Sum => "$sum",
            AccumulatorOp::Avg => "$avg",
            AccumulatorOp::Push => "$push",
            AccumulatorOp::AddToSet => "$addToSet",
            AccumulatorOp::MergeObjects => "$mergeObjects",
            AccumulatorOp::StdDevPop => "$stdDevPop",
            AccumulatorOp::StdDevSamp => "$stdDevSamp",
        }
    }
}

/// `{"$op": input}`
#[derive(Debug, Clone)]
pub struct Accumulator {
    op: AccumulatorOp,
    input: Repr,
}

impl Accumulator {
    pub fn new(op: AccumulatorOp, input: impl Into<Repr>) -> Self {
        Self {
            op,
            input: input.into(),
        }
    }

    pub fn op(&self) -> AccumulatorOp {
        self.op
    }
}

impl Expression for Accumulator {
    fn to_representation(&self) -> Repr {
        Repr::keyed(self.op.as_str(), self.input.clone())
    }
}

macro_rules! accumulator_fns {
    ($($name:ident => $op:ident),* $(,)?) => {
        $(
            pub fn $name(input: impl Into<Repr>) -> Accumulator {
                Accumulator::new(AccumulatorOp::$op, input)
            }
        )*
    };
}

accumulator_fns! {
    first => First,
    last => Last,
    min => Min,
    max => Max,
    sum => Sum,
    avg => Avg,
    push => Push,
    add_to_set => AddToSet,
    merge_objects => MergeObjects,
    std_dev_pop => StdDevPop,
    std_dev_samp => StdDevSamp,
}

/// Approximate median: `{"$median": {"input": x, "method": "approximate"}}`
#[derive(Debug, Clone)]
pub struct Median {
    input: Repr,
}

impl Median {
    pub fn new(input: impl Into<Repr>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl Expression for Median {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$median",
            doc([
                ("input", self.input.clone()),
                ("method", Repr::literal("approximate")),
            ]),
        )
    }
}

/// Approximate percentiles at the given ranks
#[derive(Debug, Clone)]
pub struct Percentile {
    input: Repr,
    ranks: Vec<f64>,
}

impl Percentile {
    pub fn new(input: impl Into<Repr>, ranks: Vec<f64>) -> Self {
        Self {
            input: input.into(),
            ranks,
        }
    }
}

impl Expression for Percentile {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$percentile",
            doc([
                ("input", self.input.clone()),
                ("p", Repr::literal(json!(self.ranks))),
                ("method", Repr::literal("approximate")),
            ]),
        )
    }
}

/// `{"$arrayElemAt": [array, index]}`
#[derive(Debug, Clone)]
pub struct ArrayElemAt {
    array: Repr,
    index: i64,
}

impl ArrayElemAt {
    pub fn new(array: impl Into<Repr>, index: i64) -> Self {
        Self {
            array: array.into(),
            index,
        }
    }
}

impl Expression for ArrayElemAt {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$arrayElemAt",
            Repr::Array(vec![self.array.clone(), Repr::from(self.index)]),
        )
    }
}

/// Group-count accumulator: `{"$count": {}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl Expression for Count {
    fn to_representation(&self) -> Repr {
        Repr::keyed("$count", Repr::Value(Value::Object(Default::default())))
    }

    fn is_empty(&self) -> bool {
        false
    }
}

impl_into_repr!(Accumulator, Median, Percentile, ArrayElemAt, Count);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ResolutionContext;

    #[test]
    fn test_simple_accumulators() {
        let ctx = ResolutionContext::new().with_alias("amount", "amt");
        assert_eq!(sum("amount").express(&ctx), json!({"$sum": "$amt"}));
        assert_eq!(sum(1).express(&ctx), json!({"$sum": 1}));
        assert_eq!(avg("amount").express(&ctx), json!({"$avg": "$amt"}));
        assert_eq!(add_to_set("tag").express(&ctx), json!({"$addToSet": "$tag"}));
        assert_eq!(std_dev_samp("x").express(&ctx), json!({"$stdDevSamp": "$x"}));
    }

    #[test]
    fn test_median_and_percentile() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            Median::new("latency").express(&ctx),
            json!({"$median": {"input": "$latency", "method": "approximate"}})
        );
        assert_eq!(
            Percentile::new("latency", vec![0.5, 0.95]).express(&ctx),
            json!({"$percentile": {"input": "$latency", "p": [0.5, 0.95], "method": "approximate"}})
        );
    }

    #[test]
    fn test_array_elem_at_and_count() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            ArrayElemAt::new("items", -1).express(&ctx),
            json!({"$arrayElemAt": ["$items", -1]})
        );
        assert_eq!(Count.express(&ctx), json!({"$count": {}}));
        assert!(!Count.is_empty());
    }
}
