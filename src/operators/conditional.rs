//! Conditional and comparison expressions

use crate::expression::{doc, Expression, Repr};

/// `{"$cond": [if, then, else]}`
#[derive(Debug, Clone)]
pub struct Cond {
    branches: [Repr; 3],
}

impl Cond {
    pub fn new(
        condition: impl Into<Repr>,
        then: impl Into<Repr>,
        otherwise: impl Into<Repr>,
    ) -> Self {
        Self {
            branches: [condition.into(), then.into(), otherwise.into()],
        }
    }
}

impl Expression for Cond {
    fn to_representation(&self) -> Repr {
        Repr::keyed("$cond", Repr::Array(self.branches.to_vec()))
    }
}

/// Multi-branch conditional with an optional default
#[derive(Debug, Clone, Default)]
pub struct Switch {
    branches: Vec<(Repr, Repr)>,
    default: Option<Repr>,
}

impl Switch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case(mut self, condition: impl Into<Repr>, then: impl Into<Repr>) -> Self {
        self.branches.push((condition.into(), then.into()));
        self
    }

    pub fn default_to(mut self, value: impl Into<Repr>) -> Self {
        self.default = Some(value.into());
        self
    }
}

impl Expression for Switch {
    fn to_representation(&self) -> Repr {
        let branches = self
            .branches
            .iter()
            .map(|(case, then)| doc([("case", case.clone()), ("then", then.clone())]))
            .collect();

        let mut body = vec![("branches", Repr::Array(branches))];
        if let Some(default) = &self.default {
            body.push(("default", default.clone()));
        }
        Repr::keyed("$switch", doc(body))
    }

    fn is_empty(&self) -> bool {
        self.branches.is_empty() && self.default.is_none()
    }
}

/// Comparison operator kinds for aggregation expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "$eq",
            CmpOp::Ne => "$ne",
            CmpOp::Gt => "$gt",
            CmpOp::Gte => "$gte",
            CmpOp::Lt => "$lt",
            CmpOp::Lte => "$lte",
        }
    }
}

/// Comparison expression: `{"$gt": [lhs, rhs]}`
#[derive(Debug, Clone)]
pub struct Cmp {
    op: CmpOp,
    operands: [Repr; 2],
}

impl Cmp {
    pub fn new(op: CmpOp, lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Self {
        Self {
            op,
            operands: [lhs.into(), rhs.into()],
        }
    }

    pub fn eq(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Self {
        Self::new(CmpOp::Eq, lhs, rhs)
    }

    pub fn gt(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Self {
        Self::new(CmpOp::Gt, lhs, rhs)
    }

    pub fn lt(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Self {
        Self::new(CmpOp::Lt, lhs, rhs)
    }
}

impl Expression for Cmp {
    fn to_representation(&self) -> Repr {
        Repr::keyed(self.op.as_str(), Repr::Array(self.operands.to_vec()))
    }
}

impl_into_repr!(Cond, Switch, Cmp);
