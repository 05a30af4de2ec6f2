//! Boolean filter trees with flattening AND/OR

use std::ops::{BitAnd, BitOr};

use serde_json::{Map, Value};

use crate::expression::{Expression, Repr, ResolutionContext};

use super::errors::{kind_of, PredicateError, PredicateResult};

/// Logical combinator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "$and",
            LogicalOp::Or => "$or",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "$and" => Some(LogicalOp::And),
            "$or" => Some(LogicalOp::Or),
            _ => None,
        }
    }
}

/// A filter expression.
///
/// Combining is canonical: chains of the same operator stay flat, mixing
/// operators nests, and an empty operand is absorbed.
#[derive(Debug, Clone, Default)]
pub enum Predicate {
    /// Matches everything; the identity for both combinators
    #[default]
    Empty,
    /// `{field: condition}`; the key is alias-resolved on render
    Field { field: String, condition: Repr },
    /// A literal filter document. Keys are alias-resolved, values are not
    /// transformed.
    Raw(Map<String, Value>),
    /// `{"$expr": expression}`
    Expr(Repr),
    Combined {
        op: LogicalOp,
        clauses: Vec<Predicate>,
    },
}

impl Predicate {
    pub fn field(field: impl Into<String>, condition: impl Into<Repr>) -> Self {
        Predicate::Field {
            field: field.into(),
            condition: condition.into(),
        }
    }

    pub fn raw(document: Map<String, Value>) -> Self {
        Predicate::Raw(document)
    }

    pub fn expr(expression: impl Into<Repr>) -> Self {
        Predicate::Expr(expression.into())
    }

    /// Combines two predicates under `op`.
    ///
    /// An empty side yields the other side unchanged. Either side already
    /// combined by `op` has its clause list spliced instead of nested.
    pub fn combine(op: LogicalOp, a: Predicate, b: Predicate) -> Predicate {
        if a.is_empty() {
            return b;
        }
        if b.is_empty() {
            return a;
        }

        let mut clauses = a.into_clauses(op);
        clauses.extend(b.into_clauses(op));
        Predicate::Combined { op, clauses }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::combine(LogicalOp::And, self, other)
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::combine(LogicalOp::Or, self, other)
    }

    fn into_clauses(self, op: LogicalOp) -> Vec<Predicate> {
        match self {
            Predicate::Combined { op: own, clauses } if own == op => clauses,
            other => vec![other],
        }
    }

    /// Returns the combinator kind, if this is a combined predicate
    pub fn logical_op(&self) -> Option<LogicalOp> {
        match self {
            Predicate::Combined { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Number of top-level clauses (0 for empty, 1 for a leaf)
    pub fn clause_count(&self) -> usize {
        match self {
            Predicate::Combined { clauses, .. } => clauses.len(),
            p if p.is_empty() => 0,
            _ => 1,
        }
    }

    /// Rebuilds a predicate from a rendered filter document.
    ///
    /// A single-key `$and`/`$or` document becomes a combinator; any other
    /// document becomes a raw clause.
    ///
    /// Raw clause keys are treated as logical names and aliased again on
    /// render. Rendering the re-parsed predicate under the same context
    /// reproduces the document only when no wire name in it is also a
    /// logical name with an alias of its own (for example `a -> b` together
    /// with `b -> c`).
    pub fn from_document(document: &Value) -> PredicateResult<Predicate> {
        let map = match document {
            Value::Object(map) => map,
            other => return Err(PredicateError::malformed(kind_of(other))),
        };

        if map.len() == 1 {
            if let Some((key, Value::Array(items))) = map.iter().next() {
                if let Some(op) = LogicalOp::from_key(key) {
                    let clauses = items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| match item {
                            Value::Object(_) => Predicate::from_document(item),
                            other => Err(PredicateError::malformed_operand(
                                op.as_str(),
                                i,
                                kind_of(other),
                            )),
                        })
                        .collect::<PredicateResult<Vec<_>>>()?;
                    return Ok(Predicate::Combined { op, clauses });
                }
            }
        }

        if map.is_empty() {
            return Ok(Predicate::Empty);
        }
        Ok(Predicate::Raw(map.clone()))
    }

    /// Renders the filter document
    pub fn render(&self, ctx: &ResolutionContext) -> Value {
        match self {
            Predicate::Empty => Value::Object(Map::new()),
            Predicate::Field { field, condition } => {
                let mut map = Map::with_capacity(1);
                map.insert(ctx.alias(field).into_owned(), condition.express(ctx));
                Value::Object(map)
            }
            Predicate::Raw(document) => Value::Object(
                document
                    .iter()
                    .map(|(k, v)| (ctx.alias(k).into_owned(), v.clone()))
                    .collect(),
            ),
            Predicate::Expr(expression) => {
                let mut map = Map::with_capacity(1);
                map.insert("$expr".to_string(), expression.express(ctx));
                Value::Object(map)
            }
            Predicate::Combined { op, clauses } => {
                let rendered = clauses.iter().map(|c| c.render(ctx)).collect();
                let mut map = Map::with_capacity(1);
                map.insert(op.as_str().to_string(), Value::Array(rendered));
                Value::Object(map)
            }
        }
    }
}

impl Expression for Predicate {
    fn to_representation(&self) -> Repr {
        match self {
            Predicate::Empty => Repr::Document(Vec::new()),
            Predicate::Field { field, condition } => Repr::keyed(field.clone(), condition.clone()),
            Predicate::Raw(document) => Repr::Value(Value::Object(document.clone())),
            Predicate::Expr(expression) => Repr::keyed("$expr", expression.clone()),
            Predicate::Combined { op, clauses } => Repr::keyed(
                op.as_str(),
                Repr::Array(clauses.iter().map(|c| Repr::node(c.clone())).collect()),
            ),
        }
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        self.render(ctx)
    }

    fn is_empty(&self) -> bool {
        match self {
            Predicate::Empty => true,
            Predicate::Field { .. } => false,
            Predicate::Raw(document) => document.is_empty(),
            Predicate::Expr(expression) => expression.is_empty(),
            Predicate::Combined { clauses, .. } => clauses.is_empty(),
        }
    }
}

impl From<Predicate> for Repr {
    fn from(predicate: Predicate) -> Self {
        Repr::node(predicate)
    }
}

impl TryFrom<Value> for Predicate {
    type Error = PredicateError;

    fn try_from(value: Value) -> PredicateResult<Self> {
        Predicate::from_document(&value)
    }
}

impl BitAnd for Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Predicate) -> Predicate {
        self.and(rhs)
    }
}

impl BitOr for Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Predicate) -> Predicate {
        self.or(rhs)
    }
}

/// Renders a predicate through a resolution context
pub fn express_filter(predicate: &Predicate, ctx: &ResolutionContext) -> Value {
    predicate.render(ctx)
}

/// Conjunction of two predicates
pub fn and(a: Predicate, b: Predicate) -> Predicate {
    Predicate::combine(LogicalOp::And, a, b)
}

/// Disjunction of two predicates
pub fn or(a: Predicate, b: Predicate) -> Predicate {
    Predicate::combine(LogicalOp::Or, a, b)
}

/// Folds any number of predicates with AND (empty input gives `Empty`)
pub fn all_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    predicates.into_iter().fold(Predicate::Empty, and)
}

/// Folds any number of predicates with OR (empty input gives `Empty`)
pub fn any_of(predicates: impl IntoIterator<Item = Predicate>) -> Predicate {
    predicates.into_iter().fold(Predicate::Empty, or)
}
