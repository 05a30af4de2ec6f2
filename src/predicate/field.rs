//! Fluent field conditions
//!
//! `field("age").gt(30)` is sugar for
//! `Predicate::field("age", QueryOp::Gt(LiteralInput::for_field("age", 30)))`.
//! Every value passed here is bound to the field, so the field's query
//! normalizers apply when the filter is rendered.

use serde_json::Value;

use crate::expression::{LiteralInput, Repr};
use crate::operators::{QueryOp, TimeRange};

use super::combinator::Predicate;

/// Builder for single-field predicates
#[derive(Debug, Clone)]
pub struct FieldCondition {
    name: String,
}

/// Starts a condition on `name`
pub fn field(name: impl Into<String>) -> FieldCondition {
    FieldCondition { name: name.into() }
}

impl FieldCondition {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn bound(&self, value: impl Into<Value>) -> Repr {
        LiteralInput::for_field(self.name.clone(), value).into()
    }

    fn bound_list<V: Into<Value>>(&self, values: impl IntoIterator<Item = V>) -> Repr {
        let items: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.bound(Value::Array(items))
    }

    fn with(self, op: QueryOp) -> Predicate {
        Predicate::field(self.name, op)
    }

    /// Plain equality, rendered `{field: value}`
    pub fn eq(self, value: impl Into<Value>) -> Predicate {
        let condition = self.bound(value);
        Predicate::field(self.name, condition)
    }

    pub fn ne(self, value: impl Into<Value>) -> Predicate {
        let v = self.bound(value);
        self.with(QueryOp::Ne(v))
    }

    pub fn gt(self, value: impl Into<Value>) -> Predicate {
        let v = self.bound(value);
        self.with(QueryOp::Gt(v))
    }

    pub fn gte(self, value: impl Into<Value>) -> Predicate {
        let v = self.bound(value);
        self.with(QueryOp::Gte(v))
    }

    pub fn lt(self, value: impl Into<Value>) -> Predicate {
        let v = self.bound(value);
        self.with(QueryOp::Lt(v))
    }

    pub fn lte(self, value: impl Into<Value>) -> Predicate {
        let v = self.bound(value);
        self.with(QueryOp::Lte(v))
    }

    pub fn is_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        let v = self.bound_list(values);
        self.with(QueryOp::In(v))
    }

    pub fn not_in<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        let v = self.bound_list(values);
        self.with(QueryOp::Nin(v))
    }

    pub fn all<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        let v = self.bound_list(values);
        self.with(QueryOp::All(v))
    }

    pub fn not_all<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Predicate {
        let v = self.bound_list(values);
        self.with(QueryOp::NotAll(v))
    }

    pub fn exists(self) -> Predicate {
        self.with(QueryOp::Exists(true))
    }

    pub fn not_exists(self) -> Predicate {
        self.with(QueryOp::Exists(false))
    }

    pub fn is_true(self) -> Predicate {
        self.eq(true)
    }

    pub fn is_false(self) -> Predicate {
        self.eq(false)
    }

    /// `{field: null}`: matches null and missing fields alike
    pub fn is_none_or_missing(self) -> Predicate {
        Predicate::field(self.name, Repr::null())
    }

    pub fn within(self, range: TimeRange) -> Predicate {
        self.with(QueryOp::Within(range))
    }

    /// Any prebuilt condition. Literals inside it are taken as given.
    pub fn matches(self, op: QueryOp) -> Predicate {
        self.with(op)
    }
}

/// `{field: value}`
pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Predicate {
    field(name).eq(value)
}

/// `{field: {"$gt": value}}`
pub fn greater_than(name: impl Into<String>, value: impl Into<Value>) -> Predicate {
    field(name).gt(value)
}

/// `{field: {"$lt": value}}`
pub fn less_than(name: impl Into<String>, value: impl Into<Value>) -> Predicate {
    field(name).lt(value)
}
