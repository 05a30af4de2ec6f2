//! Representation tree for expressions
//!
//! `Repr` is what a node produces before resolution: a literal, a list, an
//! ordered document, or another node. `Repr::express` walks the tree and
//! resolves every node through the context.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::context::ResolutionContext;

/// A node convertible to a wire-protocol value.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Returns the unresolved representation of this node.
    fn to_representation(&self) -> Repr;

    /// Resolves this node through the context into a plain value.
    fn express(&self, ctx: &ResolutionContext) -> Value {
        self.to_representation().express(ctx)
    }

    /// Returns true if the node carries no content.
    fn is_empty(&self) -> bool {
        self.to_representation().is_empty()
    }
}

/// Unresolved expression representation
#[derive(Debug, Clone)]
pub enum Repr {
    /// A literal wire value, emitted verbatim
    Value(Value),
    /// An ordered list of representations
    Array(Vec<Repr>),
    /// An ordered document of representations
    Document(Vec<(String, Repr)>),
    /// A nested expression node
    Node(Arc<dyn Expression>),
}

impl Repr {
    /// Wraps any expression node.
    pub fn node(expr: impl Expression + 'static) -> Self {
        Repr::Node(Arc::new(expr))
    }

    /// Wraps a literal value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Repr::Value(value.into())
    }

    /// The null literal.
    pub fn null() -> Self {
        Repr::Value(Value::Null)
    }

    /// Builds a single-key document `{key: value}`.
    pub fn keyed(key: impl Into<String>, value: impl Into<Repr>) -> Self {
        Repr::Document(vec![(key.into(), value.into())])
    }

    /// Resolves the tree into a plain wire value.
    pub fn express(&self, ctx: &ResolutionContext) -> Value {
        match self {
            Repr::Value(v) => v.clone(),
            Repr::Array(items) => Value::Array(items.iter().map(|r| r.express(ctx)).collect()),
            Repr::Document(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.express(ctx));
                }
                Value::Object(map)
            }
            Repr::Node(node) => node.express(ctx),
        }
    }

    /// Returns true for null, an empty list, or an empty document.
    pub fn is_empty(&self) -> bool {
        match self {
            Repr::Value(Value::Null) => true,
            Repr::Value(Value::Array(a)) => a.is_empty(),
            Repr::Value(Value::Object(o)) => o.is_empty(),
            Repr::Value(_) => false,
            Repr::Array(items) => items.is_empty(),
            Repr::Document(entries) => entries.is_empty(),
            Repr::Node(node) => node.is_empty(),
        }
    }
}

impl Expression for Repr {
    fn to_representation(&self) -> Repr {
        self.clone()
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        Repr::express(self, ctx)
    }

    fn is_empty(&self) -> bool {
        Repr::is_empty(self)
    }
}

/// Builds an ordered document from key/representation pairs.
pub fn doc<K, I>(entries: I) -> Repr
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Repr)>,
{
    Repr::Document(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
}

impl From<Value> for Repr {
    fn from(value: Value) -> Self {
        Repr::Value(value)
    }
}

impl From<i64> for Repr {
    fn from(value: i64) -> Self {
        Repr::Value(Value::from(value))
    }
}

impl From<i32> for Repr {
    fn from(value: i32) -> Self {
        Repr::Value(Value::from(value))
    }
}

impl From<u64> for Repr {
    fn from(value: u64) -> Self {
        Repr::Value(Value::from(value))
    }
}

impl From<f64> for Repr {
    fn from(value: f64) -> Self {
        Repr::Value(Value::from(value))
    }
}

impl From<bool> for Repr {
    fn from(value: bool) -> Self {
        Repr::Value(Value::Bool(value))
    }
}

impl From<Vec<Repr>> for Repr {
    fn from(items: Vec<Repr>) -> Self {
        Repr::Array(items)
    }
}
