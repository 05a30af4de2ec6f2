//! Leaf expressions: field references and literals

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use super::context::ResolutionContext;
use super::repr::{Expression, Repr};

/// Prefix marking a computed field reference
pub const FIELD_PATH_SIGIL: char = '$';

/// Computed reference to a field, rendered as `"$<alias>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }

    /// Returns the logical field name
    pub fn field(&self) -> &str {
        &self.0
    }
}

impl Expression for FieldPath {
    fn to_representation(&self) -> Repr {
        Repr::Value(Value::String(format!("{}{}", FIELD_PATH_SIGIL, self.0)))
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        Value::String(format!("{}{}", FIELD_PATH_SIGIL, ctx.alias(&self.0)))
    }
}

/// Plain field name, rendered as the resolved alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(field: impl Into<String>) -> Self {
        Self(field.into())
    }

    pub fn field(&self) -> &str {
        &self.0
    }
}

impl Expression for FieldName {
    fn to_representation(&self) -> Repr {
        Repr::Value(Value::String(self.0.clone()))
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        Value::String(ctx.alias(&self.0).into_owned())
    }
}

/// A literal value, optionally bound to a field.
///
/// Only a bound literal receives the field's transformer chain.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralInput {
    field: Option<String>,
    value: Value,
}

impl LiteralInput {
    /// An unbound literal; never transformed
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            field: None,
            value: value.into(),
        }
    }

    /// A literal bound to `field` for transformer treatment
    pub fn for_field(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: Some(field.into()),
            value: value.into(),
        }
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Expression for LiteralInput {
    fn to_representation(&self) -> Repr {
        Repr::Value(self.value.clone())
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        match &self.field {
            Some(field) => ctx.transform(field, self.value.clone()),
            None => self.value.clone(),
        }
    }
}

/// Explicit literal wrapper, used where a bare string would otherwise be
/// promoted to a field reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal(pub Value);

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }
}

impl Expression for Literal {
    fn to_representation(&self) -> Repr {
        Repr::Value(self.0.clone())
    }
}

impl From<FieldPath> for Repr {
    fn from(value: FieldPath) -> Self {
        Repr::node(value)
    }
}

impl From<FieldName> for Repr {
    fn from(value: FieldName) -> Self {
        Repr::node(value)
    }
}

impl From<LiteralInput> for Repr {
    fn from(value: LiteralInput) -> Self {
        Repr::node(value)
    }
}

impl From<Literal> for Repr {
    fn from(value: Literal) -> Self {
        Repr::Value(value.0)
    }
}

/// A bare field name operand is promoted to a field reference
impl From<&str> for Repr {
    fn from(field: &str) -> Self {
        Repr::node(FieldPath::new(field))
    }
}

impl From<String> for Repr {
    fn from(field: String) -> Self {
        Repr::node(FieldPath::new(field))
    }
}

/// Renders a timestamp in extended JSON date form
pub fn date_value(time: &DateTime<Utc>) -> Value {
    json!({ "$date": time.to_rfc3339_opts(SecondsFormat::Millis, true) })
}
