//! Alias and value-transformer resolution context
//!
//! Maps a logical field name to its wire name and to an ordered list of
//! value transformers. Lookups never fail: a field with no alias resolves
//! to itself and a field with no transformers leaves literals untouched.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A pure value-to-value function applied to literals at resolution time
pub type Transformer = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Resolution entry for a single logical field
#[derive(Clone, Default)]
pub struct FieldResolution {
    /// Wire-protocol name, if different from the logical name
    pub alias: Option<String>,
    /// Transformers applied in order to literals bound to this field
    pub transformers: Vec<Transformer>,
}

impl fmt::Debug for FieldResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldResolution")
            .field("alias", &self.alias)
            .field("transformers", &self.transformers.len())
            .finish()
    }
}

/// Field alias and transformer lookup used when rendering expression trees
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    fields: HashMap<String, FieldResolution>,
}

impl ResolutionContext {
    /// Creates an empty context (every name resolves to itself)
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a wire alias for a logical field
    pub fn with_alias(mut self, field: impl Into<String>, alias: impl Into<String>) -> Self {
        self.fields.entry(field.into()).or_default().alias = Some(alias.into());
        self
    }

    /// Appends a transformer to a field's chain
    pub fn with_transformer(mut self, field: impl Into<String>, transformer: Transformer) -> Self {
        self.fields
            .entry(field.into())
            .or_default()
            .transformers
            .push(transformer);
        self
    }

    /// Registers a full resolution entry, replacing any previous one
    pub fn with_field(mut self, field: impl Into<String>, resolution: FieldResolution) -> Self {
        self.fields.insert(field.into(), resolution);
        self
    }

    /// Resolves a logical field name (or dotted path) to its wire name.
    ///
    /// A dotted path with no entry of its own has its head segment aliased.
    pub fn alias<'a>(&'a self, field: &'a str) -> Cow<'a, str> {
        if let Some(alias) = self.fields.get(field).and_then(|r| r.alias.as_deref()) {
            return Cow::Borrowed(alias);
        }

        if let Some((head, rest)) = field.split_once('.') {
            if let Some(alias) = self.fields.get(head).and_then(|r| r.alias.as_deref()) {
                return Cow::Owned(format!("{}.{}", alias, rest));
            }
        }

        Cow::Borrowed(field)
    }

    /// Returns the transformer chain for a field (empty if none)
    pub fn transformers(&self, field: &str) -> &[Transformer] {
        self.fields
            .get(field)
            .map(|r| r.transformers.as_slice())
            .unwrap_or(&[])
    }

    /// Applies a field's transformer chain to a literal.
    ///
    /// Arrays are transformed element-wise.
    pub fn transform(&self, field: &str, value: Value) -> Value {
        let chain = self.transformers(field);
        if chain.is_empty() {
            return value;
        }

        match value {
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| coalesce(item, chain))
                    .collect(),
            ),
            other => coalesce(other, chain),
        }
    }

    /// Returns true if no field has an entry
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Applies transformers sequentially to a value
pub(crate) fn coalesce(value: Value, transformers: &[Transformer]) -> Value {
    transformers.iter().fold(value, |acc, t| t(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upper() -> Transformer {
        Arc::new(|v: Value| match v {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        })
    }

    #[test]
    fn test_unregistered_field_resolves_to_itself() {
        let ctx = ResolutionContext::new();
        assert_eq!(ctx.alias("name"), "name");
        assert_eq!(ctx.transform("name", json!("abc")), json!("abc"));
    }

    #[test]
    fn test_alias_lookup() {
        let ctx = ResolutionContext::new().with_alias("id", "_id");
        assert_eq!(ctx.alias("id"), "_id");
    }

    #[test]
    fn test_dotted_path_aliases_head_segment() {
        let ctx = ResolutionContext::new().with_alias("address", "addr");
        assert_eq!(ctx.alias("address.city"), "addr.city");
        assert_eq!(ctx.alias("other.city"), "other.city");
    }

    #[test]
    fn test_transformers_apply_in_order() {
        let suffix: Transformer = Arc::new(|v: Value| match v {
            Value::String(s) => Value::String(format!("{}-x", s)),
            other => other,
        });
        let ctx = ResolutionContext::new()
            .with_transformer("code", upper())
            .with_transformer("code", suffix);

        assert_eq!(ctx.transform("code", json!("ab")), json!("AB-x"));
    }

    #[test]
    fn test_array_transformed_element_wise() {
        let ctx = ResolutionContext::new().with_transformer("code", upper());
        assert_eq!(ctx.transform("code", json!(["a", "b"])), json!(["A", "B"]));
    }
}
