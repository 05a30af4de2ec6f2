use std::ops::BitAnd;

use serde_json::{Map, Value};

use crate::expression::{Expression, Repr, ResolutionContext};
use crate::predicate::kind_of;

use super::errors::{SortError, SortResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Wire form: 1 or -1
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }

    pub fn from_i64(direction: i64) -> Option<Self> {
        match direction {
            1 => Some(SortDirection::Ascending),
            -1 => Some(SortDirection::Descending),
            _ => None,
        }
    }
}

/// Ordered sort specification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOp {
    keys: Vec<(String, SortDirection)>,
}

impl SortOp {
    /// The empty sort
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortDirection::Ascending)],
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            keys: vec![(field.into(), SortDirection::Descending)],
        }
    }

    /// Merges `other` into this sort; on collision the right direction wins
    pub fn merge(mut self, other: SortOp) -> SortOp {
        for (field, direction) in other.keys {
            match self.keys.iter_mut().find(|(f, _)| *f == field) {
                Some(entry) => entry.1 = direction,
                None => self.keys.push((field, direction)),
            }
        }
        self
    }

    pub fn direction(&self, field: &str) -> Option<SortDirection> {
        self.keys
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, d)| *d)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Logical field names in sort order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(|(f, _)| f.as_str())
    }

    /// Positional form: `(wire name, 1 | -1)` in sort order
    pub fn ordered_pairs(&self, ctx: &ResolutionContext) -> Vec<(String, i32)> {
        self.keys
            .iter()
            .map(|(field, direction)| (ctx.alias(field).into_owned(), direction.as_i32()))
            .collect()
    }

    /// Associative form: `{wire name: 1 | -1, ...}`
    pub fn render(&self, ctx: &ResolutionContext) -> Value {
        let map: Map<String, Value> = self
            .ordered_pairs(ctx)
            .into_iter()
            .map(|(name, direction)| (name, Value::from(direction)))
            .collect();
        Value::Object(map)
    }
}

impl Expression for SortOp {
    fn to_representation(&self) -> Repr {
        Repr::Document(
            self.keys
                .iter()
                .map(|(f, d)| (f.clone(), Repr::from(d.as_i32())))
                .collect(),
        )
    }

    fn express(&self, ctx: &ResolutionContext) -> Value {
        self.render(ctx)
    }

    fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<SortOp> for Repr {
    fn from(sort: SortOp) -> Self {
        Repr::node(sort)
    }
}

impl BitAnd for SortOp {
    type Output = SortOp;

    fn bitand(self, rhs: SortOp) -> SortOp {
        self.merge(rhs)
    }
}

impl TryFrom<Value> for SortOp {
    type Error = SortError;

    /// Accepts only `{field: 1 | -1, ...}`
    fn try_from(value: Value) -> SortResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            other => return Err(SortError::invalid_spec(kind_of(&other))),
        };

        let mut keys = Vec::with_capacity(map.len());
        for (field, direction) in map {
            let parsed = direction.as_i64().and_then(SortDirection::from_i64);
            match parsed {
                Some(d) => keys.push((field, d)),
                None => return Err(SortError::invalid_direction(&field, &direction)),
            }
        }
        Ok(SortOp { keys })
    }
}

/// Renders a sort as positional pairs through a resolution context
pub fn express_sort(sort: &SortOp, ctx: &ResolutionContext) -> Vec<(String, i32)> {
    sort.ordered_pairs(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortErrorCode;
    use serde_json::json;

    #[test]
    fn test_disjoint_merge_keeps_all_keys_in_order() {
        let ctx = ResolutionContext::new();
        let sort = SortOp::asc("a") & SortOp::desc("b");
        assert_eq!(
            sort.ordered_pairs(&ctx),
            vec![("a".to_string(), 1), ("b".to_string(), -1)]
        );
    }

    #[test]
    fn test_collision_takes_right_direction_at_first_position() {
        let ctx = ResolutionContext::new();
        let sort = SortOp::asc("a") & SortOp::asc("b") & SortOp::desc("a");
        assert_eq!(sort.render(&ctx), json!({"a": -1, "b": 1}));
        assert_eq!(sort.direction("a"), Some(SortDirection::Descending));
    }

    #[test]
    fn test_empty_is_identity() {
        let s = SortOp::desc("x");
        assert_eq!(SortOp::new() & s.clone(), s);
        assert_eq!(s.clone() & SortOp::new(), s);
    }

    #[test]
    fn test_pairs_are_aliased() {
        let ctx = ResolutionContext::new().with_alias("created", "c_at");
        assert_eq!(
            express_sort(&SortOp::desc("created"), &ctx),
            vec![("c_at".to_string(), -1)]
        );
    }

    #[test]
    fn test_try_from_document() {
        let sort = SortOp::try_from(json!({"b": -1, "a": 1})).unwrap();
        assert_eq!(sort.fields().collect::<Vec<_>>(), vec!["b", "a"]);

        let err = SortOp::try_from(json!({"a": 2})).unwrap_err();
        assert_eq!(err.code(), SortErrorCode::WeftSortInvalidDirection);

        let err = SortOp::try_from(json!("a")).unwrap_err();
        assert_eq!(err.code(), SortErrorCode::WeftSortInvalidSpec);
    }
}
