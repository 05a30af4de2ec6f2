//! Query operators: the condition half of a `{field: condition}` filter clause

use chrono::{DateTime, Utc};

use crate::expression::{date_value, Expression, Repr};

/// A condition applied to a single field inside a filter
#[derive(Debug, Clone)]
pub enum QueryOp {
    Eq(Repr),
    Ne(Repr),
    Gt(Repr),
    Gte(Repr),
    Lt(Repr),
    Lte(Repr),
    In(Repr),
    Nin(Repr),
    All(Repr),
    /// `{"$not": {"$all": [...]}}`
    NotAll(Repr),
    Exists(bool),
    Not(Box<QueryOp>),
    Regex {
        pattern: String,
        options: Option<String>,
    },
    Within(TimeRange),
    /// Several conditions on the same field, rendered into one document
    Conjunction(Vec<QueryOp>),
}

impl QueryOp {
    pub fn regex(pattern: impl Into<String>) -> Self {
        QueryOp::Regex {
            pattern: pattern.into(),
            options: None,
        }
    }

    pub fn regex_with(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        QueryOp::Regex {
            pattern: pattern.into(),
            options: Some(options.into()),
        }
    }

    pub fn negate(self) -> Self {
        QueryOp::Not(Box::new(self))
    }

    /// Adds another condition on the same field
    pub fn and(self, other: QueryOp) -> Self {
        match self {
            QueryOp::Conjunction(mut ops) => {
                ops.push(other);
                QueryOp::Conjunction(ops)
            }
            single => QueryOp::Conjunction(vec![single, other]),
        }
    }

    fn entries(&self) -> Vec<(String, Repr)> {
        let one = |key: &str, value: &Repr| vec![(key.to_string(), value.clone())];
        match self {
            QueryOp::Eq(v) => one("$eq", v),
            QueryOp::Ne(v) => one("$ne", v),
            QueryOp::Gt(v) => one("$gt", v),
            QueryOp::Gte(v) => one("$gte", v),
            QueryOp::Lt(v) => one("$lt", v),
            QueryOp::Lte(v) => one("$lte", v),
            QueryOp::In(v) => one("$in", v),
            QueryOp::Nin(v) => one("$nin", v),
            QueryOp::All(v) => one("$all", v),
            QueryOp::NotAll(v) => one("$not", &Repr::keyed("$all", v.clone())),
            QueryOp::Exists(flag) => one("$exists", &Repr::from(*flag)),
            QueryOp::Not(inner) => vec![("$not".to_string(), Repr::Document(inner.entries()))],
            QueryOp::Regex { pattern, options } => {
                let mut entries = one("$regex", &Repr::literal(pattern.as_str()));
                if let Some(options) = options {
                    entries.push(("$options".to_string(), Repr::literal(options.as_str())));
                }
                entries
            }
            QueryOp::Within(range) => range.entries(),
            QueryOp::Conjunction(ops) => ops.iter().flat_map(QueryOp::entries).collect(),
        }
    }
}

impl Expression for QueryOp {
    fn to_representation(&self) -> Repr {
        Repr::Document(self.entries())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bound {
    at: DateTime<Utc>,
    inclusive: bool,
}

/// A time window with independently inclusive or exclusive bounds.
///
/// Repeated calls narrow the window: a lower bound only moves later and an
/// upper bound only moves earlier. At the same instant an exclusive bound is
/// tighter than an inclusive one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl TimeRange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strictly after `at`
    pub fn after(self, at: DateTime<Utc>) -> Self {
        self.narrow_lower(Bound { at, inclusive: false })
    }

    /// At or after `at`
    pub fn iafter(self, at: DateTime<Utc>) -> Self {
        self.narrow_lower(Bound { at, inclusive: true })
    }

    /// Strictly before `at`
    pub fn before(self, at: DateTime<Utc>) -> Self {
        self.narrow_upper(Bound { at, inclusive: false })
    }

    /// At or before `at`
    pub fn ibefore(self, at: DateTime<Utc>) -> Self {
        self.narrow_upper(Bound { at, inclusive: true })
    }

    /// Half-open window `[start, end)`
    pub fn period(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self::new().iafter(start).before(end)
    }

    pub fn lower(&self) -> Option<(DateTime<Utc>, bool)> {
        self.lower.map(|b| (b.at, b.inclusive))
    }

    pub fn upper(&self) -> Option<(DateTime<Utc>, bool)> {
        self.upper.map(|b| (b.at, b.inclusive))
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    fn narrow_lower(mut self, bound: Bound) -> Self {
        let replace = match self.lower {
            None => true,
            Some(cur) => bound.at > cur.at || (bound.at == cur.at && !bound.inclusive),
        };
        if replace {
            self.lower = Some(bound);
        }
        self
    }

    fn narrow_upper(mut self, bound: Bound) -> Self {
        let replace = match self.upper {
            None => true,
            Some(cur) => bound.at < cur.at || (bound.at == cur.at && !bound.inclusive),
        };
        if replace {
            self.upper = Some(bound);
        }
        self
    }

    fn entries(&self) -> Vec<(String, Repr)> {
        let mut entries = Vec::with_capacity(2);
        if let Some(lower) = self.lower {
            let key = if lower.inclusive { "$gte" } else { "$gt" };
            entries.push((key.to_string(), Repr::Value(date_value(&lower.at))));
        }
        if let Some(upper) = self.upper {
            let key = if upper.inclusive { "$lte" } else { "$lt" };
            entries.push((key.to_string(), Repr::Value(date_value(&upper.at))));
        }
        entries
    }
}

impl Expression for TimeRange {
    fn to_representation(&self) -> Repr {
        Repr::Document(self.entries())
    }
}

impl_into_repr!(QueryOp, TimeRange);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{Literal, ResolutionContext};
    use chrono::TimeZone;
    use serde_json::json;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_comparison_shapes() {
        let ctx = ResolutionContext::new();
        assert_eq!(QueryOp::Gt(Repr::from(3)).express(&ctx), json!({"$gt": 3}));
        assert_eq!(
            QueryOp::In(Repr::literal(json!([1, 2]))).express(&ctx),
            json!({"$in": [1, 2]})
        );
        assert_eq!(QueryOp::Exists(false).express(&ctx), json!({"$exists": false}));
    }

    #[test]
    fn test_not_all_and_negation() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            QueryOp::NotAll(Repr::literal(json!(["a"]))).express(&ctx),
            json!({"$not": {"$all": ["a"]}})
        );
        assert_eq!(
            QueryOp::Gte(Repr::from(Literal::new(5))).negate().express(&ctx),
            json!({"$not": {"$gte": 5}})
        );
    }

    #[test]
    fn test_regex_with_options() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            QueryOp::regex_with("^ab", "i").express(&ctx),
            json!({"$regex": "^ab", "$options": "i"})
        );
        assert_eq!(QueryOp::regex("x$").express(&ctx), json!({"$regex": "x$"}));
    }

    #[test]
    fn test_conjunction_merges_into_one_document() {
        let ctx = ResolutionContext::new();
        let op = QueryOp::Gte(Repr::from(1)).and(QueryOp::Lt(Repr::from(9)));
        assert_eq!(op.express(&ctx), json!({"$gte": 1, "$lt": 9}));
    }

    #[test]
    fn test_time_range_narrowing_keeps_tighter_bound() {
        let range = TimeRange::new().after(day(2)).after(day(1)).before(day(9)).before(day(20));
        assert_eq!(range.lower(), Some((day(2), false)));
        assert_eq!(range.upper(), Some((day(9), false)));

        let tightened = TimeRange::new().iafter(day(2)).after(day(2));
        assert_eq!(tightened.lower(), Some((day(2), false)));

        let kept = TimeRange::new().after(day(2)).iafter(day(2));
        assert_eq!(kept.lower(), Some((day(2), false)));
    }

    #[test]
    fn test_time_range_rendering() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            TimeRange::period(day(1), day(2)).express(&ctx),
            json!({
                "$gte": {"$date": "2024-01-01T00:00:00.000Z"},
                "$lt": {"$date": "2024-01-02T00:00:00.000Z"}
            })
        );
        assert!(TimeRange::new().is_empty());
        assert_eq!(TimeRange::new().express(&ctx), json!({}));
    }
}
