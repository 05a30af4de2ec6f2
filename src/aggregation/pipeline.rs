//! Immutable aggregation pipeline builder

use std::ops::BitOr;
use std::sync::Arc;

use serde_json::Value;

use crate::expression::{doc, Expression, FieldName, FieldPath, Repr, ResolutionContext};
use crate::predicate::Predicate;
use crate::sort::SortOp;

use super::errors::{AggregationError, AggregationResult};
use super::stage::{Stage, StageBody, StageName};

/// Output field used by `lookup` when none is given
pub const DEFAULT_LOOKUP_OUTPUT: &str = "result";

/// An ordered, append-only list of stages.
///
/// Every stage method returns a new pipeline; stages are shared between a
/// pipeline and the pipelines derived from it. No-op stages are dropped at
/// append time.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    stages: Vec<Arc<Stage>>,
}

impl Aggregation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a pipeline from rendered stage documents.
    ///
    /// `$match` and `$sort` bodies are parsed back into their typed forms.
    pub fn from_pipeline(stages: Vec<Value>) -> AggregationResult<Self> {
        let mut parsed = Vec::with_capacity(stages.len());
        for (index, stage) in stages.into_iter().enumerate() {
            let (key, body) = match stage {
                Value::Object(map) if map.len() == 1 => match map.into_iter().next() {
                    Some(entry) => entry,
                    None => return Err(AggregationError::malformed_stage(index, "empty stage")),
                },
                _ => {
                    return Err(AggregationError::malformed_stage(
                        index,
                        "stage must be a single-key document",
                    ))
                }
            };

            let name = StageName::from_key(&key).ok_or_else(|| {
                AggregationError::malformed_stage(index, format!("unknown stage '{}'", key))
            })?;

            let body = match name {
                StageName::Match => StageBody::Filter(
                    Predicate::from_document(&body)
                        .map_err(|e| AggregationError::malformed_stage(index, e.to_string()))?,
                ),
                StageName::Sort => StageBody::Sort(
                    SortOp::try_from(body)
                        .map_err(|e| AggregationError::malformed_stage(index, e.to_string()))?,
                ),
                _ => StageBody::Expr(Repr::Value(body)),
            };
            parsed.push(Arc::new(Stage::new(name, body)));
        }
        Ok(Self { stages: parsed })
    }

    fn append(&self, name: StageName, body: StageBody) -> Self {
        let mut stages = self.stages.clone();
        stages.push(Arc::new(Stage::new(name, body)));
        Self { stages }
    }

    fn append_expr(&self, name: StageName, body: impl Into<Repr>) -> Self {
        self.append(name, StageBody::Expr(body.into()))
    }

    /// `$match`; an empty predicate appends nothing
    pub fn matching(&self, predicate: Predicate) -> Self {
        if predicate.is_empty() {
            return self.clone();
        }
        self.append(StageName::Match, StageBody::Filter(predicate))
    }

    /// `$group` with an `_id` key followed by the named accumulators
    pub fn group<K, I>(&self, id: impl Into<Repr>, accumulators: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Repr)>,
    {
        let mut body = vec![("_id".to_string(), id.into())];
        body.extend(accumulators.into_iter().map(|(k, v)| (k.into(), v)));
        self.append_expr(StageName::Group, Repr::Document(body))
    }

    /// `$group` with a caller-built body
    pub fn group_by(&self, body: impl Into<Repr>) -> Self {
        self.append_expr(StageName::Group, body)
    }

    /// `$sort`; an empty sort appends nothing
    pub fn sort(&self, sort: SortOp) -> Self {
        if sort.is_empty() {
            return self.clone();
        }
        self.append(StageName::Sort, StageBody::Sort(sort))
    }

    /// `$limit`; zero appends nothing
    pub fn limit(&self, limit: u64) -> Self {
        if limit == 0 {
            return self.clone();
        }
        self.append_expr(StageName::Limit, limit)
    }

    /// `$skip`; always appended, including zero
    pub fn skip(&self, skip: u64) -> Self {
        self.append_expr(StageName::Skip, skip)
    }

    pub fn project(&self, projection: impl Into<Repr>) -> Self {
        self.append_expr(StageName::Project, projection)
    }

    pub fn add_fields(&self, fields: impl Into<Repr>) -> Self {
        self.append_expr(StageName::AddFields, fields)
    }

    /// `$unwind` on a field, rendered as a field reference
    pub fn unwind(&self, field: impl Into<String>) -> Self {
        self.append_expr(StageName::Unwind, FieldPath::new(field))
    }

    /// Equality join into the default `result` field
    pub fn lookup(&self, from: &str, local_field: &str, foreign_field: &str) -> Self {
        self.lookup_as(from, local_field, foreign_field, DEFAULT_LOOKUP_OUTPUT)
    }

    /// Equality join into `output`. The local field is alias-resolved; the
    /// foreign field belongs to another collection and is taken verbatim.
    pub fn lookup_as(&self, from: &str, local_field: &str, foreign_field: &str, output: &str) -> Self {
        let body = doc([
            ("from", Repr::literal(from)),
            ("localField", Repr::from(FieldName::new(local_field))),
            ("foreignField", Repr::literal(foreign_field)),
            ("as", Repr::literal(output)),
        ]);
        self.append_expr(StageName::Lookup, body)
    }

    pub fn merge(&self, spec: impl Into<Repr>) -> Self {
        self.append_expr(StageName::Merge, spec)
    }

    pub fn out(&self, collection: &str) -> Self {
        self.append_expr(StageName::Out, Repr::literal(collection))
    }

    /// `$sample`; zero appends nothing
    pub fn sample(&self, size: u64) -> Self {
        if size == 0 {
            return self.clone();
        }
        self.append_expr(StageName::Sample, Repr::keyed("size", size))
    }

    pub fn graph_lookup(&self, spec: impl Into<Repr>) -> Self {
        self.append_expr(StageName::GraphLookup, spec)
    }

    pub fn replace_root(&self, spec: impl Into<Repr>) -> Self {
        self.append_expr(StageName::ReplaceRoot, spec)
    }

    /// `$count` into the given output field
    pub fn count(&self, output: &str) -> Self {
        self.append_expr(StageName::Count, Repr::literal(output))
    }

    /// Appends all of `other`'s stages after this pipeline's
    pub fn then(&self, other: &Aggregation) -> Self {
        let mut stages = self.stages.clone();
        stages.extend(other.stages.iter().cloned());
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter().map(|s| s.as_ref())
    }

    /// Renders every stage through the context
    pub fn render(&self, ctx: &ResolutionContext) -> Vec<Value> {
        self.stages.iter().map(|s| s.render(ctx)).collect()
    }

    /// Renders with an empty context
    pub fn pipeline(&self) -> Vec<Value> {
        self.render(&ResolutionContext::new())
    }
}

impl BitOr for Aggregation {
    type Output = Aggregation;

    fn bitor(self, rhs: Aggregation) -> Aggregation {
        self.then(&rhs)
    }
}

impl BitOr for &Aggregation {
    type Output = Aggregation;

    fn bitor(self, rhs: &Aggregation) -> Aggregation {
        self.then(rhs)
    }
}
