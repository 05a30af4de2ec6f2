//! Fluent read directive

use std::sync::Arc;

use serde_json::Value;

use crate::aggregation::Aggregation;
use crate::observability::{log_event_with_fields, Event};
use crate::predicate::Predicate;
use crate::schema::EntitySchema;
use crate::sort::SortOp;

/// Output field of the count stage
pub const COUNT_FIELD: &str = "count";

#[derive(Debug, Clone)]
pub struct LoadDirective {
    schema: Arc<EntitySchema>,
    aggregation: Aggregation,
}

impl LoadDirective {
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            aggregation: Aggregation::new(),
        }
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn collection(&self) -> &str {
        self.schema.collection()
    }

    /// Appends a `$match` stage. An empty predicate adds nothing.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.aggregation = self.aggregation.matching(predicate);
        self
    }

    pub fn sort(mut self, sort: SortOp) -> Self {
        self.aggregation = self.aggregation.sort(sort);
        self
    }

    /// Sorts on a single field
    pub fn sort_by(self, field: &str, descending: bool) -> Self {
        let sort = if descending {
            SortOp::desc(field)
        } else {
            SortOp::asc(field)
        };
        self.sort(sort)
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.aggregation = self.aggregation.skip(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.aggregation = self.aggregation.limit(limit);
        self
    }

    pub fn sample(mut self, size: u64) -> Self {
        self.aggregation = self.aggregation.sample(size);
        self
    }

    /// Appends every stage of `aggregation`
    pub fn aggregation(mut self, aggregation: &Aggregation) -> Self {
        self.aggregation = self.aggregation.then(aggregation);
        self
    }

    pub fn stages(&self) -> &Aggregation {
        &self.aggregation
    }

    /// Renders the pipeline, with `post` appended for this rendering only
    pub fn pipeline(&self, post: Option<&Aggregation>) -> Vec<Value> {
        let aggregation = match post {
            Some(post) => self.aggregation.then(post),
            None => self.aggregation.clone(),
        };
        let rendered = aggregation.render(self.schema.resolution_context());
        log_event_with_fields(
            Event::PipelineRendered,
            &[
                ("collection", self.schema.collection()),
                ("stages", rendered.len().to_string().as_str()),
            ],
        );
        rendered
    }

    /// Pipeline ending in `{"$count": "count"}`
    pub fn count_pipeline(&self) -> Vec<Value> {
        self.pipeline(Some(&Aggregation::new().count(COUNT_FIELD)))
    }

    /// Pipeline limited to one document
    pub fn one_pipeline(&self) -> Vec<Value> {
        self.pipeline(Some(&Aggregation::new().limit(1)))
    }

    /// Pipeline yielding the first document under `sort`
    pub fn latest_pipeline(&self, sort: SortOp) -> Vec<Value> {
        self.pipeline(Some(&Aggregation::new().sort(sort).limit(1)))
    }
}
