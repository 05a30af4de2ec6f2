//! The store boundary consumed by sessions

use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::ID_FIELD;

use super::errors::StoreResult;

/// One filtered update, optionally inserting when nothing matches
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertOperation {
    pub filter: Value,
    pub update: Value,
    pub upsert: bool,
}

impl UpsertOperation {
    pub fn new(filter: Value, update: Value, upsert: bool) -> Self {
        Self {
            filter,
            update,
            upsert,
        }
    }

    /// Upsert keyed by document identifier
    pub fn by_id(id: Value, update: Value) -> Self {
        let mut filter = Map::new();
        filter.insert(ID_FIELD.to_string(), id);
        Self::new(Value::Object(filter), update, true)
    }
}

/// Outcome counts of a bulk write
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkWriteSummary {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
    pub upserted_ids: Vec<Value>,
}

/// A document store. Implementations are shared across threads.
pub trait DocumentStore: Send + Sync {
    /// Applies one update to the first matching document and returns the
    /// document as it is after the write, or `None` if nothing matched and
    /// `upsert` is false.
    fn find_one_and_update(
        &self,
        collection: &str,
        operation: &UpsertOperation,
    ) -> StoreResult<Option<Value>>;

    /// Applies operations in order, all or nothing: if any operation fails
    /// the collection is left exactly as it was.
    fn bulk_upsert(
        &self,
        collection: &str,
        operations: &[UpsertOperation],
    ) -> StoreResult<BulkWriteSummary>;

    /// Inserts new documents in order, all or nothing, and returns their
    /// identifiers. A document without `_id` gets one; an `_id` already in
    /// the collection is a duplicate-key error.
    fn insert_many(&self, collection: &str, documents: &[Value]) -> StoreResult<Vec<Value>>;

    fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Value>>;
}
