//! In-memory document store
//!
//! Collections are ordered vectors of JSON documents behind one `RwLock`.
//! Every write holds the write lock for its whole read-modify-write, so
//! `$inc` is atomic across threads.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::entity::Tally;
use crate::schema::ID_FIELD;
use crate::update::UpdateCommand;

use super::backend::{BulkWriteSummary, DocumentStore, UpsertOperation};
use super::errors::{StoreError, StoreResult};
use super::matcher::{is_operator_document, DocumentMatcher};
use super::sorter::DocumentSorter;

enum Outcome {
    Updated { index: usize, modified: bool },
    Inserted { index: usize, id: Value },
    Unmatched,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document verbatim, assigning a UUID `_id` when missing.
    /// Returns the identifier.
    pub fn insert(&self, collection: &str, document: Value) -> StoreResult<Value> {
        let Value::Object(map) = document else {
            return Err(StoreError::MalformedUpdate(
                "only documents can be inserted".to_string(),
            ));
        };
        let (id, document) = with_id(map);

        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    /// Snapshot of a collection in storage order
    pub fn documents(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    pub fn len(&self, collection: &str) -> StoreResult<usize> {
        let collections = self.collections.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(collections.get(collection).map_or(0, Vec::len))
    }

    fn upsert_into(documents: &mut Vec<Value>, operation: &UpsertOperation) -> StoreResult<Outcome> {
        let command = UpdateCommand::from_document(&operation.update)
            .map_err(|e| StoreError::MalformedUpdate(e.message().to_string()))?;

        let mut position = None;
        for (index, document) in documents.iter().enumerate() {
            if DocumentMatcher::matches(document, &operation.filter)? {
                position = Some(index);
                break;
            }
        }

        match position {
            Some(index) => {
                let mut updated = documents[index].clone();
                apply(&mut updated, &command, false)?;
                let modified = updated != documents[index];
                documents[index] = updated;
                Ok(Outcome::Updated { index, modified })
            }
            None if operation.upsert => {
                let mut seeded = Value::Object(seed(&operation.filter));
                apply(&mut seeded, &command, true)?;
                let Value::Object(map) = seeded else {
                    return Err(StoreError::MalformedUpdate("seed is not a document".to_string()));
                };
                let (id, document) = with_id(map);
                documents.push(document);
                Ok(Outcome::Inserted {
                    index: documents.len() - 1,
                    id,
                })
            }
            None => Ok(Outcome::Unmatched),
        }
    }
}

impl DocumentStore for MemoryStore {
    fn find_one_and_update(
        &self,
        collection: &str,
        operation: &UpsertOperation,
    ) -> StoreResult<Option<Value>> {
        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let documents = collections.entry(collection.to_string()).or_default();

        let after = match Self::upsert_into(documents, operation)? {
            Outcome::Updated { index, .. } | Outcome::Inserted { index, .. } => {
                Some(documents[index].clone())
            }
            Outcome::Unmatched => None,
        };
        Ok(after)
    }

    fn bulk_upsert(
        &self,
        collection: &str,
        operations: &[UpsertOperation],
    ) -> StoreResult<BulkWriteSummary> {
        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let live = collections.entry(collection.to_string()).or_default();

        // Staged on a copy; the collection only changes if every operation applies
        let mut documents = live.clone();
        let mut summary = BulkWriteSummary::default();
        for operation in operations {
            match Self::upsert_into(&mut documents, operation)? {
                Outcome::Updated { modified, .. } => {
                    summary.matched += 1;
                    if modified {
                        summary.modified += 1;
                    }
                }
                Outcome::Inserted { id, .. } => {
                    summary.upserted += 1;
                    summary.upserted_ids.push(id);
                }
                Outcome::Unmatched => {}
            }
        }
        *live = documents;
        Ok(summary)
    }

    fn insert_many(&self, collection: &str, documents: &[Value]) -> StoreResult<Vec<Value>> {
        let mut collections = self.collections.write().map_err(|_| StoreError::LockPoisoned)?;
        let live = collections.entry(collection.to_string()).or_default();

        let mut staged = live.clone();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            let Value::Object(map) = document else {
                return Err(StoreError::MalformedUpdate(
                    "only documents can be inserted".to_string(),
                ));
            };
            let (id, document) = with_id(map.clone());
            if staged.iter().any(|existing| existing.get(ID_FIELD) == Some(&id)) {
                return Err(StoreError::DuplicateKey(id.to_string()));
            }
            staged.push(document);
            ids.push(id);
        }
        *live = staged;
        Ok(ids)
    }

    fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Value>> {
        let mut documents = self.documents(collection)?;

        for (index, stage) in pipeline.iter().enumerate() {
            let Some((name, body)) = stage
                .as_object()
                .filter(|map| map.len() == 1)
                .and_then(|map| map.iter().next())
            else {
                return Err(StoreError::MalformedStage(
                    index,
                    "stage must be a single-key document".to_string(),
                ));
            };

            documents = match name.as_str() {
                "$match" => {
                    let mut kept = Vec::with_capacity(documents.len());
                    for document in documents {
                        if DocumentMatcher::matches(&document, body)? {
                            kept.push(document);
                        }
                    }
                    kept
                }
                "$sort" => {
                    let keys = DocumentSorter::keys(body)
                        .map_err(|reason| StoreError::MalformedStage(index, reason))?;
                    DocumentSorter::sort(&mut documents, &keys);
                    documents
                }
                "$skip" => {
                    let n = count_argument(index, name, body.as_u64())?;
                    documents.into_iter().skip(n).collect()
                }
                "$limit" => {
                    let n = count_argument(index, name, body.as_u64())?;
                    documents.into_iter().take(n).collect()
                }
                // Deterministic: the first `size` documents
                "$sample" => {
                    let n = count_argument(index, name, body.get("size").and_then(Value::as_u64))?;
                    documents.into_iter().take(n).collect()
                }
                "$count" => {
                    let field = body.as_str().ok_or_else(|| {
                        StoreError::MalformedStage(index, "$count expects a field name".to_string())
                    })?;
                    if documents.is_empty() {
                        Vec::new()
                    } else {
                        let mut out = Map::new();
                        out.insert(field.to_string(), Value::from(documents.len() as u64));
                        vec![Value::Object(out)]
                    }
                }
                other => return Err(StoreError::UnsupportedStage(other.to_string())),
            };
        }

        Ok(documents)
    }
}

fn count_argument(index: usize, stage: &str, value: Option<u64>) -> StoreResult<usize> {
    value
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            StoreError::MalformedStage(index, format!("{} expects a non-negative integer", stage))
        })
}

fn new_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Puts `_id` first, generating one when absent
fn with_id(mut map: Map<String, Value>) -> (Value, Value) {
    let id = map.remove(ID_FIELD).filter(|v| !v.is_null()).unwrap_or_else(new_id);
    let mut document = Map::new();
    document.insert(ID_FIELD.to_string(), id.clone());
    document.extend(map);
    (id, Value::Object(document))
}

/// Equality conditions of an upsert filter become fields of the inserted
/// document
fn seed(filter: &Value) -> Map<String, Value> {
    let mut document = Map::new();
    let Value::Object(filter) = filter else {
        return document;
    };
    for (key, condition) in filter {
        if key.starts_with('$') {
            continue;
        }
        match condition {
            Value::Object(ops) if is_operator_document(ops) => {
                if let Some(value) = ops.get("$eq") {
                    set_path(&mut document, key, value.clone());
                }
            }
            value => set_path(&mut document, key, value.clone()),
        }
    }
    document
}

fn apply(document: &mut Value, command: &UpdateCommand, inserting: bool) -> StoreResult<()> {
    let Value::Object(map) = document else {
        return Err(StoreError::MalformedUpdate("target is not a document".to_string()));
    };

    if inserting {
        for (path, value) in command.set_on_insert() {
            set_path(map, path, value.clone());
        }
    }
    for (path, value) in command.set() {
        set_path(map, path, value.clone());
    }
    for (path, delta) in command.increment() {
        let delta = Tally::from_value(delta).ok_or_else(|| {
            StoreError::MalformedUpdate(format!("$inc value for '{}' is not numeric", path))
        })?;
        let current = match get_path(map, path) {
            None | Some(Value::Null) => Tally::ZERO,
            Some(value) => Tally::from_value(value)
                .ok_or_else(|| StoreError::NonNumericIncrement(path.clone()))?,
        };
        set_path(map, path, (current + delta).to_value());
    }
    Ok(())
}

fn get_path<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => map.get(path),
        Some((head, rest)) => get_path(map.get(head)?.as_object()?, rest),
    }
}

fn set_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(child) = child {
                set_path(child, rest, value);
            }
        }
    }
}
