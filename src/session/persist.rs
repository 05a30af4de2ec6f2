//! Persisting and loading entities through a document store

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::directive::{LoadDirective, COUNT_FIELD};
use crate::entity::Entity;
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry};
use crate::schema::{EntitySchema, ID_FIELD};
use crate::sort::SortOp;
use crate::predicate::field;
use crate::store::{BulkWriteSummary, DocumentStore, UpsertOperation};
use crate::update::UpdateSynthesizer;

use super::errors::{SessionError, SessionResult};

/// Binds entities to an injected store
pub struct Session<S: DocumentStore> {
    store: Arc<S>,
    metrics: Arc<MetricsRegistry>,
}

impl<S: DocumentStore> Clone for Session<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S: DocumentStore> Session<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_metrics(store, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(store: Arc<S>, metrics: Arc<MetricsRegistry>) -> Self {
        Self { store, metrics }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Upserts one entity and refreshes it from the post-write document.
    ///
    /// With `lazy`, an entity that has nothing to write is skipped and
    /// `Ok(false)` is returned. On failure the entity is restored to its
    /// exact state before the attempt.
    pub fn persist(&self, entity: &mut Entity, lazy: bool) -> SessionResult<bool> {
        let collection = entity.schema().collection().to_string();
        if lazy && !entity.should_persist() {
            self.metrics.increment_persists_skipped();
            log_event_with_fields(Event::PersistSkipped, &[("collection", collection.as_str())]);
            return Ok(false);
        }

        let snapshot = entity.clone();
        let id = entity.id().cloned().unwrap_or_else(new_id);
        log_event_with_fields(
            Event::PersistBegin,
            &[("collection", collection.as_str()), ("phase", entity.phase().as_str())],
        );

        let command = UpdateSynthesizer::synthesize(entity);
        self.metrics.increment_updates_synthesized();
        let operation = UpsertOperation::by_id(id.clone(), command.to_document());

        match self.store.find_one_and_update(&collection, &operation) {
            Ok(Some(document)) => {
                if let Err(e) = entity.refresh(&document) {
                    Logger::warn(
                        "PERSIST_REFRESH_SKIPPED",
                        &[("collection", collection.as_str()), ("reason", e.message())],
                    );
                    entity.mark_persisted(id);
                }
            }
            Ok(None) => entity.mark_persisted(id),
            Err(e) => {
                *entity = snapshot;
                self.metrics.increment_persist_failures();
                log_event_with_fields(
                    Event::PersistFailed,
                    &[("collection", collection.as_str()), ("reason", e.to_string().as_str())],
                );
                return Err(e.into());
            }
        }

        self.metrics.increment_persists();
        log_event_with_fields(Event::PersistCommit, &[("collection", collection.as_str())]);
        Ok(true)
    }

    /// Upserts many entities of one type in a single ordered bulk write.
    ///
    /// Entities are not refreshed afterwards, so an insert-only field that an
    /// identified entity lacks stays unset locally. The store applies the
    /// whole batch or none of it; if the write fails, every entity is
    /// restored.
    pub fn persist_many(&self, entities: &mut [Entity], lazy: bool) -> SessionResult<BulkWriteSummary> {
        let Some(first) = entities.first() else {
            return Ok(BulkWriteSummary::default());
        };
        let collection = first.schema().collection().to_string();
        check_collection(entities, &collection)?;

        let selected = self.select(entities, lazy, &collection);
        let skipped = entities.len() - selected.len();
        if selected.is_empty() {
            return Ok(BulkWriteSummary::default());
        }

        let snapshots: Vec<Entity> = selected.iter().map(|&i| entities[i].clone()).collect();
        let mut ids = Vec::with_capacity(selected.len());
        let mut operations = Vec::with_capacity(selected.len());
        for &index in &selected {
            let entity = &mut entities[index];
            let id = entity.id().cloned().unwrap_or_else(new_id);
            let command = UpdateSynthesizer::synthesize(entity);
            self.metrics.increment_updates_synthesized();
            operations.push(UpsertOperation::by_id(id.clone(), command.to_document()));
            ids.push(id);
        }

        let summary = match self.store.bulk_upsert(&collection, &operations) {
            Ok(summary) => summary,
            Err(e) => {
                restore(entities, &selected, snapshots);
                self.metrics.increment_persist_failures();
                log_event_with_fields(
                    Event::PersistFailed,
                    &[("collection", collection.as_str()), ("reason", e.to_string().as_str())],
                );
                return Err(e.into());
            }
        };

        for (&index, id) in selected.iter().zip(ids) {
            entities[index].mark_persisted(id);
            self.metrics.increment_persists();
        }
        log_event_with_fields(
            Event::BulkPersistComplete,
            &[
                ("collection", collection.as_str()),
                ("persisted", selected.len().to_string().as_str()),
                ("skipped", skipped.to_string().as_str()),
                ("upserted", summary.upserted.to_string().as_str()),
            ],
        );
        Ok(summary)
    }

    /// Inserts the entity as a new document, never updating one in place.
    ///
    /// Every append gets a fresh identifier, so appending the same entity
    /// twice records two documents. Counters are written at their full
    /// value. On failure the entity is restored.
    pub fn append(&self, entity: &mut Entity, lazy: bool) -> SessionResult<bool> {
        Ok(!self.append_many(std::slice::from_mut(entity), lazy)?.is_empty())
    }

    /// Inserts many entities of one type in a single all-or-nothing write and
    /// returns the new identifiers in input order (skipped entities have
    /// none).
    pub fn append_many(&self, entities: &mut [Entity], lazy: bool) -> SessionResult<Vec<Value>> {
        let Some(first) = entities.first() else {
            return Ok(Vec::new());
        };
        let collection = first.schema().collection().to_string();
        check_collection(entities, &collection)?;

        let selected = self.select(entities, lazy, &collection);
        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let snapshots: Vec<Entity> = selected.iter().map(|&i| entities[i].clone()).collect();
        let mut documents = Vec::with_capacity(selected.len());
        for &index in &selected {
            let mut document = serde_json::Map::new();
            document.insert(ID_FIELD.to_string(), new_id());
            document.extend(UpdateSynthesizer::synthesize_insert(&mut entities[index]));
            self.metrics.increment_updates_synthesized();
            documents.push(Value::Object(document));
        }

        let ids = match self.store.insert_many(&collection, &documents) {
            Ok(ids) => ids,
            Err(e) => {
                restore(entities, &selected, snapshots);
                self.metrics.increment_persist_failures();
                log_event_with_fields(
                    Event::PersistFailed,
                    &[("collection", collection.as_str()), ("reason", e.to_string().as_str())],
                );
                return Err(e.into());
            }
        };

        for (&index, id) in selected.iter().zip(&ids) {
            entities[index].mark_appended(id.clone());
            self.metrics.increment_persists();
        }
        log_event_with_fields(
            Event::AppendCommit,
            &[
                ("collection", collection.as_str()),
                ("inserted", ids.len().to_string().as_str()),
            ],
        );
        Ok(ids)
    }

    /// Indices of the entities to write; lazily skipped ones are counted
    fn select(&self, entities: &[Entity], lazy: bool, collection: &str) -> Vec<usize> {
        let selected: Vec<usize> = entities
            .iter()
            .enumerate()
            .filter(|(_, entity)| !lazy || entity.should_persist())
            .map(|(index, _)| index)
            .collect();
        for _ in selected.len()..entities.len() {
            self.metrics.increment_persists_skipped();
            log_event_with_fields(Event::PersistSkipped, &[("collection", collection)]);
        }
        selected
    }

    /// Runs the directive's pipeline and reads every result as an entity
    pub fn load_many(&self, directive: &LoadDirective) -> SessionResult<Vec<Entity>> {
        self.load_pipeline(directive, directive.pipeline(None))
    }

    pub fn load_one(&self, directive: &LoadDirective) -> SessionResult<Option<Entity>> {
        Ok(self
            .load_pipeline(directive, directive.one_pipeline())?
            .into_iter()
            .next())
    }

    /// First entity under `sort`
    pub fn load_latest(&self, directive: &LoadDirective, sort: SortOp) -> SessionResult<Option<Entity>> {
        Ok(self
            .load_pipeline(directive, directive.latest_pipeline(sort))?
            .into_iter()
            .next())
    }

    pub fn load_by_id(&self, schema: &Arc<EntitySchema>, id: Value) -> SessionResult<Option<Entity>> {
        let directive = LoadDirective::new(Arc::clone(schema)).filter(field(ID_FIELD).eq(id));
        self.load_one(&directive)
    }

    /// Number of documents the directive matches. Zero when the count stage
    /// yields no document.
    pub fn count(&self, directive: &LoadDirective) -> SessionResult<u64> {
        let pipeline = directive.count_pipeline();
        self.metrics.increment_pipelines_rendered();
        let results = self.store.aggregate(directive.collection(), &pipeline)?;
        match results.first() {
            None => Ok(0),
            Some(document) => match document.get(COUNT_FIELD) {
                None => Ok(0),
                Some(count) => count.as_u64().ok_or_else(|| {
                    SessionError::UnexpectedResult(format!("count is not an integer: {}", count))
                }),
            },
        }
    }

    pub fn exists(&self, directive: &LoadDirective) -> SessionResult<bool> {
        let pipeline = directive.one_pipeline();
        self.metrics.increment_pipelines_rendered();
        Ok(!self.store.aggregate(directive.collection(), &pipeline)?.is_empty())
    }

    fn load_pipeline(&self, directive: &LoadDirective, pipeline: Vec<Value>) -> SessionResult<Vec<Entity>> {
        self.metrics.increment_pipelines_rendered();
        let documents = self.store.aggregate(directive.collection(), &pipeline)?;
        let entities = documents
            .iter()
            .map(|document| Entity::from_document(Arc::clone(directive.schema()), document))
            .collect::<Result<Vec<_>, _>>()?;

        self.metrics.add_documents_loaded(entities.len() as u64);
        log_event_with_fields(
            Event::LoadComplete,
            &[
                ("collection", directive.collection()),
                ("documents", entities.len().to_string().as_str()),
            ],
        );
        Ok(entities)
    }
}

fn new_id() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

fn check_collection(entities: &[Entity], collection: &str) -> SessionResult<()> {
    match entities
        .iter()
        .find(|entity| entity.schema().collection() != collection)
    {
        Some(other) => Err(SessionError::MixedCollections(
            collection.to_string(),
            other.schema().collection().to_string(),
        )),
        None => Ok(()),
    }
}

fn restore(entities: &mut [Entity], selected: &[usize], snapshots: Vec<Entity>) {
    for (&index, snapshot) in selected.iter().zip(snapshots) {
        entities[index] = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityPhase;
    use crate::predicate::field;
    use crate::schema::FieldDef;
    use crate::store::{MemoryStore, StoreError, StoreResult};
    use serde_json::json;

    struct BrokenStore;

    impl DocumentStore for BrokenStore {
        fn find_one_and_update(&self, _: &str, _: &UpsertOperation) -> StoreResult<Option<Value>> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn bulk_upsert(&self, _: &str, _: &[UpsertOperation]) -> StoreResult<BulkWriteSummary> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn insert_many(&self, _: &str, _: &[Value]) -> StoreResult<Vec<Value>> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        fn aggregate(&self, _: &str, _: &[Value]) -> StoreResult<Vec<Value>> {
            Ok(Vec::new())
        }
    }

    fn schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::builder("pages")
                .version(1)
                .field(FieldDef::new("path"))
                .field(FieldDef::time_inserted("created"))
                .field(FieldDef::counter("views"))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_persist_assigns_id_and_clears_pending() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut page = Entity::new(schema());
        page.set("path", "/home").unwrap();
        page.increment("views", 1).unwrap();

        assert!(session.persist(&mut page, false).unwrap());
        assert_eq!(page.phase(), EntityPhase::Persisted);
        assert!(page.id().is_some());
        assert!(page.is_set("created"));

        let stored = session.store().documents("pages").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["views"], json!(1));
        assert_eq!(stored[0]["version"], json!(1));
    }

    #[test]
    fn test_lazy_persist_skips_clean_entity() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut page = Entity::new(schema());
        session.persist(&mut page, true).unwrap();

        assert!(!session.persist(&mut page, true).unwrap());
        assert!(session.persist(&mut page, false).unwrap());
        assert_eq!(session.metrics().snapshot().persists_skipped, 1);
    }

    #[test]
    fn test_failed_persist_restores_entity() {
        let session = Session::new(Arc::new(BrokenStore));
        let mut page = Entity::new(schema());
        page.increment("views", 3).unwrap();

        let err = session.persist(&mut page, false).unwrap_err();
        assert_eq!(err.code(), "WEFT_STORE_UNAVAILABLE");
        assert!(page.id().is_none());
        assert!(!page.is_set("created"));
        assert_eq!(page.counter("views").unwrap().pending(), crate::entity::Tally::Int(3));
        assert_eq!(page.phase(), EntityPhase::New);
    }

    #[test]
    fn test_persist_many_and_load() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut pages: Vec<Entity> = ["/a", "/b", "/c"]
            .iter()
            .map(|path| {
                let mut page = Entity::new(schema());
                page.set("path", *path).unwrap();
                page
            })
            .collect();

        let summary = session.persist_many(&mut pages, false).unwrap();
        assert_eq!(summary.upserted, 3);
        assert!(pages.iter().all(|p| !p.should_persist()));

        let directive = LoadDirective::new(schema()).sort(SortOp::desc("path"));
        let loaded = session.load_many(&directive).unwrap();
        let paths: Vec<Value> = loaded.iter().map(|p| p.get("path").unwrap()).collect();
        assert_eq!(paths, vec![json!("/c"), json!("/b"), json!("/a")]);

        let directive = LoadDirective::new(schema()).filter(field("path").ne("/a"));
        assert_eq!(session.count(&directive).unwrap(), 2);
        assert!(session.exists(&directive).unwrap());

        let missing = LoadDirective::new(schema()).filter(field("path").eq("/z"));
        assert_eq!(session.count(&missing).unwrap(), 0);
        assert!(session.load_one(&missing).unwrap().is_none());

        let id = pages[1].id().cloned().unwrap();
        let by_id = session.load_by_id(&schema(), id).unwrap().unwrap();
        assert_eq!(by_id.get("path"), Some(json!("/b")));
    }

    #[test]
    fn test_failed_bulk_persist_restores_all() {
        let session = Session::new(Arc::new(BrokenStore));
        let mut pages = vec![Entity::new(schema()), Entity::new(schema())];
        pages[0].increment("views", 2).unwrap();

        assert!(session.persist_many(&mut pages, false).is_err());
        assert!(pages.iter().all(|p| p.id().is_none() && p.should_persist()));
        assert!(pages[0].counter("views").unwrap().has_pending());
    }

    #[test]
    fn test_append_writes_new_document_each_time() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut page = Entity::new(schema());
        page.set("path", "/home").unwrap();
        page.increment("views", 2).unwrap();

        assert!(session.append(&mut page, false).unwrap());
        let first = page.id().cloned().unwrap();
        assert!(page.is_set("created"));
        assert!(!page.should_persist());

        page.increment("views", 1).unwrap();
        assert!(session.append(&mut page, true).unwrap());
        assert_ne!(page.id(), Some(&first));

        let stored = session.store().documents("pages").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0]["views"], json!(2));
        assert_eq!(stored[1]["views"], json!(3));
        assert_eq!(stored[0]["version"], json!(1));
        assert!(stored.iter().all(|doc| doc.get("$inc").is_none()));
    }

    #[test]
    fn test_failed_append_restores_entity() {
        let session = Session::new(Arc::new(BrokenStore));
        let mut page = Entity::new(schema());
        page.increment("views", 3).unwrap();

        let err = session.append(&mut page, false).unwrap_err();
        assert_eq!(err.code(), "WEFT_STORE_UNAVAILABLE");
        assert!(page.id().is_none());
        assert!(!page.is_set("created"));
        assert_eq!(page.counter("views").unwrap().pending(), crate::entity::Tally::Int(3));
        assert_eq!(session.metrics().snapshot().persist_failures, 1);
    }

    #[test]
    fn test_append_many_skips_clean_entities_lazily() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        let mut pages = vec![Entity::new(schema()), Entity::new(schema())];
        session.append(&mut pages[0], false).unwrap();
        pages[1].set("path", "/b").unwrap();

        let ids = session.append_many(&mut pages, true).unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(pages[1].id(), ids.first());
        assert_eq!(session.store().documents("pages").unwrap().len(), 2);
    }
}
