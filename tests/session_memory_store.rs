//! Sessions persisting and loading entities against the in-memory store

use std::sync::Arc;
use std::thread;

use serde_json::json;

use weft::directive::LoadDirective;
use weft::entity::{Entity, EntityPhase};
use weft::predicate::field;
use weft::schema::{named_producer, EntitySchema, FieldDef, PolicyRole};
use weft::session::Session;
use weft::sort::SortOp;
use weft::store::{DocumentStore, MemoryStore};

fn posts() -> Arc<EntitySchema> {
    let token = named_producer("uuid").unwrap();
    Arc::new(
        EntitySchema::builder("posts")
            .version(1)
            .field(FieldDef::new("title").alias("t"))
            .field(FieldDef::new("token").role(PolicyRole::SetOnInsert(token)))
            .field(FieldDef::counter("views"))
            .build()
            .unwrap(),
    )
}

fn session() -> Session<MemoryStore> {
    Session::new(Arc::new(MemoryStore::new()))
}

#[test]
fn concurrent_increments_are_never_lost() {
    let session = session();
    let schema = posts();

    let mut post = Entity::new(Arc::clone(&schema));
    post.set("title", "shared").unwrap();
    session.persist(&mut post, false).unwrap();
    let id = post.id().cloned().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let session = session.clone();
            let schema = Arc::clone(&schema);
            let id = id.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    let mut post = session.load_by_id(&schema, id.clone()).unwrap().unwrap();
                    post.increment("views", 1).unwrap();
                    session.persist(&mut post, true).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let post = session.load_by_id(&schema, id).unwrap().unwrap();
    assert_eq!(post.get("views"), Some(json!(200)));
    assert_eq!(session.store().len("posts").unwrap(), 1);
}

#[test]
fn set_on_insert_is_written_once() {
    let session = session();
    let schema = posts();

    let mut first = Entity::new(Arc::clone(&schema));
    session.persist(&mut first, false).unwrap();
    let token = first.get("token").unwrap();
    let id = first.id().cloned().unwrap();

    // A stale copy without the token generates a fresh one, which the store
    // ignores because the document already exists.
    let mut stale = Entity::from_document(Arc::clone(&schema), &json!({"_id": id})).unwrap();
    stale.set("title", "later").unwrap();
    session.persist(&mut stale, false).unwrap();

    assert_eq!(stale.get("token"), Some(token.clone()));
    assert_eq!(stale.get("title"), Some(json!("later")));
    let stored = session.store().documents("posts").unwrap();
    assert_eq!(stored[0]["token"], token);
    assert_eq!(stored[0]["version"], json!(1));
}

#[test]
fn persist_refreshes_and_lazy_persist_skips() {
    let session = session();
    let mut post = Entity::new(posts());
    post.set("title", "hello").unwrap();
    post.increment("views", 3).unwrap();

    assert!(session.persist(&mut post, true).unwrap());
    assert_eq!(post.phase(), EntityPhase::Persisted);
    assert_eq!(post.get("views"), Some(json!(3)));
    assert!(!post.counter("views").unwrap().has_pending());

    assert!(!session.persist(&mut post, true).unwrap());
    assert!(session.persist(&mut post, false).unwrap());

    let metrics = session.metrics().snapshot();
    assert_eq!(metrics.persists, 2);
    assert_eq!(metrics.persists_skipped, 1);
    assert_eq!(metrics.persist_failures, 0);
}

#[test]
fn bulk_persist_then_query() {
    let session = session();
    let schema = posts();

    let mut batch: Vec<Entity> = ["a", "b", "c"]
        .iter()
        .enumerate()
        .map(|(i, title)| {
            let mut post = Entity::new(Arc::clone(&schema));
            post.set("title", *title).unwrap();
            post.increment("views", (i as i64 + 1) * 10).unwrap();
            post
        })
        .collect();

    let summary = session.persist_many(&mut batch, false).unwrap();
    assert_eq!(summary.upserted, 3);
    assert!(batch.iter().all(|post| post.phase() == EntityPhase::Persisted));

    let popular = LoadDirective::new(Arc::clone(&schema)).filter(field("views").gte(20));
    assert_eq!(session.count(&popular).unwrap(), 2);
    assert!(session.exists(&popular).unwrap());

    let top = session
        .load_latest(&LoadDirective::new(Arc::clone(&schema)), SortOp::desc("views"))
        .unwrap()
        .unwrap();
    assert_eq!(top.get("title"), Some(json!("c")));

    let titles: Vec<_> = session
        .load_many(&LoadDirective::new(Arc::clone(&schema)).sort_by("title", true))
        .unwrap()
        .iter()
        .map(|post| post.get("title").unwrap())
        .collect();
    assert_eq!(titles, vec![json!("c"), json!("b"), json!("a")]);

    let none = LoadDirective::new(schema).filter(field("title").eq("zzz"));
    assert_eq!(session.count(&none).unwrap(), 0);
    assert!(!session.exists(&none).unwrap());
    assert!(session.load_one(&none).unwrap().is_none());
}

#[test]
fn loaded_entities_carry_stored_extras() {
    let store = Arc::new(MemoryStore::new());
    store
        .insert("posts", json!({"_id": "p9", "t": "old", "views": 4, "legacy": "yes"}))
        .unwrap();
    let session = Session::new(Arc::clone(&store));

    let post = session.load_by_id(&posts(), json!("p9")).unwrap().unwrap();
    assert_eq!(post.get("title"), Some(json!("old")));
    assert_eq!(post.extra("legacy"), Some(&json!("yes")));

    let docs = store.aggregate("posts", &[json!({"$match": {"legacy": {"$exists": true}}})]).unwrap();
    assert_eq!(docs.len(), 1);
}

#[test]
fn failed_bulk_persist_leaves_store_unchanged() {
    let session = session();
    let schema = posts();
    session
        .store()
        .insert("posts", json!({"_id": "b", "views": "oops"}))
        .unwrap();

    let mut fresh = Entity::new(Arc::clone(&schema));
    fresh.set("title", "a").unwrap();
    fresh.increment("views", 2).unwrap();
    // Copy of "b" that does not know its stored counter is not a number
    let mut stale = Entity::from_document(Arc::clone(&schema), &json!({"_id": "b"})).unwrap();
    stale.increment("views", 1).unwrap();

    let mut batch = vec![fresh, stale];
    let err = session.persist_many(&mut batch, false).unwrap_err();
    assert_eq!(err.code(), "WEFT_STORE_NON_NUMERIC_INCREMENT");
    assert_eq!(session.store().len("posts").unwrap(), 1);
    assert!(batch[0].id().is_none());
    assert_eq!(batch[0].counter("views").unwrap().pending().to_value(), json!(2));

    let mut fresh = batch.remove(0);
    session.persist(&mut fresh, false).unwrap();
    let stored = session.store().documents("posts").unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored.iter().filter(|doc| doc["t"] == json!("a")).count(), 1);
}

#[test]
fn bulk_persist_leaves_insert_defaults_of_loaded_entities_unset() {
    let session = session();
    let schema = posts();

    let mut loaded = Entity::from_document(Arc::clone(&schema), &json!({"_id": "x"})).unwrap();
    loaded.set("title", "x").unwrap();
    let mut batch = vec![loaded];
    session.persist_many(&mut batch, false).unwrap();

    let stored = session.store().documents("posts").unwrap();
    assert!(stored[0]["token"].is_string());
    assert!(batch[0].get("token").is_none());
}

#[test]
fn append_records_every_write_as_a_new_document() {
    let session = session();
    let schema = posts();

    let mut post = Entity::new(Arc::clone(&schema));
    post.set("title", "entry").unwrap();
    post.increment("views", 4).unwrap();
    assert!(session.append(&mut post, false).unwrap());
    let token = post.get("token").unwrap();
    assert_eq!(post.phase(), EntityPhase::Persisted);

    post.increment("views", 1).unwrap();
    session.append(&mut post, false).unwrap();

    let stored = session.store().documents("posts").unwrap();
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0]["_id"], stored[1]["_id"]);
    assert_eq!(stored[0]["views"], json!(4));
    assert_eq!(stored[1]["views"], json!(5));
    assert!(stored.iter().all(|doc| doc["token"] == token && doc["version"] == json!(1)));
    assert_eq!(post.id(), Some(&stored[1]["_id"]));

    let directive = LoadDirective::new(Arc::clone(&schema)).filter(field("title").eq("entry"));
    assert_eq!(session.count(&directive).unwrap(), 2);
}

#[test]
fn append_many_is_all_or_nothing() {
    let session = session();
    let schema = posts();
    let mut entries: Vec<Entity> = ["one", "two"]
        .iter()
        .map(|title| {
            let mut entry = Entity::new(Arc::clone(&schema));
            entry.set("title", *title).unwrap();
            entry
        })
        .collect();

    let ids = session.append_many(&mut entries, false).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(session.store().len("posts").unwrap(), 2);

    let other = Arc::new(EntitySchema::builder("comments").build().unwrap());
    entries.push(Entity::new(other));
    let err = session.append_many(&mut entries, false).unwrap_err();
    assert_eq!(err.code(), "WEFT_SESSION_MIXED_COLLECTIONS");
    assert_eq!(session.store().len("posts").unwrap(), 2);
}
