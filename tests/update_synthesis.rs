//! Update commands synthesized from declared entities

use std::sync::Arc;

use serde_json::{json, Value};

use weft::entity::{Entity, EntityPhase, Tally};
use weft::schema::{EntityDeclaration, EntityRegistry, EntitySchema};
use weft::update::{UpdateCommand, UpdateSynthesizer};

fn users() -> Arc<EntitySchema> {
    let declaration: EntityDeclaration = serde_json::from_value(json!({
        "name": "users",
        "version": 2,
        "fields": [
            {"name": "email", "alias": "em", "normalize": ["trim", "lower"]},
            {"name": "created", "roles": [{"set_on_insert": "now"}]},
            {"name": "updated", "roles": [{"refresh_on_set": ["now"]}]},
            {"name": "visits", "roles": ["increment"]}
        ]
    }))
    .unwrap();
    let mut registry = EntityRegistry::new();
    registry.register_declaration(declaration).unwrap()
}

fn is_date(value: &Value) -> bool {
    value.get("$date").map_or(false, Value::is_string)
}

#[test]
fn new_entity_fills_every_clause() {
    let mut user = Entity::new(users());
    user.set("email", "  Ada@Example.COM ").unwrap();
    user.increment("visits", 1).unwrap();
    user.increment("visits", 2).unwrap();

    let command = UpdateSynthesizer::synthesize(&mut user);

    assert_eq!(command.set()["em"], json!("ada@example.com"));
    assert!(is_date(&command.set()["updated"]));
    assert_eq!(command.set_on_insert()["version"], json!(2));
    assert!(is_date(&command.set_on_insert()["created"]));
    assert_eq!(command.increment()["visits"], json!(3));

    let doc = command.to_document();
    let keys: Vec<&str> = doc.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["$set", "$setOnInsert", "$inc"]);
}

#[test]
fn generated_values_are_written_back() {
    let mut user = Entity::new(users());
    let command = UpdateSynthesizer::synthesize(&mut user);

    assert_eq!(user.get("created").as_ref(), command.set_on_insert().get("created"));
    assert_eq!(user.get("updated").as_ref(), command.set().get("updated"));
}

#[test]
fn mixed_numeric_deltas_become_float() {
    let mut user = Entity::new(users());
    user.increment("visits", 1).unwrap();
    user.increment("visits", 0.5).unwrap();

    let command = UpdateSynthesizer::synthesize(&mut user);
    assert_eq!(command.increment()["visits"], json!(1.5));
    assert_eq!(user.counter("visits").unwrap().resting(), Tally::Float(1.5));
}

#[test]
fn cancelling_deltas_produce_no_increment() {
    let mut user = Entity::new(users());
    user.increment("visits", 4).unwrap();
    user.increment("visits", -4).unwrap();

    let command = UpdateSynthesizer::synthesize(&mut user);
    assert!(command.increment().is_empty());
    assert!(!command.set().contains_key("visits"));
}

#[test]
fn loaded_entity_keeps_stored_values_and_extras() {
    let stored = json!({
        "_id": "u1",
        "em": "ada@example.com",
        "created": {"$date": "2024-01-01T00:00:00.000Z"},
        "visits": 9,
        "version": 2,
        "legacy": true
    });
    let mut user = Entity::from_document(users(), &stored).unwrap();
    assert_eq!(user.phase(), EntityPhase::Persisted);
    assert_eq!(user.extra("legacy"), Some(&json!(true)));

    user.increment("visits", 1).unwrap();
    assert_eq!(user.phase(), EntityPhase::PersistedPending);

    let command = UpdateSynthesizer::synthesize(&mut user);
    assert_eq!(
        command.set_on_insert()["created"],
        json!({"$date": "2024-01-01T00:00:00.000Z"})
    );
    assert_eq!(command.set()["legacy"], json!(true));
    assert_eq!(command.set()["em"], json!("ada@example.com"));
    assert!(!command.set().contains_key("_id"));
    assert!(!command.set().contains_key("version"));
    assert_eq!(command.increment()["visits"], json!(1));
    assert_eq!(user.get("visits"), Some(json!(10)));
}

#[test]
fn rendered_command_reads_back_unchanged() {
    let mut user = Entity::new(users());
    user.set("email", "x@y.z").unwrap();
    user.increment("visits", 2).unwrap();
    let command = UpdateSynthesizer::synthesize(&mut user);

    let reread = UpdateCommand::from_document(&command.to_document()).unwrap();
    assert_eq!(reread, command);
}

#[test]
fn counters_cannot_be_assigned() {
    let mut user = Entity::new(users());
    let err = user.set("visits", 3).unwrap_err();
    assert_eq!(err.code().code(), "WEFT_ENTITY_COUNTER_ASSIGNMENT");
    assert!(user.counter("visits").is_none());
}
