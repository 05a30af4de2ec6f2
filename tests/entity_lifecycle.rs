//! Entity state transitions and record conversion

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use weft::entity::{Entity, EntityPhase};
use weft::schema::{EntitySchema, FieldDef};
use weft::update::UpdateSynthesizer;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Profile {
    handle: String,
    city: Option<String>,
    #[serde(default)]
    logins: i64,
}

fn profiles() -> Arc<EntitySchema> {
    Arc::new(
        EntitySchema::builder("profiles")
            .field(FieldDef::lower("handle").alias("h"))
            .field(FieldDef::new("city"))
            .field(FieldDef::counter("logins"))
            .build()
            .unwrap(),
    )
}

#[test]
fn new_entity_walks_the_persist_cycle() {
    let mut profile = Entity::new(profiles());
    assert_eq!(profile.phase(), EntityPhase::New);
    assert!(profile.should_persist());

    UpdateSynthesizer::synthesize(&mut profile);
    profile.mark_persisted(json!("p1"));
    assert_eq!(profile.phase(), EntityPhase::Persisted);
    assert!(!profile.should_persist());

    profile.set("city", "Oslo").unwrap();
    assert_eq!(profile.phase(), EntityPhase::PersistedPending);

    profile.mark_persisted(json!("ignored"));
    assert_eq!(profile.id(), Some(&json!("p1")));
    assert_eq!(profile.phase(), EntityPhase::Persisted);
}

#[test]
fn rejected_mutations_leave_state_untouched() {
    let mut profile = Entity::from_document(profiles(), &json!({"_id": 1, "h": "ann"})).unwrap();
    assert!(profile.set("nickname", "x").is_err());
    assert!(profile.increment("city", 1).is_err());
    assert!(profile.set_extra("_id", 2).is_err());
    assert!(profile.set_extra("version", 2).is_err());
    assert_eq!(profile.phase(), EntityPhase::Persisted);
}

#[test]
fn records_convert_both_ways() {
    let record = Profile {
        handle: "Ann".to_string(),
        city: None,
        logins: 2,
    };
    let profile = Entity::from_record(profiles(), &record).unwrap();
    assert_eq!(profile.get("handle"), Some(json!("ann")));
    assert!(!profile.is_set("city"));
    assert!(profile.counter("logins").unwrap().has_pending());

    let back: Profile = profile.to_record().unwrap();
    assert_eq!(
        back,
        Profile {
            handle: "ann".to_string(),
            city: None,
            logins: 2,
        }
    );
}

#[test]
fn stored_document_round_trips_through_wire_names() {
    let stored = json!({"_id": "p1", "h": "ann", "city": "Oslo", "logins": 5, "badge": "gold"});
    let profile = Entity::from_document(profiles(), &stored).unwrap();

    assert_eq!(profile.get("handle"), Some(json!("ann")));
    assert_eq!(profile.extra("badge"), Some(&json!("gold")));
    assert_eq!(profile.to_document(), stored);
}

#[test]
fn stored_document_needs_an_id() {
    let err = Entity::from_document(profiles(), &json!({"h": "ann"})).unwrap_err();
    assert_eq!(err.code().code(), "WEFT_ENTITY_MALFORMED_DOCUMENT");

    let err = Entity::from_document(profiles(), &json!({"_id": 1, "logins": "many"})).unwrap_err();
    assert_eq!(err.entity(), "profiles");
}

#[test]
fn declared_wire_name_shadows_extension_field() {
    let mut profile = Entity::new(profiles());
    profile.set_extra("h", "shadowed").unwrap();
    profile.set("handle", "Real").unwrap();

    let dump = profile.dump();
    assert_eq!(dump["h"], json!("real"));
    assert_eq!(dump.len(), 1);
}

#[test]
fn unset_removes_value() {
    let mut profile = Entity::new(profiles());
    profile.set("city", "Oslo").unwrap();
    profile.unset("city").unwrap();
    assert!(!profile.is_set("city"));
    assert!(profile.dump().is_empty());
}
