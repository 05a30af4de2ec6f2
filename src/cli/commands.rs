//! Command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::Config;
use crate::entity::Entity;
use crate::schema::{EntityRegistry, EntitySchema};
use crate::update::UpdateSynthesizer;

use super::args::Command;
use super::errors::CliResult;
use super::io::{read_request, write_response};

pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Check { config } => {
            let summary = check(&config)?;
            write_response(summary)
        }
        Command::Update {
            config,
            entity,
            loaded,
        } => {
            let registry = open(&config)?;
            let document = read_request()?;
            let command = update(&registry, &entity, &document, loaded)?;
            write_response(command)
        }
    }
}

fn open(path: &Path) -> CliResult<EntityRegistry> {
    let config = Config::load(path)?;
    config.apply()?;
    Ok(config.load_registry()?)
}

/// Loads every declaration and summarizes the registered entities
pub fn check(path: &Path) -> CliResult<Value> {
    let registry = open(path)?;
    let entities: Vec<Value> = registry.schemas().map(describe).collect();
    Ok(json!({ "entities": entities }))
}

fn describe(schema: &Arc<EntitySchema>) -> Value {
    let fields: Vec<Value> = schema
        .fields()
        .iter()
        .map(|field| {
            let roles: Vec<&str> = field.roles().iter().map(|role| role.kind()).collect();
            json!({
                "name": field.name(),
                "wire_name": field.wire_name(),
                "roles": roles,
            })
        })
        .collect();

    json!({
        "name": schema.name(),
        "collection": schema.collection(),
        "version": schema.version(),
        "fields": fields,
    })
}

/// Builds the entity from `document` and synthesizes its update command.
/// A `loaded` document is read as stored data, otherwise as logical
/// field values.
pub fn update(
    registry: &EntityRegistry,
    entity: &str,
    document: &Value,
    loaded: bool,
) -> CliResult<Value> {
    let schema = registry.get(entity)?;
    let mut entity = if loaded {
        Entity::from_document(schema, document)?
    } else {
        Entity::from_values(schema, document)?
    };

    let command = UpdateSynthesizer::synthesize(&mut entity);
    Ok(json!({
        "collection": entity.schema().collection(),
        "filter": entity.id().map(|id| json!({"_id": id})),
        "update": command.to_document(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let entities = dir.path().join("entities");
        fs::create_dir(&entities).unwrap();
        fs::write(
            entities.join("posts.json"),
            r#"{
                "name": "posts",
                "version": 2,
                "fields": [
                    {"name": "title", "alias": "t"},
                    {"name": "views", "roles": ["increment"]}
                ]
            }"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("weft.json"),
            r#"{"schema_dir": "entities"}"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_check_summarizes_entities() {
        let dir = workspace();
        let summary = check(&dir.path().join("weft.json")).unwrap();
        let posts = &summary["entities"][0];
        assert_eq!(posts["name"], json!("posts"));
        assert_eq!(posts["version"], json!(2));
        assert_eq!(posts["fields"][0]["wire_name"], json!("t"));
        assert_eq!(posts["fields"][1]["roles"], json!(["increment"]));
    }

    #[test]
    fn test_update_from_values() {
        let dir = workspace();
        let registry = open(&dir.path().join("weft.json")).unwrap();
        let out = update(&registry, "posts", &json!({"title": "Hi", "views": 3}), false).unwrap();
        assert_eq!(out["filter"], Value::Null);
        assert_eq!(
            out["update"],
            json!({"$set": {"t": "Hi"}, "$setOnInsert": {"version": 2}, "$inc": {"views": 3}})
        );
    }

    #[test]
    fn test_update_from_loaded_document() {
        let dir = workspace();
        let registry = open(&dir.path().join("weft.json")).unwrap();
        let stored = json!({"_id": "p1", "t": "Hi", "views": 7, "version": 2});
        let out = update(&registry, "posts", &stored, true).unwrap();
        assert_eq!(out["filter"], json!({"_id": "p1"}));
        assert_eq!(out["update"]["$set"], json!({"t": "Hi"}));
        assert!(out["update"].get("$inc").is_none());
    }

    #[test]
    fn test_update_unknown_entity() {
        let dir = workspace();
        let registry = open(&dir.path().join("weft.json")).unwrap();
        assert!(update(&registry, "nope", &json!({}), false).is_err());
    }
}
