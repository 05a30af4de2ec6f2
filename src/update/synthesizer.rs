//! Update-instruction synthesis
//!
//! Clauses are computed in this order:
//!
//! 1. Set-on-insert: the schema version (if declared) and every
//!    set-on-insert field. An unset field takes its producer's value; a set
//!    field passes through. The produced value is written back into an
//!    unidentified entity only. A stored document keeps its own value and
//!    the store ignores the clause, so an identified entity stays unset
//!    until it is refreshed.
//! 2. Increment: every counter's nonzero pending delta. The counter
//!    collapses to its resting value. Counters never appear in `$set`.
//! 3. Set: every refresh-on-set field is recomputed through its chain and
//!    written back, then the full dump minus the keys claimed above.
//!
//! Insert synthesis (append-only persistence) runs the same set-on-insert
//! and refresh policies, collapses counters, and emits one whole document
//! instead of three clauses.
//!
//! The result is deterministic for a given entity state apart from the
//! values producers and refresh chains generate.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{EntitySchema, PolicyRole};

use super::command::UpdateCommand;

pub struct UpdateSynthesizer;

impl UpdateSynthesizer {
    /// Compiles the entity's state into one update command. Counters are
    /// collapsed and generated values written back, so the entity matches
    /// what the command writes.
    pub fn synthesize(entity: &mut Entity) -> UpdateCommand {
        let schema = Arc::clone(entity.schema());
        let mut claimed: HashSet<&str> = HashSet::new();

        let write_back = !entity.state().is_identified();
        let set_on_insert = Self::insert_defaults(entity, &schema, write_back);
        if schema.version().is_some() {
            claimed.insert(schema.version_field());
        }
        for field in schema.fields() {
            if matches!(field.policy(), Some(PolicyRole::SetOnInsert(_))) {
                claimed.insert(field.wire_name());
            }
        }

        let mut increment = Map::new();
        for field in schema.fields().iter().filter(|f| f.is_counter()) {
            claimed.insert(field.wire_name());
            if let Some(delta) = entity.collapse_counter(field.name()) {
                increment.insert(field.wire_name().to_string(), delta.to_value());
            }
        }

        Self::refresh(entity, &schema);

        let set: Map<String, Value> = entity
            .dump()
            .into_iter()
            .filter(|(key, _)| !claimed.contains(key.as_str()))
            .collect();

        let command = UpdateCommand::new(set, set_on_insert, increment);
        log_event_with_fields(
            Event::UpdateSynthesized,
            &[
                ("collection", schema.collection()),
                ("inc", command.increment().len().to_string().as_str()),
                ("mode", "update"),
                ("set", command.set().len().to_string().as_str()),
                ("set_on_insert", command.set_on_insert().len().to_string().as_str()),
            ],
        );
        command
    }

    /// Compiles the entity into a complete document for a plain insert:
    /// version key first, then the dump. Set-on-insert producers fill unset
    /// fields, refresh chains run, and counters collapse so their full value
    /// is written. `_id` is never included.
    pub fn synthesize_insert(entity: &mut Entity) -> Map<String, Value> {
        let schema = Arc::clone(entity.schema());

        let mut document = Self::insert_defaults(entity, &schema, true);
        for field in schema.fields().iter().filter(|f| f.is_counter()) {
            entity.collapse_counter(field.name());
        }
        Self::refresh(entity, &schema);
        document.extend(entity.dump());

        log_event_with_fields(
            Event::UpdateSynthesized,
            &[
                ("collection", schema.collection()),
                ("fields", document.len().to_string().as_str()),
                ("mode", "insert"),
            ],
        );
        document
    }

    /// Synthesizes each entity independently, preserving input order
    pub fn synthesize_many<'a, I>(entities: I) -> Vec<UpdateCommand>
    where
        I: IntoIterator<Item = &'a mut Entity>,
    {
        entities.into_iter().map(Self::synthesize).collect()
    }

    /// Version key plus every set-on-insert field, keyed by wire name
    fn insert_defaults(entity: &mut Entity, schema: &EntitySchema, write_back: bool) -> Map<String, Value> {
        let mut defaults = Map::new();
        if let Some(version) = schema.version() {
            defaults.insert(schema.version_field().to_string(), Value::from(version));
        }
        for field in schema.fields() {
            let Some(PolicyRole::SetOnInsert(produce)) = field.policy() else {
                continue;
            };
            let value = match entity.get(field.name()) {
                Some(value) => value,
                None => {
                    let value = produce();
                    if write_back {
                        entity.write_back(field.name(), value.clone());
                    }
                    value
                }
            };
            if !value.is_null() {
                defaults.insert(field.wire_name().to_string(), value);
            }
        }
        defaults
    }

    fn refresh(entity: &mut Entity, schema: &EntitySchema) {
        for field in schema.fields() {
            let Some(PolicyRole::RefreshOnSet(chain)) = field.policy() else {
                continue;
            };
            let current = entity.get(field.name()).unwrap_or(Value::Null);
            let refreshed = chain.iter().fold(current, |value, refresh| refresh(value));
            entity.write_back(field.name(), refreshed);
        }
    }
}
