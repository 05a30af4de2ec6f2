//! Entity record
//!
//! Declared fields are keyed by logical name; counters are kept apart so
//! their pending deltas survive until synthesis. Undeclared fields go to an
//! ordered extension map keyed by wire name.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::predicate::kind_of;
use crate::schema::{EntitySchema, ID_FIELD};

use super::counter::{Counter, Tally};
use super::errors::{EntityError, EntityResult};
use super::state::{EntityPhase, UpdateState};

#[derive(Debug, Clone)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    id: Option<Value>,
    values: HashMap<String, Value>,
    counters: HashMap<String, Counter>,
    extra: Map<String, Value>,
    state: UpdateState,
}

impl Entity {
    /// A new, pending, unidentified entity with no values
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        Self {
            schema,
            id: None,
            values: HashMap::new(),
            counters: HashMap::new(),
            extra: Map::new(),
            state: UpdateState::new(),
        }
    }

    /// Builds a new entity from a document keyed by logical names.
    ///
    /// Values run through the field normalizers; counter values become
    /// pending increments. Unknown keys become extension fields.
    pub fn from_values(schema: Arc<EntitySchema>, values: &Value) -> EntityResult<Self> {
        let Value::Object(map) = values else {
            return Err(EntityError::malformed_document(
                schema.name(),
                format!("expected a document, found {}", kind_of(values)),
            ));
        };

        let mut entity = Self::new(schema);
        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            let is_counter = entity.schema.field(key).map(|field| field.is_counter());
            match is_counter {
                Some(true) => {
                    let delta = Tally::from_value(value).ok_or_else(|| {
                        EntityError::malformed_document(
                            entity.schema.name(),
                            format!("counter '{}' needs a numeric value", key),
                        )
                    })?;
                    entity.increment(key, delta)?;
                }
                Some(false) => entity.set(key, value.clone())?,
                None => entity.set_extra(key.as_str(), value.clone())?,
            }
        }
        Ok(entity)
    }

    /// Builds a new entity from any serializable record
    pub fn from_record<T: Serialize>(schema: Arc<EntitySchema>, record: &T) -> EntityResult<Self> {
        let values = serde_json::to_value(record)
            .map_err(|e| EntityError::malformed_document(schema.name(), e.to_string()))?;
        Self::from_values(schema, &values)
    }

    /// Reads a stored document keyed by wire names. The result is
    /// identified and has no pending change.
    pub fn from_document(schema: Arc<EntitySchema>, document: &Value) -> EntityResult<Self> {
        let Value::Object(map) = document else {
            return Err(EntityError::malformed_document(
                schema.name(),
                format!("expected a document, found {}", kind_of(document)),
            ));
        };
        let Some(id) = map.get(ID_FIELD).filter(|v| !v.is_null()) else {
            return Err(EntityError::malformed_document(
                schema.name(),
                "stored document has no _id",
            ));
        };

        let mut entity = Self::new(Arc::clone(&schema));
        entity.id = Some(id.clone());

        for (key, value) in map {
            if key == ID_FIELD || key == schema.version_field() || value.is_null() {
                continue;
            }
            match schema.field_by_wire_name(key) {
                Some(field) if field.is_counter() => {
                    let resting = Tally::from_value(value).ok_or_else(|| {
                        EntityError::malformed_document(
                            schema.name(),
                            format!("counter '{}' holds {}", field.name(), kind_of(value)),
                        )
                    })?;
                    entity
                        .counters
                        .insert(field.name().to_string(), Counter::at_rest(resting));
                }
                Some(field) => {
                    entity.values.insert(field.name().to_string(), value.clone());
                }
                None => {
                    entity.extra.insert(key.clone(), value.clone());
                }
            }
        }

        entity.state = UpdateState::loaded();
        Ok(entity)
    }

    /// Replaces local state with the store's post-write document
    pub fn refresh(&mut self, document: &Value) -> EntityResult<()> {
        *self = Self::from_document(Arc::clone(&self.schema), document)?;
        Ok(())
    }

    /// Deserializes the record keyed by logical names
    pub fn to_record<T: DeserializeOwned>(&self) -> EntityResult<T> {
        let mut map = Map::new();
        if let Some(id) = &self.id {
            map.insert(ID_FIELD.to_string(), id.clone());
        }
        for field in self.schema.fields() {
            if let Some(value) = self.get(field.name()) {
                map.insert(field.name().to_string(), value);
            }
        }
        for (key, value) in &self.extra {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(map))
            .map_err(|e| EntityError::malformed_document(self.schema.name(), e.to_string()))
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    pub fn phase(&self) -> EntityPhase {
        self.state.phase()
    }

    pub fn should_persist(&self) -> bool {
        self.state.should_persist()
    }

    /// Current value of a declared field; counters report resting plus
    /// pending
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(counter) = self.counters.get(name) {
            return Some(counter.value().to_value());
        }
        self.values.get(name).cloned()
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.counters.contains_key(name) || self.values.contains_key(name)
    }

    pub fn counter(&self, name: &str) -> Option<&Counter> {
        self.counters.get(name)
    }

    /// Assigns a declared field through its normalizers. Null unsets it.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> EntityResult<()> {
        let schema = Arc::clone(&self.schema);
        let field = schema
            .field(name)
            .ok_or_else(|| EntityError::unknown_field(schema.name(), name))?;
        if field.is_counter() {
            return Err(EntityError::counter_assignment(schema.name(), name));
        }

        let value = field
            .normalizers()
            .iter()
            .fold(value.into(), |value, normalize| normalize(value));
        self.put(name, value);
        self.state.mark_changed();
        Ok(())
    }

    pub fn unset(&mut self, name: &str) -> EntityResult<()> {
        self.set(name, Value::Null)
    }

    /// Adds to a counter's pending delta
    pub fn increment(&mut self, name: &str, delta: impl Into<Tally>) -> EntityResult<()> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| EntityError::unknown_field(self.schema.name(), name))?;
        if !field.is_counter() {
            return Err(EntityError::not_a_counter(self.schema.name(), name));
        }

        self.counters
            .entry(name.to_string())
            .or_default()
            .increment(delta.into());
        self.state.mark_changed();
        Ok(())
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Extension fields in insertion order
    pub fn extras(&self) -> &Map<String, Value> {
        &self.extra
    }

    /// Sets an undeclared field by wire name. Null removes it.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) -> EntityResult<()> {
        let key = key.into();
        if key == ID_FIELD || key == self.schema.version_field() {
            return Err(EntityError::reserved_field(self.schema.name(), &key));
        }

        let value = value.into();
        if value.is_null() {
            self.extra.remove(&key);
        } else {
            self.extra.insert(key, value);
        }
        self.state.mark_changed();
        Ok(())
    }

    /// Field values under wire names: declared fields in declaration order,
    /// then extension fields. `_id` and nulls never appear; a declared field
    /// shadows an extension field with the same wire name.
    pub fn dump(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for field in self.schema.fields() {
            if let Some(value) = self.get(field.name()) {
                out.insert(field.wire_name().to_string(), value);
            }
        }
        for (key, value) in &self.extra {
            if value.is_null() || self.schema.field_by_wire_name(key).is_some() {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        out
    }

    /// The stored form: `_id` first when identified, then `dump()`
    pub fn to_document(&self) -> Value {
        let mut out = Map::new();
        if let Some(id) = &self.id {
            out.insert(ID_FIELD.to_string(), id.clone());
        }
        out.extend(self.dump());
        Value::Object(out)
    }

    /// Records a successful write. An existing identifier is kept.
    pub fn mark_persisted(&mut self, id: Value) {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self.state.mark_persisted();
    }

    /// Records a successful append. Every append is a new document, so the
    /// identifier is always replaced.
    pub(crate) fn mark_appended(&mut self, id: Value) {
        self.id = Some(id);
        self.state.mark_persisted();
    }

    /// Stores a synthesized value without normalizing or flagging a change
    pub(crate) fn write_back(&mut self, name: &str, value: Value) {
        self.put(name, value);
    }

    pub(crate) fn collapse_counter(&mut self, name: &str) -> Option<Tally> {
        self.counters.get_mut(name).and_then(Counter::collapse)
    }

    fn put(&mut self, name: &str, value: Value) {
        if value.is_null() {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value);
        }
    }
}
