//! Three-clause update command

use serde_json::{Map, Value};

use crate::expression::{Expression, Repr};
use crate::predicate::kind_of;

use super::errors::{UpdateError, UpdateResult};

pub const SET: &str = "$set";
pub const SET_ON_INSERT: &str = "$setOnInsert";
pub const INC: &str = "$inc";

/// Set, set-on-insert and increment clauses. The clauses never share a
/// key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCommand {
    set: Map<String, Value>,
    set_on_insert: Map<String, Value>,
    increment: Map<String, Value>,
}

impl UpdateCommand {
    pub fn new(
        set: Map<String, Value>,
        set_on_insert: Map<String, Value>,
        increment: Map<String, Value>,
    ) -> Self {
        Self {
            set,
            set_on_insert,
            increment,
        }
    }

    /// Re-reads an update document. Only `$set`, `$setOnInsert` and `$inc`
    /// are accepted, each holding a document.
    pub fn from_document(document: &Value) -> UpdateResult<Self> {
        let Value::Object(map) = document else {
            return Err(UpdateError::malformed(format!(
                "expected an update document, found {}",
                kind_of(document)
            )));
        };

        let mut command = Self::default();
        for (key, body) in map {
            let Value::Object(body) = body else {
                return Err(UpdateError::malformed(format!(
                    "{} must hold a document, found {}",
                    key,
                    kind_of(body)
                )));
            };
            let slot = match key.as_str() {
                SET => &mut command.set,
                SET_ON_INSERT => &mut command.set_on_insert,
                INC => &mut command.increment,
                other => {
                    return Err(UpdateError::malformed(format!(
                        "unsupported update operator '{}'",
                        other
                    )))
                }
            };
            *slot = body.clone();
        }
        Ok(command)
    }

    pub fn set(&self) -> &Map<String, Value> {
        &self.set
    }

    pub fn set_on_insert(&self) -> &Map<String, Value> {
        &self.set_on_insert
    }

    pub fn increment(&self) -> &Map<String, Value> {
        &self.increment
    }

    /// All three clauses empty. Still a valid command.
    pub fn is_noop(&self) -> bool {
        self.set.is_empty() && self.set_on_insert.is_empty() && self.increment.is_empty()
    }

    /// Wire form: `$set`, `$setOnInsert`, `$inc` in that order, empty
    /// clauses omitted
    pub fn to_document(&self) -> Value {
        let mut out = Map::new();
        for (key, clause) in [
            (SET, &self.set),
            (SET_ON_INSERT, &self.set_on_insert),
            (INC, &self.increment),
        ] {
            if !clause.is_empty() {
                out.insert(key.to_string(), Value::Object(clause.clone()));
            }
        }
        Value::Object(out)
    }
}

impl Expression for UpdateCommand {
    fn to_representation(&self) -> Repr {
        Repr::Value(self.to_document())
    }

    fn is_empty(&self) -> bool {
        self.is_noop()
    }
}

impl From<UpdateCommand> for Value {
    fn from(command: UpdateCommand) -> Self {
        command.to_document()
    }
}

impl TryFrom<Value> for UpdateCommand {
    type Error = UpdateError;

    fn try_from(value: Value) -> UpdateResult<Self> {
        Self::from_document(&value)
    }
}
