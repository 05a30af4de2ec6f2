//! Named value transformers and default producers
//!
//! Declaration files refer to functions by name. The same table backs the
//! `upper`/`lower` presets on `FieldDef`.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::expression::{date_value, Transformer};

/// A zero-argument default value producer
pub type Producer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Names accepted by `named_transformer`
pub const TRANSFORMER_NAMES: &[&str] = &["upper", "lower", "trim", "now", "uuid", "zero"];

/// Names accepted by `named_producer`
pub const PRODUCER_NAMES: &[&str] = &["now", "uuid", "zero"];

fn map_string(f: fn(&str) -> String) -> Transformer {
    Arc::new(move |value: Value| match value {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    })
}

pub fn upper() -> Transformer {
    map_string(|s| s.to_uppercase())
}

pub fn lower() -> Transformer {
    map_string(|s| s.to_lowercase())
}

pub fn trim() -> Transformer {
    map_string(|s| s.trim().to_string())
}

fn now_value() -> Value {
    date_value(&Utc::now())
}

fn uuid_value() -> Value {
    Value::String(Uuid::new_v4().to_string())
}

/// Looks up a transformer by name. Constant producers become transformers
/// that ignore their input.
pub fn named_transformer(name: &str) -> Option<Transformer> {
    let transformer: Transformer = match name {
        "upper" => upper(),
        "lower" => lower(),
        "trim" => trim(),
        "now" => Arc::new(|_: Value| now_value()),
        "uuid" => Arc::new(|_: Value| uuid_value()),
        "zero" => Arc::new(|_: Value| Value::from(0)),
        _ => return None,
    };
    Some(transformer)
}

/// Looks up a default producer by name
pub fn named_producer(name: &str) -> Option<Producer> {
    let producer: Producer = match name {
        "now" => Arc::new(now_value),
        "uuid" => Arc::new(uuid_value),
        "zero" => Arc::new(|| Value::from(0)),
        _ => return None,
    };
    Some(producer)
}
