//! Filter evaluation for the in-memory store
//!
//! Supports plain equality, `$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`,
//! `$in`, `$nin`, `$all`, `$exists`, `$not`, `$regex` and the `$and`/`$or`
//! combinators. No type coercion: `"123"` never equals `123`.
//!
//! Ordering comparisons only hold between values of the same kind.
//! Extended dates (`{"$date": "..."}`) compare by their RFC 3339 text.

use std::cmp::Ordering;

use regex::RegexBuilder;
use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};

pub struct DocumentMatcher;

impl DocumentMatcher {
    /// Checks a document against a filter document. `{}` matches
    /// everything.
    pub fn matches(document: &Value, filter: &Value) -> StoreResult<bool> {
        let Value::Object(filter) = filter else {
            return Err(StoreError::MalformedFilter(format!(
                "expected a document, found {}",
                filter
            )));
        };
        Self::matches_all(document, filter)
    }

    fn matches_all(document: &Value, filter: &Map<String, Value>) -> StoreResult<bool> {
        for (key, condition) in filter {
            let matched = match key.as_str() {
                "$and" => {
                    let mut all = true;
                    for clause in Self::clauses(condition, key)? {
                        if !Self::matches(document, clause)? {
                            all = false;
                            break;
                        }
                    }
                    all
                }
                "$or" => {
                    let mut any = false;
                    for clause in Self::clauses(condition, key)? {
                        if Self::matches(document, clause)? {
                            any = true;
                            break;
                        }
                    }
                    any
                }
                op if op.starts_with('$') => {
                    return Err(StoreError::UnsupportedOperator(op.to_string()))
                }
                path => Self::matches_field(lookup(document, path), condition)?,
            };
            if !matched {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn clauses<'a>(condition: &'a Value, op: &str) -> StoreResult<&'a Vec<Value>> {
        condition
            .as_array()
            .ok_or_else(|| StoreError::MalformedFilter(format!("{} expects an array", op)))
    }

    fn matches_field(actual: Option<&Value>, condition: &Value) -> StoreResult<bool> {
        match condition {
            Value::Object(ops) if is_operator_document(ops) => {
                let options = ops.get("$options").and_then(Value::as_str).unwrap_or("");
                for (op, operand) in ops {
                    if op == "$options" {
                        continue;
                    }
                    if !Self::apply(actual, op, operand, options)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            expected => Ok(equals(actual, expected)),
        }
    }

    fn apply(actual: Option<&Value>, op: &str, operand: &Value, options: &str) -> StoreResult<bool> {
        let matched = match op {
            "$eq" => equals(actual, operand),
            "$ne" => !equals(actual, operand),
            "$gt" => compares(actual, operand, |o| o == Ordering::Greater),
            "$gte" => compares(actual, operand, |o| o != Ordering::Less),
            "$lt" => compares(actual, operand, |o| o == Ordering::Less),
            "$lte" => compares(actual, operand, |o| o != Ordering::Greater),
            "$in" => Self::list(operand, op)?.iter().any(|v| equals(actual, v)),
            "$nin" => !Self::list(operand, op)?.iter().any(|v| equals(actual, v)),
            "$all" => {
                let wanted = Self::list(operand, op)?;
                match actual {
                    Some(Value::Array(items)) => wanted.iter().all(|w| items.contains(w)),
                    Some(single) => wanted.iter().all(|w| w == single),
                    None => false,
                }
            }
            "$exists" => {
                let wanted = operand.as_bool().ok_or_else(|| {
                    StoreError::MalformedFilter("$exists expects a boolean".to_string())
                })?;
                actual.is_some() == wanted
            }
            "$not" => !Self::matches_field(actual, operand)?,
            "$regex" => {
                let pattern = operand.as_str().ok_or_else(|| {
                    StoreError::MalformedFilter("$regex expects a string".to_string())
                })?;
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(options.contains('i'))
                    .multi_line(options.contains('m'))
                    .dot_matches_new_line(options.contains('s'))
                    .ignore_whitespace(options.contains('x'))
                    .build()
                    .map_err(|e| StoreError::MalformedFilter(e.to_string()))?;
                match actual {
                    Some(Value::String(s)) => regex.is_match(s),
                    _ => false,
                }
            }
            other => return Err(StoreError::UnsupportedOperator(other.to_string())),
        };
        Ok(matched)
    }

    fn list<'a>(operand: &'a Value, op: &str) -> StoreResult<&'a Vec<Value>> {
        operand
            .as_array()
            .ok_or_else(|| StoreError::MalformedFilter(format!("{} expects an array", op)))
    }
}

/// Resolves a dotted path through nested documents
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}

/// Extended JSON wrappers (`{"$date": ...}`) are values, not operators
pub(crate) fn is_operator_document(map: &Map<String, Value>) -> bool {
    !map.is_empty() && !is_date(map) && map.keys().all(|k| k.starts_with('$'))
}

fn is_date(map: &Map<String, Value>) -> bool {
    map.len() == 1 && map.contains_key("$date")
}

/// Equality with the document-store conventions: null matches a missing
/// field, and an array field matches any of its elements
fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) if value == expected => true,
        Some(Value::Array(items)) => items.iter().any(|item| item == expected),
        Some(_) => false,
    }
}

fn compares(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|value| compare_same_kind(value, bound))
        .map_or(false, accept)
}

pub(crate) fn compare_same_kind(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Object(a), Value::Object(b)) if is_date(a) && is_date(b) => {
            match (a.get("$date"), b.get("$date")) {
                (Some(Value::String(a)), Some(Value::String(b))) => Some(a.cmp(b)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(doc: &Value, filter: Value) -> bool {
        DocumentMatcher::matches(doc, &filter).unwrap()
    }

    #[test]
    fn test_equality_has_no_coercion() {
        let doc = json!({"value": 123, "name": "Alice"});
        assert!(check(&doc, json!({"value": 123})));
        assert!(!check(&doc, json!({"value": "123"})));
        assert!(check(&doc, json!({})));
    }

    #[test]
    fn test_null_matches_missing() {
        let doc = json!({"a": 1});
        assert!(check(&doc, json!({"b": null})));
        assert!(!check(&doc, json!({"a": null})));
    }

    #[test]
    fn test_range_operators() {
        let doc = json!({"age": 25});
        assert!(check(&doc, json!({"age": {"$gte": 18, "$lt": 30}})));
        assert!(!check(&doc, json!({"age": {"$gt": 25}})));
        assert!(!check(&doc, json!({"age": {"$gt": "1"}})));
        assert!(!check(&doc, json!({"missing": {"$lt": 10}})));
    }

    #[test]
    fn test_dates_compare_by_text() {
        let doc = json!({"at": {"$date": "2024-03-01T00:00:00.000Z"}});
        assert!(check(&doc, json!({"at": {"$date": "2024-03-01T00:00:00.000Z"}})));
        assert!(check(
            &doc,
            json!({"at": {"$gte": {"$date": "2024-01-01T00:00:00.000Z"}, "$lt": {"$date": "2024-04-01T00:00:00.000Z"}}})
        ));
    }

    #[test]
    fn test_membership_operators() {
        let doc = json!({"tag": "b", "tags": ["x", "y"]});
        assert!(check(&doc, json!({"tag": {"$in": ["a", "b"]}})));
        assert!(check(&doc, json!({"tag": {"$nin": ["a"]}})));
        assert!(check(&doc, json!({"tags": {"$all": ["y", "x"]}})));
        assert!(check(&doc, json!({"tags": "x"})));
        assert!(check(&doc, json!({"tags": {"$not": {"$all": ["x", "z"]}}})));
    }

    #[test]
    fn test_exists_and_regex() {
        let doc = json!({"name": "Alice"});
        assert!(check(&doc, json!({"name": {"$exists": true}, "age": {"$exists": false}})));
        assert!(check(&doc, json!({"name": {"$regex": "^al", "$options": "i"}})));
        assert!(!check(&doc, json!({"name": {"$regex": "^al"}})));
    }

    #[test]
    fn test_logical_combinators() {
        let doc = json!({"a": 1, "b": 2});
        assert!(check(&doc, json!({"$or": [{"a": 5}, {"b": 2}]})));
        assert!(!check(&doc, json!({"$and": [{"a": 1}, {"b": 3}]})));
        assert!(check(&doc, json!({"$and": [{"a": 1}, {"$or": [{"b": 2}, {"c": 3}]}]})));
    }

    #[test]
    fn test_dotted_paths() {
        let doc = json!({"a": {"b": {"c": 4}}});
        assert!(check(&doc, json!({"a.b.c": 4})));
        assert_eq!(lookup(&doc, "a.x"), None);
    }

    #[test]
    fn test_unsupported_operators_are_errors() {
        let doc = json!({"a": 1});
        assert!(DocumentMatcher::matches(&doc, &json!({"$expr": {}})).is_err());
        assert!(DocumentMatcher::matches(&doc, &json!({"a": {"$size": 1}})).is_err());
        assert!(DocumentMatcher::matches(&doc, &json!([1])).is_err());
    }
}
