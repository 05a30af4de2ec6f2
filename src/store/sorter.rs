//! Multi-key document sorting for the in-memory store
//!
//! Stable: documents equal on every key keep their input order.

use std::cmp::Ordering;

use serde_json::Value;

use super::matcher::{compare_same_kind, lookup};

pub struct DocumentSorter;

impl DocumentSorter {
    /// Parses a `$sort` body into ordered `(path, direction)` keys
    pub fn keys(spec: &Value) -> Result<Vec<(String, i64)>, String> {
        let Value::Object(map) = spec else {
            return Err("$sort expects a document".to_string());
        };
        map.iter()
            .map(|(field, direction)| match direction.as_i64() {
                Some(d @ (1 | -1)) => Ok((field.clone(), d)),
                _ => Err(format!("sort direction for '{}' must be 1 or -1", field)),
            })
            .collect()
    }

    pub fn sort(documents: &mut [Value], keys: &[(String, i64)]) {
        documents.sort_by(|a, b| {
            for (path, direction) in keys {
                let ordering = Self::compare_values(lookup(a, path), lookup(b, path));
                let ordering = if *direction < 0 {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Missing < null < bool < number < string < array < document. Dates
    /// order by their text; other arrays and documents tie.
    fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };
                type_order(a)
                    .cmp(&type_order(b))
                    .then_with(|| compare_same_kind(a, b).unwrap_or(Ordering::Equal))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(docs: &[Value]) -> Vec<i64> {
        docs.iter().map(|d| d["id"].as_i64().unwrap()).collect()
    }

    #[test]
    fn test_multi_key_sort_is_stable() {
        let mut docs = vec![
            json!({"id": 1, "g": "b", "n": 2}),
            json!({"id": 2, "g": "a", "n": 1}),
            json!({"id": 3, "g": "b", "n": 2}),
            json!({"id": 4, "g": "b", "n": 5}),
        ];
        let keys = DocumentSorter::keys(&json!({"g": 1, "n": -1})).unwrap();
        DocumentSorter::sort(&mut docs, &keys);
        assert_eq!(ids(&docs), vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_missing_sorts_first() {
        let mut docs = vec![json!({"id": 1, "n": 3}), json!({"id": 2})];
        DocumentSorter::sort(&mut docs, &[("n".to_string(), 1)]);
        assert_eq!(ids(&docs), vec![2, 1]);
    }

    #[test]
    fn test_dates_sort_chronologically() {
        let mut docs = vec![
            json!({"id": 1, "at": {"$date": "2024-05-01T00:00:00.000Z"}}),
            json!({"id": 2, "at": {"$date": "2023-05-01T00:00:00.000Z"}}),
        ];
        DocumentSorter::sort(&mut docs, &[("at".to_string(), 1)]);
        assert_eq!(ids(&docs), vec![2, 1]);
    }

    #[test]
    fn test_invalid_direction() {
        assert!(DocumentSorter::keys(&json!({"a": 2})).is_err());
        assert!(DocumentSorter::keys(&json!([])).is_err());
    }
}
