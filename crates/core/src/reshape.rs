//! Reshaping a flat record dump into nested indexes.
//!
//! These helpers work on record-shaped JSON objects rather than
//! [`EpisodeRecord`](crate::EpisodeRecord) so that dumps from older runs, or
//! with extra fields, can still be regrouped.
//!
//! # Example
//!
//! ```rust
//! use addventure_core::reshape::{index_by, records_from_value};
//! use serde_json::json;
//!
//! let records = records_from_value(json!([
//!     {"id": 1, "thread": null},
//!     {"id": 2, "thread": "Dark"},
//!     {"id": 3, "thread": null},
//! ]))
//! .unwrap();
//!
//! let index = index_by(records, &["thread".to_string()], "id", false, "id").unwrap();
//! assert_eq!(index, json!({"null": [1, 3], "Dark": [2]}));
//! ```

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::{AddventureError, Result};

/// One record-shaped JSON object
pub type RecordMap = Map<String, Value>;

/// Convert a parsed JSON array of objects into records
pub fn records_from_value(value: Value) -> Result<Vec<RecordMap>> {
    let Value::Array(items) = value else {
        return Err(AddventureError::BadInput("expected a JSON list of records".to_string()));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map),
            other => Err(AddventureError::BadInput(format!("not a record: {}", other))),
        })
        .collect()
}

/// The `target` field of each record, `null` where it is missing
pub fn records_as_ids(records: &[RecordMap], target: &str) -> Vec<Value> {
    records.iter().map(|record| field(record, target)).collect()
}

/// Unwrap a group that must hold exactly one item
pub fn render_inner_single(items: Vec<Value>) -> Result<Value> {
    if items.len() != 1 {
        return Err(AddventureError::BadInput(format!(
            "key is not primary, it matches more than one record: {}",
            Value::Array(items)
        )));
    }
    Ok(items.into_iter().next().unwrap_or(Value::Null))
}

/// Group records into nested objects, one level per field in `fields`.
///
/// Each level sorts by (key, `sort_field`) and groups equal keys; the
/// innermost groups, still sorted by `sort_field`, are rendered by `inner`.
pub fn group_by_fields<F>(records: Vec<RecordMap>, fields: &[String], sort_field: &str, inner: &F) -> Result<Value>
where
    F: Fn(Vec<RecordMap>) -> Result<Value>,
{
    let Some((key_field, rest)) = fields.split_first() else {
        return Err(AddventureError::BadInput("at least one key field is required".to_string()));
    };

    let mut records = records;
    records.sort_by(|a, b| {
        let (key_a, key_b) = (field(a, key_field), field(b, key_field));
        compare_values(&sort_key(&key_a), &sort_key(&key_b))
            .then_with(|| compare_values(&key_a, &key_b))
            .then_with(|| compare_values(&field(a, sort_field), &field(b, sort_field)))
    });

    let mut output = Map::new();
    let mut group: Vec<RecordMap> = Vec::new();
    let mut current: Option<Value> = None;

    for record in records {
        let key = field(&record, key_field);
        if current.as_ref().is_some_and(|c| *c != key) {
            let done = std::mem::take(&mut group);
            if let Some(done_key) = current.take() {
                insert_group(&mut output, &done_key, render_group(done, rest, sort_field, inner)?)?;
            }
        }
        current = Some(key);
        group.push(record);
    }
    if let Some(done_key) = current {
        insert_group(&mut output, &done_key, render_group(group, rest, sort_field, inner)?)?;
    }

    Ok(Value::Object(output))
}

/// Distinct keys that render to the same object key (`1` and `"1"`) would
/// overwrite each other, so they are rejected.
fn insert_group(output: &mut Map<String, Value>, key: &Value, group: Value) -> Result<()> {
    let rendered = key_to_string(key)?;
    if output.contains_key(&rendered) {
        return Err(AddventureError::BadInput(format!(
            "values of different types share the key {:?}: {}",
            rendered, key
        )));
    }
    output.insert(rendered, group);
    Ok(())
}

fn render_group<F>(mut group: Vec<RecordMap>, rest: &[String], sort_field: &str, inner: &F) -> Result<Value>
where
    F: Fn(Vec<RecordMap>) -> Result<Value>,
{
    group.sort_by(|a, b| compare_values(&field(a, sort_field), &field(b, sort_field)));
    if rest.is_empty() { inner(group) } else { group_by_fields(group, rest, sort_field, inner) }
}

/// Map keys to (lists of) whole records
pub fn key_by(records: Vec<RecordMap>, keys: &[String], is_primary: bool, sort: &str) -> Result<Value> {
    group_by_fields(records, keys, sort, &|group: Vec<RecordMap>| {
        let items: Vec<Value> = group.into_iter().map(Value::Object).collect();
        if is_primary { render_inner_single(items) } else { Ok(Value::Array(items)) }
    })
}

/// Map keys to (lists of) the `target` field of matching records
pub fn index_by(records: Vec<RecordMap>, keys: &[String], target: &str, is_primary: bool, sort: &str) -> Result<Value> {
    group_by_fields(records, keys, sort, &|group: Vec<RecordMap>| {
        let ids = records_as_ids(&group, target);
        if is_primary { render_inner_single(ids) } else { Ok(Value::Array(ids)) }
    })
}

/// Make every record flat enough for CSV/TSV: lists are joined with
/// `separator`, and anything nested deeper is rejected.
pub fn flatten(records: Vec<RecordMap>, separator: &str, sort: &str) -> Result<Vec<RecordMap>> {
    let mut records = records;

    for record in records.iter_mut() {
        for value in record.values_mut() {
            match value {
                Value::Array(items) => {
                    let parts = items
                        .iter()
                        .map(|item| match item {
                            Value::String(s) => Ok(s.clone()),
                            Value::Number(_) | Value::Bool(_) => Ok(item.to_string()),
                            other => Err(AddventureError::BadInput(format!("Don't know how to flatten: {}", other))),
                        })
                        .collect::<Result<Vec<String>>>()?;
                    *value = Value::String(parts.join(separator));
                }
                Value::Object(_) => {
                    return Err(AddventureError::BadInput(format!("Don't know how to flatten: {}", value)));
                }
                _ => {}
            }
        }
    }

    records.sort_by(|a, b| compare_values(&field(a, sort), &field(b, sort)));
    Ok(records)
}

fn field(record: &RecordMap, name: &str) -> Value {
    record.get(name).cloned().unwrap_or(Value::Null)
}

/// Missing keys sort like empty strings
fn sort_key(value: &Value) -> Value {
    match value {
        Value::Null => Value::String(String::new()),
        other => other.clone(),
    }
}

fn key_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.to_string()),
        other => Err(AddventureError::BadInput(format!("cannot group by unhashable value: {}", other))),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by type first, then by value
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_u64(), y.as_u64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal),
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(x, y)| compare_values(x, y))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
