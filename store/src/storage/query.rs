//! Equality filters and shallow patches shared by every backend.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::traits::Entity;

/// Equality-only query: every named field must equal the given value, fields
/// not named are wildcards. An empty filter matches everything.
///
/// Numbers compare by numeric value, so filtering an integer field with `7`
/// and a float field with `9.99` both behave as expected.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: BTreeMap<String, Value>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Fields to shallow-merge into a stored record. The record id is never
/// touched, even when the patch names it, and fields the record type does
/// not have are ignored.
#[derive(Debug, Clone, Default)]
pub struct Patch {
    fields: BTreeMap<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value`.
    pub fn set(mut self, field: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.fields.insert(field.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Serialize a record into its JSON object form.
pub(crate) fn to_document<T: Serialize>(record: &T) -> anyhow::Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("record serialized to {other:?}, expected an object"),
    }
}

/// Value equality with numeric normalization: `7` equals `7.0`, recursively
/// inside arrays and objects.
fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| value_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map(|y| value_eq(x, y)).unwrap_or(false))
        }
        _ => a == b,
    }
}

/// Does `record` match every field of `filter`?
pub(crate) fn matches<T: Serialize>(record: &T, filter: &Filter) -> bool {
    if filter.is_empty() {
        return true;
    }
    let Ok(doc) = to_document(record) else {
        return false;
    };
    filter
        .iter()
        .all(|(field, expected)| doc.get(field).map(|v| value_eq(v, expected)).unwrap_or(false))
}

/// Shallow-merge `patch` into `record`, leaving the id untouched.
pub(crate) fn merge_patch<T: Entity>(record: &T, patch: &Patch) -> anyhow::Result<T> {
    let mut doc = to_document(record)?;
    for (field, value) in patch.iter() {
        if field == "id" {
            continue;
        }
        doc.insert(field.to_string(), value.clone());
    }
    Ok(serde_json::from_value(Value::Object(doc))?)
}
