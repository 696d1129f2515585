use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::store::StoreError;

pub type JsonMap = Map<String, Value>;

/// A stored record: its id plus the flat field bag written by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: JsonMap,
}

impl Document {
    pub fn new(id: impl Into<String>, data: JsonMap) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }

    /// The document as a single JSON object with `id` folded in.
    pub fn to_json(&self) -> Value {
        let mut map = self.data.clone();
        map.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(map)
    }

    /// Decode into a typed record. The record sees `id` like any other field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.to_json())?)
    }
}

/// Serialize a typed record into a storable field bag. `id` is kept out of
/// the payload since it is the document key.
pub fn to_fields<T: Serialize>(record: &T) -> Result<JsonMap, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        _ => Err(StoreError::NotAnObject),
    }
}

/// Shallow merge: every top-level key of `patch` replaces the stored value.
pub fn merge_fields(target: &mut JsonMap, patch: JsonMap) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

/// The subset of `patch` that would change `current`.
pub fn diff_fields(current: &JsonMap, patch: JsonMap) -> JsonMap {
    patch
        .into_iter()
        .filter(|(key, value)| current.get(key) != Some(value))
        .collect()
}
