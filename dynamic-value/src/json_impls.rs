//! [`DynamicOps`] over `serde_json::Value`, the reference backend.

use std::sync::{Arc, OnceLock};

use partial_result::DataResult;
use serde_json::{Map, Number, Value};

use crate::dynamic::Dynamic;
use crate::err::ErrorKind;
use crate::ops::{DynamicOps, ValueKind};

/// The JSON adapter. Stateless; use [`JsonOps::shared`] so every value
/// in a process hangs off the same instance.
#[derive(Debug)]
pub struct JsonOps;

impl JsonOps {
    pub fn shared() -> Arc<JsonOps> {
        static SHARED: OnceLock<Arc<JsonOps>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(JsonOps)))
    }
    /// Wraps a JSON value over the shared instance.
    pub fn dynamic(value: Value) -> Dynamic<JsonOps> {
        Dynamic::new(Self::shared(), value)
    }
}

/// JSON map keys are strings; any other key is stored by its JSON
/// rendering.
fn key_string(key: &Value) -> String {
    match key {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

impl DynamicOps for JsonOps {
    type Value = Value;

    fn empty(&self) -> Value {
        Value::Null
    }
    fn create_bool(&self, value: bool) -> Value {
        Value::Bool(value)
    }
    fn create_int(&self, value: i32) -> Value {
        Value::Number(Number::from(value))
    }
    fn create_long(&self, value: i64) -> Value {
        Value::Number(Number::from(value))
    }
    fn create_float(&self, value: f32) -> Value {
        self.create_double(f64::from(value))
    }
    fn create_double(&self, value: f64) -> Value {
        // Non-finite numbers have no JSON rendering.
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
    fn create_string(&self, value: &str) -> Value {
        Value::String(value.to_owned())
    }
    fn create_list(&self, items: Vec<Value>) -> Value {
        Value::Array(items)
    }
    fn create_map(&self, entries: Vec<(Value, Value)>) -> Value {
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(key, value)| (key_string(&key), value))
            .collect();
        Value::Object(map)
    }

    fn kind(&self, value: &Value) -> ValueKind {
        match value {
            Value::Null => ValueKind::Empty,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(number) if number.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Int,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::List,
            Value::Object(_) => ValueKind::Map,
        }
    }

    fn get_bool(&self, value: &Value) -> DataResult<bool> {
        match value {
            Value::Bool(value) => DataResult::success(*value),
            other => ErrorKind::mismatch(ValueKind::Bool, self.kind(other)).err(),
        }
    }
    fn get_int(&self, value: &Value) -> DataResult<i32> {
        self.get_long(value).map(|value| value as i32)
    }
    fn get_long(&self, value: &Value) -> DataResult<i64> {
        match value {
            Value::Number(number) => DataResult::success(
                number
                    .as_i64()
                    .unwrap_or_else(|| number.as_f64().map_or(0, |float| float as i64)),
            ),
            other => ErrorKind::mismatch(ValueKind::Int, self.kind(other)).err(),
        }
    }
    fn get_float(&self, value: &Value) -> DataResult<f32> {
        self.get_double(value).map(|value| value as f32)
    }
    fn get_double(&self, value: &Value) -> DataResult<f64> {
        match value {
            Value::Number(number) => DataResult::success(number.as_f64().unwrap_or(0.0)),
            other => ErrorKind::mismatch(ValueKind::Float, self.kind(other)).err(),
        }
    }
    fn get_string(&self, value: &Value) -> DataResult<String> {
        match value {
            Value::String(value) => DataResult::success(value.clone()),
            other => ErrorKind::mismatch(ValueKind::String, self.kind(other)).err(),
        }
    }
    fn get_map_entries(&self, value: &Value) -> DataResult<Vec<(Value, Value)>> {
        match value {
            Value::Object(map) => DataResult::success(
                map.iter()
                    .map(|(key, value)| (Value::String(key.clone()), value.clone()))
                    .collect(),
            ),
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn get_list(&self, value: &Value) -> DataResult<Vec<Value>> {
        match value {
            Value::Array(items) => DataResult::success(items.clone()),
            other => ErrorKind::mismatch(ValueKind::List, self.kind(other)).err(),
        }
    }
    fn get_map_value(&self, value: &Value, key: &Value) -> DataResult<Value> {
        let name = key_string(key);
        match value {
            Value::Object(map) => match map.get(&name) {
                Some(entry) => DataResult::success(entry.clone()),
                None => ErrorKind::FieldMissing(name).err(),
            },
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }

    fn set(&self, value: &Value, key: Value, entry: Value) -> DataResult<Value> {
        match value {
            Value::Object(map) => {
                let mut map = map.clone();
                map.insert(key_string(&key), entry);
                DataResult::success(Value::Object(map))
            }
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn remove(&self, value: &Value, key: &Value) -> DataResult<Value> {
        match value {
            Value::Object(map) => {
                let mut map = map.clone();
                map.remove(&key_string(key));
                DataResult::success(Value::Object(map))
            }
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn merge_to_map(&self, map: &Value, other: &Value) -> DataResult<Value> {
        match (map, other) {
            (Value::Object(left), Value::Object(right)) => {
                let mut merged = left.clone();
                for (key, value) in right {
                    merged.insert(key.clone(), value.clone());
                }
                DataResult::success(Value::Object(merged))
            }
            (left, right) => {
                let conflict = ErrorKind::MergeConflict(format!(
                    "cannot merge {} into {}",
                    self.kind(right),
                    self.kind(left),
                ));
                // Keep whichever side still is a map as the best-effort
                // value.
                match (self.is_map(left), self.is_map(right)) {
                    (true, _) => conflict.err_partial(left.clone()),
                    (_, true) => conflict.err_partial(right.clone()),
                    _ => conflict.err(),
                }
            }
        }
    }
    fn merge_to_list(&self, list: &Value, other: &Value) -> DataResult<Value> {
        match (list, other) {
            (Value::Array(left), Value::Array(right)) => {
                let mut merged = left.clone();
                merged.extend(right.iter().cloned());
                DataResult::success(Value::Array(merged))
            }
            (left, right) => {
                let conflict = ErrorKind::MergeConflict(format!(
                    "cannot concatenate {} and {}",
                    self.kind(left),
                    self.kind(right),
                ));
                match (self.is_list(left), self.is_list(right)) {
                    (true, _) => conflict.err_partial(left.clone()),
                    (_, true) => conflict.err_partial(right.clone()),
                    _ => conflict.err(),
                }
            }
        }
    }
}
