//! A self-contained in-memory backend.
//!
//! [`TreeValue`] is the crate's own document representation: no
//! external format, no serialization, just the shapes every backend
//! shares. Unlike JSON objects it keeps map entries in insertion
//! order, which makes it the convenient backend for programs that
//! build documents in memory and for exercising code against a second
//! adapter.

use std::sync::{Arc, OnceLock};

use partial_result::DataResult;

use crate::dynamic::Dynamic;
use crate::err::ErrorKind;
use crate::ops::{DynamicOps, ValueKind};

/// One node of an in-memory document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeValue {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<TreeValue>),
    /// Entries in insertion order; keys are unique.
    Map(Vec<(TreeValue, TreeValue)>),
}

impl TreeValue {
    fn entry<'v>(&'v self, key: &TreeValue) -> Option<&'v TreeValue> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find_map(|(existing, value)| (existing == key).then_some(value)),
            _ => None,
        }
    }
}

/// The adapter for [`TreeValue`]. Stateless; use [`TreeOps::shared`].
#[derive(Debug)]
pub struct TreeOps;

impl TreeOps {
    pub fn shared() -> Arc<TreeOps> {
        static SHARED: OnceLock<Arc<TreeOps>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(TreeOps)))
    }
    /// Wraps a tree over the shared instance.
    pub fn dynamic(value: TreeValue) -> Dynamic<TreeOps> {
        Dynamic::new(Self::shared(), value)
    }
}

/// Replaces the value under `key` in place, or appends a new entry.
fn upsert(entries: &mut Vec<(TreeValue, TreeValue)>, key: TreeValue, value: TreeValue) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, existing)) => *existing = value,
        None => entries.push((key, value)),
    }
}

impl DynamicOps for TreeOps {
    type Value = TreeValue;

    fn empty(&self) -> TreeValue {
        TreeValue::Empty
    }
    fn create_bool(&self, value: bool) -> TreeValue {
        TreeValue::Bool(value)
    }
    fn create_int(&self, value: i32) -> TreeValue {
        TreeValue::Int(i64::from(value))
    }
    fn create_long(&self, value: i64) -> TreeValue {
        TreeValue::Int(value)
    }
    fn create_float(&self, value: f32) -> TreeValue {
        TreeValue::Float(f64::from(value))
    }
    fn create_double(&self, value: f64) -> TreeValue {
        TreeValue::Float(value)
    }
    fn create_string(&self, value: &str) -> TreeValue {
        TreeValue::String(value.to_owned())
    }
    fn create_list(&self, items: Vec<TreeValue>) -> TreeValue {
        TreeValue::List(items)
    }
    fn create_map(&self, entries: Vec<(TreeValue, TreeValue)>) -> TreeValue {
        let mut unique = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            upsert(&mut unique, key, value);
        }
        TreeValue::Map(unique)
    }

    fn kind(&self, value: &TreeValue) -> ValueKind {
        match value {
            TreeValue::Empty => ValueKind::Empty,
            TreeValue::Bool(_) => ValueKind::Bool,
            TreeValue::Int(_) => ValueKind::Int,
            TreeValue::Float(_) => ValueKind::Float,
            TreeValue::String(_) => ValueKind::String,
            TreeValue::List(_) => ValueKind::List,
            TreeValue::Map(_) => ValueKind::Map,
        }
    }

    fn get_bool(&self, value: &TreeValue) -> DataResult<bool> {
        match value {
            TreeValue::Bool(value) => DataResult::success(*value),
            other => ErrorKind::mismatch(ValueKind::Bool, self.kind(other)).err(),
        }
    }
    fn get_int(&self, value: &TreeValue) -> DataResult<i32> {
        self.get_long(value).map(|value| value as i32)
    }
    fn get_long(&self, value: &TreeValue) -> DataResult<i64> {
        match value {
            TreeValue::Int(value) => DataResult::success(*value),
            TreeValue::Float(value) => DataResult::success(*value as i64),
            other => ErrorKind::mismatch(ValueKind::Int, self.kind(other)).err(),
        }
    }
    fn get_float(&self, value: &TreeValue) -> DataResult<f32> {
        self.get_double(value).map(|value| value as f32)
    }
    fn get_double(&self, value: &TreeValue) -> DataResult<f64> {
        match value {
            TreeValue::Float(value) => DataResult::success(*value),
            TreeValue::Int(value) => DataResult::success(*value as f64),
            other => ErrorKind::mismatch(ValueKind::Float, self.kind(other)).err(),
        }
    }
    fn get_string(&self, value: &TreeValue) -> DataResult<String> {
        match value {
            TreeValue::String(value) => DataResult::success(value.clone()),
            other => ErrorKind::mismatch(ValueKind::String, self.kind(other)).err(),
        }
    }
    fn get_map_entries(&self, value: &TreeValue) -> DataResult<Vec<(TreeValue, TreeValue)>> {
        match value {
            TreeValue::Map(entries) => DataResult::success(entries.clone()),
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn get_list(&self, value: &TreeValue) -> DataResult<Vec<TreeValue>> {
        match value {
            TreeValue::List(items) => DataResult::success(items.clone()),
            other => ErrorKind::mismatch(ValueKind::List, self.kind(other)).err(),
        }
    }
    fn get_map_value(&self, value: &TreeValue, key: &TreeValue) -> DataResult<TreeValue> {
        match value {
            TreeValue::Map(_) => match value.entry(key) {
                Some(entry) => DataResult::success(entry.clone()),
                None => ErrorKind::FieldMissing(format!("{key:?}")).err(),
            },
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }

    fn set(&self, value: &TreeValue, key: TreeValue, entry: TreeValue) -> DataResult<TreeValue> {
        match value {
            TreeValue::Map(entries) => {
                let mut entries = entries.clone();
                upsert(&mut entries, key, entry);
                DataResult::success(TreeValue::Map(entries))
            }
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn remove(&self, value: &TreeValue, key: &TreeValue) -> DataResult<TreeValue> {
        match value {
            TreeValue::Map(entries) => {
                let entries = entries
                    .iter()
                    .filter(|(existing, _)| existing != key)
                    .cloned()
                    .collect();
                DataResult::success(TreeValue::Map(entries))
            }
            other => ErrorKind::mismatch(ValueKind::Map, self.kind(other)).err(),
        }
    }
    fn merge_to_map(&self, map: &TreeValue, other: &TreeValue) -> DataResult<TreeValue> {
        match (map, other) {
            (TreeValue::Map(left), TreeValue::Map(right)) => {
                let mut merged = left.clone();
                for (key, value) in right {
                    upsert(&mut merged, key.clone(), value.clone());
                }
                DataResult::success(TreeValue::Map(merged))
            }
            (left, right) => {
                let conflict = ErrorKind::MergeConflict(format!(
                    "cannot merge {} into {}",
                    self.kind(right),
                    self.kind(left),
                ));
                match (self.is_map(left), self.is_map(right)) {
                    (true, _) => conflict.err_partial(left.clone()),
                    (_, true) => conflict.err_partial(right.clone()),
                    _ => conflict.err(),
                }
            }
        }
    }
    fn merge_to_list(&self, list: &TreeValue, other: &TreeValue) -> DataResult<TreeValue> {
        match (list, other) {
            (TreeValue::List(left), TreeValue::List(right)) => {
                let mut merged = left.clone();
                merged.extend(right.iter().cloned());
                DataResult::success(TreeValue::List(merged))
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
