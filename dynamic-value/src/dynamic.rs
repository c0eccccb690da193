use std::fmt;
use std::sync::Arc;

use partial_result::DataResult;

use crate::err::ErrorKind;
use crate::ops::{DynamicOps, ValueKind};
use crate::path;

/// A backend value paired with the adapter that understands it.
///
/// Every mutator returns a new `Dynamic`; the original is never
/// touched. The plain mutators (`set`, `remove`, `merge`, …) are
/// lenient: when the receiver has the wrong shape they hand back the
/// receiver unchanged. The `try_` variants report what went wrong
/// through [`DataResult`] instead.
pub struct Dynamic<O: DynamicOps> {
    ops: Arc<O>,
    value: O::Value,
}

impl<O: DynamicOps> Clone for Dynamic<O> {
    fn clone(&self) -> Self {
        Self { ops: Arc::clone(&self.ops), value: self.value.clone() }
    }
}
impl<O: DynamicOps> fmt::Debug for Dynamic<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dynamic").field(&self.value).finish()
    }
}
/// Equal when the values are equal and the ops are the same instance.
impl<O: DynamicOps> PartialEq for Dynamic<O> {
    fn eq(&self, other: &Self) -> bool {
        self.same_ops(other) && self.value == other.value
    }
}

impl<O: DynamicOps> Dynamic<O> {
    pub fn new(ops: Arc<O>, value: O::Value) -> Self {
        Self { ops, value }
    }

    pub fn ops(&self) -> &Arc<O> {
        &self.ops
    }
    pub fn value(&self) -> &O::Value {
        &self.value
    }
    pub fn into_value(self) -> O::Value {
        self.value
    }
    pub fn same_ops(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.ops, &other.ops)
    }
    fn wrap(&self, value: O::Value) -> Self {
        Self { ops: Arc::clone(&self.ops), value }
    }

    pub fn kind(&self) -> ValueKind {
        self.ops.kind(&self.value)
    }
    pub fn is_map(&self) -> bool {
        self.ops.is_map(&self.value)
    }
    pub fn is_list(&self) -> bool {
        self.ops.is_list(&self.value)
    }
    pub fn is_null(&self) -> bool {
        self.ops.is_empty(&self.value)
    }

    /// The no-value `Dynamic` over the same backend.
    pub fn empty(&self) -> Self {
        self.wrap(self.ops.empty())
    }
    pub fn empty_map(&self) -> Self {
        self.wrap(self.ops.create_map(Vec::new()))
    }
    pub fn create_bool(&self, value: bool) -> Self {
        self.wrap(self.ops.create_bool(value))
    }
    pub fn create_int(&self, value: i32) -> Self {
        self.wrap(self.ops.create_int(value))
    }
    pub fn create_long(&self, value: i64) -> Self {
        self.wrap(self.ops.create_long(value))
    }
    pub fn create_float(&self, value: f32) -> Self {
        self.wrap(self.ops.create_float(value))
    }
    pub fn create_double(&self, value: f64) -> Self {
        self.wrap(self.ops.create_double(value))
    }
    pub fn create_string(&self, value: &str) -> Self {
        self.wrap(self.ops.create_string(value))
    }
    pub fn create_list(&self, items: Vec<Self>) -> Self {
        let items = items.into_iter().map(|item| item.value).collect();
        self.wrap(self.ops.create_list(items))
    }
    pub fn create_map(&self, entries: Vec<(Self, Self)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.value, value.value))
            .collect();
        self.wrap(self.ops.create_map(entries))
    }

    /// The value under `field`. Absent fields and non-map receivers
    /// both read as the empty `Dynamic`; only the coercion that follows
    /// can fail.
    pub fn get(&self, field: &str) -> Self {
        let key = self.ops.create_string(field);
        match self.ops.get_map_value(&self.value, &key).into_result() {
            Ok(value) => self.wrap(value),
            Err(_) => self.empty(),
        }
    }
    pub fn has(&self, field: &str) -> bool {
        let key = self.ops.create_string(field);
        self.ops.get_map_value(&self.value, &key).is_success()
    }
    /// Follows a dotted path, reading empty as soon as a hop is absent.
    pub fn get_at(&self, dotted: &str) -> Self {
        match path::segments(dotted) {
            Ok(segs) => segs.iter().fold(self.clone(), |value, seg| value.get(seg)),
            Err(_) => self.empty(),
        }
    }

    pub fn as_bool(&self) -> DataResult<bool> {
        self.ops.get_bool(&self.value)
    }
    pub fn as_int(&self) -> DataResult<i32> {
        self.ops.get_int(&self.value)
    }
    pub fn as_long(&self) -> DataResult<i64> {
        self.ops.get_long(&self.value)
    }
    pub fn as_float(&self) -> DataResult<f32> {
        self.ops.get_float(&self.value)
    }
    pub fn as_double(&self) -> DataResult<f64> {
        self.ops.get_double(&self.value)
    }
    pub fn as_string(&self) -> DataResult<String> {
        self.ops.get_string(&self.value)
    }
    pub fn as_list(&self) -> DataResult<Vec<Self>> {
        self.ops
            .get_list(&self.value)
            .map(|items| items.into_iter().map(|item| self.wrap(item)).collect())
    }
    pub fn as_map_entries(&self) -> DataResult<Vec<(Self, Self)>> {
        self.ops.get_map_entries(&self.value).map(|entries| {
            entries
                .into_iter()
                .map(|(key, value)| (self.wrap(key), self.wrap(value)))
                .collect()
        })
    }

    pub fn try_set(&self, field: &str, entry: Self) -> DataResult<Self> {
        if !self.same_ops(&entry) {
            return ErrorKind::IncompatibleOps.err();
        }
        let key = self.ops.create_string(field);
        self.ops
            .set(&self.value, key, entry.value)
            .map(|value| self.wrap(value))
    }
    pub fn set(&self, field: &str, entry: Self) -> Self {
        self.try_set(field, entry).or_else_get(|_| self.clone())
    }

    pub fn try_remove(&self, field: &str) -> DataResult<Self> {
        let key = self.ops.create_string(field);
        self.ops
            .remove(&self.value, &key)
            .map(|value| self.wrap(value))
    }
    pub fn remove(&self, field: &str) -> Self {
        self.try_remove(field).or_else_get(|_| self.clone())
    }

    /// Rewrites `field` in place when it is present; absent fields
    /// leave the receiver untouched.
    pub fn update(&self, field: &str, f: impl FnOnce(Self) -> Self) -> Self {
        if self.has(field) {
            self.set(field, f(self.get(field)))
        } else {
            self.clone()
        }
    }

    pub fn try_merge(&self, other: &Self) -> DataResult<Self> {
        if !self.same_ops(other) {
            return ErrorKind::IncompatibleOps.err();
        }
        self.ops
            .merge_to_map(&self.value, &other.value)
            .map(|value| self.wrap(value))
    }
    /// Shallow right-biased map merge; non-map receivers are returned
    /// unchanged.
    pub fn merge(&self, other: &Self) -> Self {
        self.try_merge(other).or_else_get(|_| self.clone())
    }

    pub fn try_set_at(&self, dotted: &str, entry: Self) -> DataResult<Self> {
        if !self.same_ops(&entry) {
            return ErrorKind::IncompatibleOps.err();
        }
        match path::segments(dotted) {
            Ok(segs) => DataResult::success(self.set_segments(&segs, entry)),
            Err(kind) => kind.err(),
        }
    }
    /// Writes at a dotted path, creating intermediate maps under absent
    /// hops. Scalar intermediates are left alone and the write is
    /// dropped.
    pub fn set_at(&self, dotted: &str, entry: Self) -> Self {
        self.try_set_at(dotted, entry).or_else_get(|_| self.clone())
    }

    pub fn remove_at(&self, dotted: &str) -> Self {
        match path::segments(dotted) {
            Ok(segs) => self.remove_segments(&segs),
            Err(_) => self.clone(),
        }
    }

    fn set_segments(&self, segs: &[&str], entry: Self) -> Self {
        let base = if self.is_null() { self.empty_map() } else { self.clone() };
        match segs {
            [] => self.clone(),
            [field] => base.set(field, entry),
            [field, rest @ ..] => {
                let child = base.get(field);
                let child = match child.kind() {
                    ValueKind::Map => child,
                    ValueKind::Empty => base.empty_map(),
                    _ => return self.clone(),
                };
                base.set(field, child.set_segments(rest, entry))
            }
        }
    }
    fn remove_segments(&self, segs: &[&str]) -> Self {
        match segs {
            [] => self.clone(),
            [field] => self.remove(field),
            [field, rest @ ..] => {
                let child = self.get(field);
                if child.is_map() {
                    self.set(field, child.remove_segments(rest))
                } else {
                    self.clone()
                }
            }
        }
    }
}
