//! Path optics over [`Dynamic`] values.
//!
//! A [`Finder`] names a place inside a tree — a field, a list slot, or
//! the remainder of a map — and knows how to read it and how to write
//! it back without mutating anything on the way. Finders compose with
//! [`Finder::then`], which is how nested edits are expressed.

use crate::dynamic::Dynamic;
use crate::ops::DynamicOps;

/// A composable location inside a dynamic tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Finder {
    id: String,
    kind: FinderKind,
}

#[derive(Debug, Clone, PartialEq)]
enum FinderKind {
    Identity,
    Field(String),
    Index(usize),
    Remainder(Vec<String>),
    Then(Box<Finder>, Box<Finder>),
}

impl Finder {
    pub fn identity() -> Self {
        Self { id: "id".to_owned(), kind: FinderKind::Identity }
    }
    pub fn field(name: impl Into<String>) -> Self {
        let name = name.into();
        Self { id: name.clone(), kind: FinderKind::Field(name) }
    }
    pub fn index(index: usize) -> Self {
        Self { id: format!("[{index}]"), kind: FinderKind::Index(index) }
    }
    /// Everything in a map except the named fields.
    pub fn remainder<S: Into<String>>(excluded: impl IntoIterator<Item = S>) -> Self {
        let excluded: Vec<String> = excluded.into_iter().map(Into::into).collect();
        Self { id: "remainder".to_owned(), kind: FinderKind::Remainder(excluded) }
    }

    /// Composes two finders. Identity is a unit on both sides.
    pub fn then(self, other: Self) -> Self {
        match (&self.kind, &other.kind) {
            (FinderKind::Identity, _) => other,
            (_, FinderKind::Identity) => self,
            _ => Self {
                id: format!("{}.{}", self.id, other.id),
                kind: FinderKind::Then(Box::new(self), Box::new(other)),
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reads the pointed-at value; misses read as the empty `Dynamic`.
    pub fn get<O: DynamicOps>(&self, root: &Dynamic<O>) -> Dynamic<O> {
        match &self.kind {
            FinderKind::Identity => root.clone(),
            FinderKind::Field(name) => root.get(name),
            FinderKind::Index(index) => match root.as_list().into_result() {
                Ok(items) => items.get(*index).cloned().unwrap_or_else(|| root.empty()),
                Err(_) => root.empty(),
            },
            FinderKind::Remainder(excluded) => match root.as_map_entries().into_result() {
                Ok(entries) => {
                    let kept = entries
                        .into_iter()
                        .filter(|(key, _)| !is_excluded(key, excluded))
                        .collect();
                    root.create_map(kept)
                }
                Err(_) => root.empty(),
            },
            FinderKind::Then(first, second) => {
                let mid = first.get(root);
                if mid.is_null() {
                    mid
                } else {
                    second.get(&mid)
                }
            }
        }
    }

    /// Writes `value` at the pointed-at place, returning the new root.
    /// Misses (absent field chain, index out of bounds, wrong shape)
    /// leave the root unchanged.
    pub fn set<O: DynamicOps>(&self, root: &Dynamic<O>, value: Dynamic<O>) -> Dynamic<O> {
        match &self.kind {
            FinderKind::Identity => value,
            FinderKind::Field(name) => root.set(name, value),
            FinderKind::Index(index) => match root.as_list().into_result() {
                Ok(mut items) if *index < items.len() => {
                    items[*index] = value;
                    root.create_list(items)
                }
                _ => root.clone(),
            },
            FinderKind::Remainder(excluded) => match root.as_map_entries().into_result() {
                Ok(entries) => {
                    let kept = entries
                        .into_iter()
                        .filter(|(key, _)| is_excluded(key, excluded))
                        .collect();
                    let base = root.create_map(kept);
                    base.try_merge(&value)
                        .or_else_get(|_| root.clone())
                }
                Err(_) => root.clone(),
            },
            FinderKind::Then(first, second) => {
                first.update(root, |mid| second.set(&mid, value))
            }
        }
    }

    /// Reads, applies `f`, writes back. A miss on the read leaves the
    /// root unchanged and `f` never runs.
    pub fn update<O: DynamicOps>(
        &self,
        root: &Dynamic<O>,
        f: impl FnOnce(Dynamic<O>) -> Dynamic<O>,
    ) -> Dynamic<O> {
        let mid = self.get(root);
        if mid.is_null() {
            root.clone()
        } else {
            self.set(root, f(mid))
        }
    }
}

fn is_excluded<O: DynamicOps>(key: &Dynamic<O>, excluded: &[String]) -> bool {
    match key.as_string().into_result() {
        Ok(name) => excluded.iter().any(|ex| *ex == name),
        // A key without a string form cannot be named, so it cannot be
        // excluded.
        Err(_) => false,
    }
}
