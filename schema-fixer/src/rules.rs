//! The rewrite-rule algebra.
//!
//! A [`TypeRewriteRule`] is a pure value: a function from a dispatch
//! [`TypeReference`] and a [`Dynamic`] to a rewritten `Dynamic`,
//! wrapped so rules can be cloned, stored and composed. Failures never
//! abort a migration here — they travel as [`DataResult`] errors whose
//! partial value is the pre-edit tree, and the fix layer decides what
//! to keep.
//!
//! Every field primitive in this module is targeted: it names the type
//! it rewrites and is a no-op for any other dispatch, and a no-op on
//! values that are not maps.

use std::sync::Arc;

use dynamic_value::err::ErrorKind;
use dynamic_value::{path, Dynamic, DynamicOps, Finder};
use partial_result::DataResult;

use crate::reference::TypeReference;

/// A composable rewrite of dynamic values, dispatched by type.
pub struct TypeRewriteRule<O: DynamicOps> {
    #[allow(clippy::type_complexity)]
    inner: Arc<dyn Fn(&TypeReference, &Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync>,
}

impl<O: DynamicOps> Clone for TypeRewriteRule<O> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}
impl<O: DynamicOps> std::fmt::Debug for TypeRewriteRule<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TypeRewriteRule")
    }
}

impl<O: DynamicOps> TypeRewriteRule<O> {
    pub fn of(
        rule: impl Fn(&TypeReference, &Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync + 'static,
    ) -> Self {
        Self { inner: Arc::new(rule) }
    }

    pub fn apply(&self, reference: &TypeReference, value: &Dynamic<O>) -> DataResult<Dynamic<O>> {
        (self.inner)(reference, value)
    }

    /// `self`, then `next` on its output.
    pub fn then(self, next: Self) -> Self {
        Self::of(move |reference, value| {
            self.apply(reference, value)
                .flat_map(|value| next.apply(reference, &value))
        })
    }
}

/// The rule that rewrites nothing.
pub fn nop<O: DynamicOps>() -> TypeRewriteRule<O> {
    TypeRewriteRule::of(|_, value| DataResult::success(value.clone()))
}

/// Left-to-right composition; each rule sees the previous rule's
/// output.
pub fn seq<O: DynamicOps>(
    rules: impl IntoIterator<Item = TypeRewriteRule<O>>,
) -> TypeRewriteRule<O> {
    let rules: Vec<_> = rules.into_iter().collect();
    TypeRewriteRule::of(move |reference, value| {
        rules
            .iter()
            .fold(DataResult::success(value.clone()), |acc, rule| {
                acc.flat_map(|value| rule.apply(reference, &value))
            })
    })
}

/// Like [`seq`], but the caller declares the rules order-independent.
/// Application stays strictly left-to-right; the declaration only
/// licenses a future implementation to reorder, so rules passed here
/// must not rely on sequencing.
pub fn all<O: DynamicOps>(
    rules: impl IntoIterator<Item = TypeRewriteRule<O>>,
) -> TypeRewriteRule<O> {
    seq(rules)
}

/// Applies `rule` only to values satisfying `pred`.
pub fn conditional<O: DynamicOps>(
    pred: impl Fn(&Dynamic<O>) -> bool + Send + Sync + 'static,
    rule: TypeRewriteRule<O>,
) -> TypeRewriteRule<O> {
    TypeRewriteRule::of(move |reference, value| {
        if pred(value) {
            rule.apply(reference, value)
        } else {
            DataResult::success(value.clone())
        }
    })
}

pub fn if_field_exists<O: DynamicOps>(
    field: impl Into<String>,
    rule: TypeRewriteRule<O>,
) -> TypeRewriteRule<O> {
    let field = field.into();
    conditional(move |value| value.has(&field), rule)
}

pub fn if_field_missing<O: DynamicOps>(
    field: impl Into<String>,
    rule: TypeRewriteRule<O>,
) -> TypeRewriteRule<O> {
    let field = field.into();
    conditional(move |value| !value.has(&field), rule)
}

pub fn if_field_equals<O: DynamicOps>(
    field: impl Into<String>,
    literal: Dynamic<O>,
    rule: TypeRewriteRule<O>,
) -> TypeRewriteRule<O> {
    let field = field.into();
    conditional(move |value| value.get(&field) == literal, rule)
}

/// Single-pass edit of one field, skipping the rule pipeline entirely.
/// Cheaper than [`if_field_exists`] with a transform rule when nothing
/// needs re-dispatching.
pub fn update_if_present<O: DynamicOps>(
    field: impl Into<String>,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    let field = field.into();
    TypeRewriteRule::of(move |_, value| DataResult::success(value.update(&field, &f)))
}

/// Guard shared by all field primitives: wrong dispatch type or a
/// non-map value pass through untouched.
fn on_type<O: DynamicOps>(
    reference: TypeReference,
    edit: impl Fn(&Dynamic<O>) -> DataResult<Dynamic<O>> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    TypeRewriteRule::of(move |current, value| {
        if *current != reference || !value.is_map() {
            return DataResult::success(value.clone());
        }
        edit(value)
    })
}

fn rename_in<O: DynamicOps>(value: &Dynamic<O>, old: &str, new: &str) -> DataResult<Dynamic<O>> {
    if !value.has(old) {
        return DataResult::success(value.clone());
    }
    if value.has(new) {
        return ErrorKind::FieldCollision(new.to_owned()).err_partial(value.clone());
    }
    DataResult::success(value.remove(old).set(new, value.get(old)))
}

/// Moves the value of `old` to `new`. Missing `old` is a no-op; an
/// already-present `new` is a field collision carrying the untouched
/// map as partial.
pub fn rename_field<O: DynamicOps>(
    reference: TypeReference,
    old: impl Into<String>,
    new: impl Into<String>,
) -> TypeRewriteRule<O> {
    let (old, new) = (old.into(), new.into());
    on_type(reference, move |value| rename_in(value, &old, &new))
}

pub fn rename_fields<O: DynamicOps, A: Into<String>, B: Into<String>>(
    reference: TypeReference,
    renames: impl IntoIterator<Item = (A, B)>,
) -> TypeRewriteRule<O> {
    let renames: Vec<(String, String)> = renames
        .into_iter()
        .map(|(old, new)| (old.into(), new.into()))
        .collect();
    on_type(reference, move |value| {
        renames
            .iter()
            .fold(DataResult::success(value.clone()), |acc, (old, new)| {
                acc.flat_map(|value| rename_in(&value, old, new))
            })
    })
}

/// Replaces the whole value with `f(value)`.
pub fn transform<O: DynamicOps>(
    reference: TypeReference,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    on_type(reference, move |value| DataResult::success(f(value.clone())))
}

/// Rewrites one field in place; missing field is a no-op.
pub fn transform_field<O: DynamicOps>(
    reference: TypeReference,
    field: impl Into<String>,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    let field = field.into();
    on_type(reference, move |value| {
        DataResult::success(value.update(&field, &f))
    })
}

/// Fills in `name` when absent, from a producer over the whole value.
pub fn add_field<O: DynamicOps>(
    reference: TypeReference,
    name: impl Into<String>,
    producer: impl Fn(&Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    let name = name.into();
    on_type(reference, move |value| {
        if value.has(&name) {
            return DataResult::success(value.clone());
        }
        DataResult::success(value.set(&name, producer(value)))
    })
}

/// Unconditionally writes `entry` under `name`.
pub fn set_field<O: DynamicOps>(
    reference: TypeReference,
    name: impl Into<String>,
    entry: Dynamic<O>,
) -> TypeRewriteRule<O> {
    let name = name.into();
    on_type(reference, move |value| value.try_set(&name, entry.clone()))
}

pub fn remove_field<O: DynamicOps>(
    reference: TypeReference,
    name: impl Into<String>,
) -> TypeRewriteRule<O> {
    let name = name.into();
    on_type(reference, move |value| {
        DataResult::success(value.remove(&name))
    })
}

pub fn remove_fields<O: DynamicOps, S: Into<String>>(
    reference: TypeReference,
    names: impl IntoIterator<Item = S>,
) -> TypeRewriteRule<O> {
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    on_type(reference, move |value| {
        DataResult::success(names.iter().fold(value.clone(), |value, name| value.remove(name)))
    })
}

/// Pulls the listed fields out of the value and into a fresh map under
/// `target`. Fields that are absent are skipped; a pre-existing
/// `target` is a collision.
pub fn group_fields<O: DynamicOps, S: Into<String>>(
    reference: TypeReference,
    target: impl Into<String>,
    fields: impl IntoIterator<Item = S>,
) -> TypeRewriteRule<O> {
    let target = target.into();
    let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
    on_type(reference, move |value| {
        if value.has(&target) {
            return ErrorKind::FieldCollision(target.clone()).err_partial(value.clone());
        }
        let mut group = value.empty_map();
        let mut rest = value.clone();
        for field in &fields {
            if value.has(field) {
                group = group.set(field, value.get(field));
                rest = rest.remove(field);
            }
        }
        DataResult::success(rest.set(&target, group))
    })
}

/// Inverse of [`group_fields`]: splices the map under `field` into the
/// value. A spliced key already present at top level is a collision.
pub fn flatten_field<O: DynamicOps>(
    reference: TypeReference,
    field: impl Into<String>,
) -> TypeRewriteRule<O> {
    let field = field.into();
    on_type(reference, move |value| {
        if !value.has(&field) {
            return DataResult::success(value.clone());
        }
        let inner = value.get(&field);
        let entries = match inner.as_map_entries().into_result() {
            Ok(entries) => entries,
            // Not a map: nothing to splice.
            Err(_) => return DataResult::success(value.clone()),
        };
        let base = value.remove(&field);
        for (key, _) in &entries {
            if let Ok(name) = key.as_string().into_result() {
                if base.has(&name) {
                    return ErrorKind::FieldCollision(name).err_partial(value.clone());
                }
            }
        }
        DataResult::success(base.merge(&inner))
    })
}

/// Moves the value at `src_path` to `dst_path`, creating intermediate
/// maps along the destination. A missing source is a no-op.
pub fn move_field<O: DynamicOps>(
    reference: TypeReference,
    src_path: impl Into<String>,
    dst_path: impl Into<String>,
) -> TypeRewriteRule<O> {
    let (src, dst) = (src_path.into(), dst_path.into());
    on_type(reference, move |value| {
        if let Err(kind) = path::segments(&src).and(path::segments(&dst)) {
            return kind.err();
        }
        let moved = value.get_at(&src);
        if moved.is_null() {
            return DataResult::success(value.clone());
        }
        DataResult::success(value.remove_at(&src).set_at(&dst, moved))
    })
}

/// Like [`move_field`] but the source stays.
pub fn copy_field<O: DynamicOps>(
    reference: TypeReference,
    src_path: impl Into<String>,
    dst_path: impl Into<String>,
) -> TypeRewriteRule<O> {
    let (src, dst) = (src_path.into(), dst_path.into());
    on_type(reference, move |value| {
        if let Err(kind) = path::segments(&src).and(path::segments(&dst)) {
            return kind.err();
        }
        let copied = value.get_at(&src);
        if copied.is_null() {
            return DataResult::success(value.clone());
        }
        DataResult::success(value.set_at(&dst, copied))
    })
}

/// Rewrites the value at a dotted path, navigating through a composed
/// field [`Finder`]. Absent paths are no-ops and no parents are
/// created.
pub fn transform_field_at<O: DynamicOps>(
    reference: TypeReference,
    dotted: impl Into<String>,
    f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    let dotted = dotted.into();
    on_type(reference, move |value| {
        let segments = match path::segments(&dotted) {
            Ok(segments) => segments,
            Err(kind) => return kind.err(),
        };
        let finder = segments
            .into_iter()
            .fold(Finder::identity(), |finder, segment| {
                finder.then(Finder::field(segment))
            });
        DataResult::success(finder.update(value, &f))
    })
}

/// Renames the field addressed by `dotted` to a sibling name.
pub fn rename_field_at<O: DynamicOps>(
    reference: TypeReference,
    dotted: impl Into<String>,
    new_name: impl Into<String>,
) -> TypeRewriteRule<O> {
    let (dotted, new_name) = (dotted.into(), new_name.into());
    on_type(reference, move |value| {
        let segments = match path::segments(&dotted) {
            Ok(segments) => segments,
            Err(kind) => return kind.err(),
        };
        let Some((field, parents)) = segments.split_last() else {
            return DataResult::success(value.clone());
        };
        let parent_path = parents.join(".");
        let parent = if parents.is_empty() { value.clone() } else { value.get_at(&parent_path) };
        if !parent.is_map() || !parent.has(field) {
            return DataResult::success(value.clone());
        }
        if parent.has(&new_name) {
            return ErrorKind::FieldCollision(new_name.clone()).err_partial(value.clone());
        }
        let renamed = parent.remove(field).set(&new_name, parent.get(field));
        let result = if parents.is_empty() {
            renamed
        } else {
            value.set_at(&parent_path, renamed)
        };
        DataResult::success(result)
    })
}

pub fn remove_field_at<O: DynamicOps>(
    reference: TypeReference,
    dotted: impl Into<String>,
) -> TypeRewriteRule<O> {
    let dotted = dotted.into();
    on_type(reference, move |value| {
        if let Err(kind) = path::segments(&dotted) {
            return kind.err();
        }
        DataResult::success(value.remove_at(&dotted))
    })
}

/// Fills in the field at a dotted path when absent, creating
/// intermediate maps on the way down.
pub fn add_field_at<O: DynamicOps>(
    reference: TypeReference,
    dotted: impl Into<String>,
    producer: impl Fn(&Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
) -> TypeRewriteRule<O> {
    let dotted = dotted.into();
    on_type(reference, move |value| {
        if let Err(kind) = path::segments(&dotted) {
            return kind.err();
        }
        if !value.get_at(&dotted).is_null() {
            return DataResult::success(value.clone());
        }
        DataResult::success(value.set_at(&dotted, producer(value)))
    })
}

#[cfg(test)]
mod test {
    use dynamic_value::JsonOps;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;

    fn player() -> TypeReference {
        TypeReference::new("player")
    }
    fn other() -> TypeReference {
        TypeReference::new("chunk")
    }
    fn dynamic(value: Value) -> Dynamic<JsonOps> {
        JsonOps::dynamic(value)
    }
    fn rewritten(rule: &TypeRewriteRule<JsonOps>, value: Value) -> Value {
        rule.apply(&player(), &dynamic(value))
            .into_result()
            .unwrap()
            .into_value()
    }

    #[test]
    fn rename_moves_the_value() {
        let rule = rename_field(player(), "name", "displayName");
        assert_eq!(
            rewritten(&rule, json!({"name": "steve", "xp": 100})),
            json!({"displayName": "steve", "xp": 100}),
        );
    }

    #[test]
    fn rename_tolerates_missing_field() {
        let rule = rename_field(player(), "name", "displayName");
        assert_eq!(rewritten(&rule, json!({})), json!({}));
    }

    #[test]
    fn rename_round_trips() {
        let there = rename_field(player(), "name", "displayName");
        let back = rename_field(player(), "displayName", "name");
        let input = json!({"name": "steve", "xp": 100});
        assert_eq!(rewritten(&there.then(back), input.clone()), input);
    }

    #[test]
    fn rename_reports_collisions() {
        let rule = rename_field(player(), "a", "b");
        let input = dynamic(json!({"a": 1, "b": 2}));
        let result = rule.apply(&player(), &input);
        assert_eq!(result.error_message(), Some("FieldCollision: b already present"));
        assert_eq!(result.partial(), Some(&input));
    }

    #[test]
    fn other_types_pass_through() {
        let rule = rename_field(player(), "name", "displayName");
        let input = dynamic(json!({"name": "steve"}));
        assert_eq!(rule.apply(&other(), &input).into_result().unwrap(), input);
    }

    #[test]
    fn non_maps_pass_through() {
        let rule = rename_field(player(), "name", "displayName");
        let input = dynamic(json!([1, 2]));
        assert_eq!(rule.apply(&player(), &input).into_result().unwrap(), input);
    }

    #[test]
    fn group_then_flatten_round_trips() {
        let group = group_fields(player(), "position", ["x", "y", "z"]);
        let flatten = flatten_field(player(), "position");
        let input = json!({"x": 1.0, "y": 2.0, "z": 3.0, "name": "A"});
        assert_eq!(
            rewritten(&group, input.clone()),
            json!({"name": "A", "position": {"x": 1.0, "y": 2.0, "z": 3.0}}),
        );
        assert_eq!(rewritten(&group.then(flatten), input.clone()), input);
    }

    #[test]
    fn group_reports_existing_target() {
        let rule = group_fields(player(), "position", ["x"]);
        let input = dynamic(json!({"x": 1.0, "position": 0}));
        let result = rule.apply(&player(), &input);
        assert_eq!(
            result.error_message(),
            Some("FieldCollision: position already present"),
        );
        assert_eq!(result.partial(), Some(&input));
    }

    #[test]
    fn flatten_reports_colliding_keys() {
        let rule = flatten_field(player(), "wrapped");
        let input = dynamic(json!({"a": 1, "wrapped": {"a": 2}}));
        let result = rule.apply(&player(), &input);
        assert_eq!(result.error_message(), Some("FieldCollision: a already present"));
        assert_eq!(result.partial(), Some(&input));
    }

    #[test]
    fn move_field_creates_destination_parents() {
        let rule = move_field(player(), "stats.hp", "attributes.health.current");
        assert_eq!(
            rewritten(&rule, json!({"stats": {"hp": 20, "mp": 5}})),
            json!({"stats": {"mp": 5}, "attributes": {"health": {"current": 20}}}),
        );
        // Missing source leaves everything alone.
        assert_eq!(rewritten(&rule, json!({"stats": {}})), json!({"stats": {}}));
    }

    #[test]
    fn copy_field_keeps_the_source() {
        let rule = copy_field(player(), "name", "displayName");
        assert_eq!(
            rewritten(&rule, json!({"name": "steve"})),
            json!({"name": "steve", "displayName": "steve"}),
        );
    }

    #[test]
    fn transform_field_at_never_creates_parents() {
        let double = |d: Dynamic<JsonOps>| {
            let n = d.as_int().or_else(0);
            d.create_int(n * 2)
        };
        let rule = transform_field_at(player(), "a.b", double);
        assert_eq!(rewritten(&rule, json!({"a": {"b": 3}})), json!({"a": {"b": 6}}));
        assert_eq!(rewritten(&rule, json!({})), json!({}));
    }

    #[test]
    fn add_field_at_creates_parents() {
        let rule = add_field_at(player(), "a.b.c", |root| root.create_int(5));
        assert_eq!(rewritten(&rule, json!({})), json!({"a": {"b": {"c": 5}}}));
        // Present target is left alone.
        assert_eq!(
            rewritten(&rule, json!({"a": {"b": {"c": 9}}})),
            json!({"a": {"b": {"c": 9}}}),
        );
    }

    #[test]
    fn rename_field_at_renames_a_sibling() {
        let rule = rename_field_at(player(), "inner.old", "new");
        assert_eq!(
            rewritten(&rule, json!({"inner": {"old": 1}})),
            json!({"inner": {"new": 1}}),
        );
    }

    #[test]
    fn invalid_paths_surface() {
        let rule = move_field(player(), "a..b", "c");
        let result = rule.apply(&player(), &dynamic(json!({"a": 1})));
        assert_eq!(
            result.error_message(),
            Some("InvalidPath: empty segment in \"a..b\""),
        );
    }

    #[test]
    fn conditionals_gate_their_rule() {
        let set = set_field(player(), "seen", dynamic(json!(true)));
        let rule = if_field_exists("name", set.clone());
        assert_eq!(
            rewritten(&rule, json!({"name": "A"})),
            json!({"name": "A", "seen": true}),
        );
        assert_eq!(rewritten(&rule, json!({})), json!({}));

        let rule = if_field_equals("mode", dynamic(json!(0)), set);
        assert_eq!(
            rewritten(&rule, json!({"mode": 0})),
            json!({"mode": 0, "seen": true}),
        );
        assert_eq!(rewritten(&rule, json!({"mode": 1})), json!({"mode": 1}));
    }

    #[test]
    fn update_if_present_is_single_pass() {
        let rule = update_if_present("count", |d| d.create_int(d.as_int().or_else(0) + 1));
        assert_eq!(rewritten(&rule, json!({"count": 1})), json!({"count": 2}));
        assert_eq!(rewritten(&rule, json!({})), json!({}));
    }

    #[test]
    fn seq_threads_errors_over_partials() {
        let collide = rename_field(player(), "a", "b");
        let rename_rest = rename_field(player(), "c", "d");
        let result = seq([collide, rename_rest]).apply(&player(), &dynamic(json!({"a": 1, "b": 2, "c": 3})));
        // The collision is reported, and the remaining rename still ran
        // over the partial value.
        assert_eq!(result.error_message(), Some("FieldCollision: b already present"));
        assert_eq!(
            result.partial().map(|d| d.value().clone()),
            Some(json!({"a": 1, "b": 2, "d": 3})),
        );
    }
}
