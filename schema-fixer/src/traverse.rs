//! Traversal wrappers lifting a rule over whole trees.
//!
//! Children are the values of a map and the elements of a list,
//! visited in their natural order; map keys are never rewritten. The
//! wrapped rule keeps the dispatch [`TypeReference`] it was entered
//! with all the way down — a traversal never switches type at a tagged
//! choice boundary, that is the rule author's job.

use dynamic_value::{Dynamic, DynamicOps};
use partial_result::DataResult;

use crate::reference::TypeReference;
use crate::rules::TypeRewriteRule;

/// Applies `f` to every child, rebuilding the node. Errors from
/// children are pooled with their partials so a failed branch never
/// discards its siblings' work.
fn map_children<O: DynamicOps>(
    value: &Dynamic<O>,
    mut f: impl FnMut(&Dynamic<O>) -> DataResult<Dynamic<O>>,
) -> DataResult<Dynamic<O>> {
    if let Ok(entries) = value.as_map_entries().into_result() {
        return entries
            .into_iter()
            .fold(DataResult::success(Vec::new()), |acc, (key, child)| {
                acc.apply2(f(&child), move |mut entries, rewritten| {
                    entries.push((key, rewritten));
                    entries
                })
            })
            .map(|entries| value.create_map(entries));
    }
    if let Ok(items) = value.as_list().into_result() {
        return items
            .iter()
            .fold(DataResult::success(Vec::new()), |acc, child| {
                acc.apply2(f(child), |mut items, rewritten| {
                    items.push(rewritten);
                    items
                })
            })
            .map(|items| value.create_list(items));
    }
    DataResult::success(value.clone())
}

fn descend_top_down<O: DynamicOps>(
    rule: &TypeRewriteRule<O>,
    reference: &TypeReference,
    value: &Dynamic<O>,
) -> DataResult<Dynamic<O>> {
    rule.apply(reference, value)
        .flat_map(|value| map_children(&value, |child| descend_top_down(rule, reference, child)))
}

fn descend_bottom_up<O: DynamicOps>(
    rule: &TypeRewriteRule<O>,
    reference: &TypeReference,
    value: &Dynamic<O>,
) -> DataResult<Dynamic<O>> {
    map_children(value, |child| descend_bottom_up(rule, reference, child))
        .flat_map(|value| rule.apply(reference, &value))
}

fn descend_everywhere<O: DynamicOps>(
    rule: &TypeRewriteRule<O>,
    reference: &TypeReference,
    value: &Dynamic<O>,
) -> DataResult<Dynamic<O>> {
    rule.apply(reference, value)
        .flat_map(|value| map_children(&value, |child| rule.apply(reference, child)))
        .flat_map(|value| map_children(&value, |child| descend_everywhere(rule, reference, child)))
}

/// Root first, then recursively every child of the rewritten root.
pub fn top_down<O: DynamicOps>(rule: TypeRewriteRule<O>) -> TypeRewriteRule<O> {
    TypeRewriteRule::of(move |reference, value| descend_top_down(&rule, reference, value))
}

/// Children first, the root last.
pub fn bottom_up<O: DynamicOps>(rule: TypeRewriteRule<O>) -> TypeRewriteRule<O> {
    TypeRewriteRule::of(move |reference, value| descend_bottom_up(&rule, reference, value))
}

/// [`top_down`] of "the rule, then the rule once on each direct
/// child", one level at a time: intermediate nodes see the rule both
/// as a child and as the root of their own descent.
pub fn everywhere<O: DynamicOps>(rule: TypeRewriteRule<O>) -> TypeRewriteRule<O> {
    TypeRewriteRule::of(move |reference, value| descend_everywhere(&rule, reference, value))
}

#[cfg(test)]
mod test {
    use dynamic_value::JsonOps;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use super::*;
    use crate::rules;

    fn entity() -> TypeReference {
        TypeReference::new("entity")
    }
    fn dynamic(value: Value) -> Dynamic<JsonOps> {
        JsonOps::dynamic(value)
    }

    /// Increments every `"hits"` field wherever a map declares one.
    fn bump_hits() -> TypeRewriteRule<JsonOps> {
        rules::update_if_present("hits", |d| d.create_int(d.as_int().or_else(0) + 1))
    }

    #[test]
    fn top_down_reaches_nested_maps_and_lists() {
        let input = dynamic(json!({
            "hits": 1,
            "pet": {"hits": 5},
            "minions": [{"hits": 7}, {"other": 0}],
        }));
        let result = top_down(bump_hits()).apply(&entity(), &input);
        assert_eq!(
            result.into_result().unwrap().into_value(),
            json!({
                "hits": 2,
                "pet": {"hits": 6},
                "minions": [{"hits": 8}, {"other": 0}],
            }),
        );
    }

    #[test]
    fn bottom_up_visits_children_before_root() {
        // The root rule sees already-rewritten children: after the
        // child bump, the root copies the pet's count.
        let copy_up = rules::transform(entity(), |d: Dynamic<JsonOps>| {
            let pet_hits = d.get_at("pet.hits");
            if pet_hits.is_null() {
                d
            } else {
                d.set("hits", pet_hits)
            }
        });
        let rule = bottom_up(rules::seq([bump_hits(), copy_up]));
        let input = dynamic(json!({"pet": {"hits": 1}}));
        let result = rule.apply(&entity(), &input).into_result().unwrap();
        assert_eq!(result.into_value(), json!({"pet": {"hits": 2}, "hits": 2}));
    }

    #[test]
    fn traversal_keeps_the_dispatch_reference() {
        let guarded = rules::set_field(entity(), "tagged", dynamic(json!(true)));
        let input = dynamic(json!({"child": {}}));
        let result = top_down(guarded).apply(&entity(), &input).into_result().unwrap();
        // Both root and child matched the one reference the traversal
        // was entered with.
        assert_eq!(
            result.into_value(),
            json!({"tagged": true, "child": {"tagged": true}}),
        );
    }

    #[test]
    fn everywhere_applies_at_every_level() {
        let input = dynamic(json!({"hits": 0, "pet": {"hits": 0, "toy": {"hits": 0}}}));
        let result = everywhere(bump_hits()).apply(&entity(), &input).into_result().unwrap();
        // The root is visited once; every nested map twice, once as its
        // parent's direct child and once as the root of its own
        // descent.
        assert_eq!(
            result.into_value(),
            json!({"hits": 1, "pet": {"hits": 2, "toy": {"hits": 2}}}),
        );
    }

    #[test]
    fn child_errors_pool_without_discarding_siblings() {
        let collide = rules::rename_field(entity(), "a", "b");
        let input = dynamic(json!({
            "left": {"a": 1, "b": 2},
            "right": {"a": 3},
        }));
        let result = top_down(collide).apply(&entity(), &input);
        assert_eq!(result.error_message(), Some("FieldCollision: b already present"));
        assert_eq!(
            result.partial().map(|d| d.value().clone()),
            Some(json!({"left": {"a": 1, "b": 2}, "right": {"b": 3}})),
        );
    }
}
