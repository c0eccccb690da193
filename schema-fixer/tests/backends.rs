//! One rule set, two backends: fixes written against the ops
//! abstraction migrate JSON documents and in-memory trees alike.

use dynamic_value::{Dynamic, DynamicOps, JsonOps, TreeOps, TreeValue};
use partial_result::DataResult;
use pretty_assertions::assert_eq;
use schema_fixer::{rules, TypeReference, TypeRewriteRule};
use serde_json::json;

fn player() -> TypeReference {
    TypeReference::new("player")
}

/// The overhaul written once, for whatever backend it is handed.
fn naming_overhaul<O: DynamicOps>() -> TypeRewriteRule<O> {
    rules::seq([
        rules::rename_field(player(), "playerName", "name"),
        rules::group_fields(player(), "position", ["x", "y", "z"]),
        rules::add_field(player(), "health", |d: &Dynamic<O>| d.create_double(20.0)),
    ])
}

/// Builds the same sample document through the generic constructors.
fn sample<O: DynamicOps>(root: &Dynamic<O>) -> Dynamic<O> {
    root.create_map(vec![
        (root.create_string("playerName"), root.create_string("Alex")),
        (root.create_string("x"), root.create_double(1.5)),
        (root.create_string("y"), root.create_double(2.5)),
        (root.create_string("z"), root.create_double(3.5)),
    ])
}

fn check_migrated<O: DynamicOps>(migrated: &Dynamic<O>) {
    assert_eq!(
        migrated.get("name").as_string(),
        DataResult::success("Alex".to_owned()),
    );
    assert_eq!(migrated.get_at("position.y").as_double(), DataResult::success(2.5));
    assert_eq!(migrated.get("health").as_double(), DataResult::success(20.0));
    assert!(!migrated.has("playerName"));
    assert!(!migrated.has("x"));
}

#[test]
fn the_same_fix_runs_over_json() {
    let root = JsonOps::dynamic(json!(null));
    let migrated = naming_overhaul()
        .apply(&player(), &sample(&root))
        .into_result()
        .unwrap();
    check_migrated(&migrated);
    assert_eq!(
        migrated.value(),
        &json!({
            "name": "Alex",
            "position": {"x": 1.5, "y": 2.5, "z": 3.5},
            "health": 20.0,
        }),
    );
}

#[test]
fn the_same_fix_runs_over_trees() {
    let root = TreeOps::dynamic(TreeValue::Empty);
    let migrated = naming_overhaul()
        .apply(&player(), &sample(&root))
        .into_result()
        .unwrap();
    check_migrated(&migrated);
}

fn check_list_merge<O: DynamicOps>(root: &Dynamic<O>) {
    let ops = root.ops();
    let left = ops.create_list(vec![ops.create_long(1), ops.create_long(2)]);
    let right = ops.create_list(vec![ops.create_long(3)]);
    let merged = ops.merge_to_list(&left, &right).into_result().unwrap();
    let items: Vec<i64> = ops
        .get_list(&merged)
        .into_result()
        .unwrap()
        .iter()
        .map(|item| ops.get_long(item).into_result().unwrap())
        .collect();
    assert_eq!(items, vec![1, 2, 3]);
    // The inputs are untouched.
    assert_eq!(ops.get_list(&left).into_result().unwrap().len(), 2);

    // Merging a non-list conflicts, keeping the list side as the
    // best-effort value.
    let conflict = ops.merge_to_list(&left, &ops.create_long(9));
    assert_eq!(
        conflict.error_message(),
        Some("MergeConflict: cannot concatenate list and int"),
    );
    assert_eq!(conflict.partial(), Some(&left));
}

#[test]
fn lists_merge_on_both_backends() {
    check_list_merge(&JsonOps::dynamic(json!(null)));
    check_list_merge(&TreeOps::dynamic(TreeValue::Empty));
}

#[test]
fn backends_never_cross() {
    let json_doc = sample(&JsonOps::dynamic(json!(null)));
    let stray = JsonOps::dynamic(json!("intruder"));
    // Two handles to the shared adapter are the same instance.
    assert!(json_doc.same_ops(&stray));

    let fresh = Dynamic::new(std::sync::Arc::new(JsonOps), json!("intruder"));
    assert!(!json_doc.same_ops(&fresh));
    assert_eq!(
        json_doc.try_set("tag", fresh).error_message(),
        Some("IncompatibleOps: mixed values from different backends"),
    );
}
