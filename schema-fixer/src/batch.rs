//! Fluent batches of field edits.
//!
//! [`batch`] records a script of renames, removals, sets and
//! transforms against one type and packs it into a single rule. The
//! observable result is exactly the sequential expansion of the listed
//! primitives; batching only saves the reader from spelling out a
//! `seq` of one-liners.

use dynamic_value::{Dynamic, DynamicOps};

use crate::reference::TypeReference;
use crate::rules::{self, TypeRewriteRule};

/// The script under construction. Obtained through [`batch`].
pub struct Batch<O: DynamicOps> {
    reference: TypeReference,
    steps: Vec<TypeRewriteRule<O>>,
}

impl<O: DynamicOps> Batch<O> {
    fn step(mut self, rule: TypeRewriteRule<O>) -> Self {
        self.steps.push(rule);
        self
    }
    pub fn rename(self, old: impl Into<String>, new: impl Into<String>) -> Self {
        let rule = rules::rename_field(self.reference.clone(), old, new);
        self.step(rule)
    }
    pub fn remove(self, name: impl Into<String>) -> Self {
        let rule = rules::remove_field(self.reference.clone(), name);
        self.step(rule)
    }
    pub fn set(self, name: impl Into<String>, entry: Dynamic<O>) -> Self {
        let rule = rules::set_field(self.reference.clone(), name, entry);
        self.step(rule)
    }
    pub fn transform(
        self,
        field: impl Into<String>,
        f: impl Fn(Dynamic<O>) -> Dynamic<O> + Send + Sync + 'static,
    ) -> Self {
        let rule = rules::transform_field(self.reference.clone(), field, f);
        self.step(rule)
    }
}

/// Builds a rule from a recorded script of edits on `reference`.
pub fn batch<O: DynamicOps>(
    reference: TypeReference,
    build: impl FnOnce(Batch<O>) -> Batch<O>,
) -> TypeRewriteRule<O> {
    let script = build(Batch { reference, steps: Vec::new() });
    rules::seq(script.steps)
}

#[cfg(test)]
mod test {
    use dynamic_value::JsonOps;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn batch_equals_its_sequential_expansion() {
        let player = TypeReference::new("player");
        let batched = batch(player.clone(), |batch| {
            batch
                .rename("xp", "experience")
                .remove("debug")
                .set("migrated", JsonOps::dynamic(json!(true)))
                .transform("level", |d| d.create_int(d.as_int().or_else(0) + 1))
        });
        let expanded = rules::seq([
            rules::rename_field(player.clone(), "xp", "experience"),
            rules::remove_field(player.clone(), "debug"),
            rules::set_field(player.clone(), "migrated", JsonOps::dynamic(json!(true))),
            rules::transform_field(player.clone(), "level", |d| {
                d.create_int(d.as_int().or_else(0) + 1)
            }),
        ]);
        let input = JsonOps::dynamic(json!({"xp": 10, "debug": {}, "level": 4}));
        assert_eq!(
            batched.apply(&player, &input).into_result().unwrap(),
            expanded.apply(&player, &input).into_result().unwrap(),
        );
        assert_eq!(
            batched.apply(&player, &input).into_result().unwrap().into_value(),
            json!({"experience": 10, "level": 5, "migrated": true}),
        );
    }
}
