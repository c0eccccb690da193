//! Walks saved player documents up a three-version chain and prints
//! what the fixes did, including the events a deliberately colliding
//! document produces.

use dynamic_value::JsonOps;
use miette::Result;
use schema_fixer::{
    create, rules, DataFixerBootstrap, DataVersion, FixRegistrarBuilder, SchemaDataFix,
    SchemaRegistry, SchemaRegistryBuilder, TaggedDynamic, TypeReference, TypeRegistry,
    TypeTemplate,
};
use serde_json::json;

const V_NAMES: DataVersion = DataVersion::new(100);
const V_POSITIONS: DataVersion = DataVersion::new(110);
const V_VITALS: DataVersion = DataVersion::new(200);

fn player() -> TypeReference {
    TypeReference::new("player")
}

struct PlayerGame;

impl DataFixerBootstrap<JsonOps> for PlayerGame {
    fn register_schemas(&self, schemas: SchemaRegistryBuilder) -> SchemaRegistryBuilder {
        let flat = TypeTemplate::record([
            TypeTemplate::field("playerName", TypeTemplate::string()),
            TypeTemplate::remainder(),
        ]);
        let positioned = TypeTemplate::record([
            TypeTemplate::field("name", TypeTemplate::string()),
            TypeTemplate::field(
                "position",
                TypeTemplate::record([
                    TypeTemplate::field("x", TypeTemplate::double()),
                    TypeTemplate::field("y", TypeTemplate::double()),
                    TypeTemplate::field("z", TypeTemplate::double()),
                ]),
            ),
            TypeTemplate::remainder(),
        ]);
        let vital = TypeTemplate::record([
            TypeTemplate::field("name", TypeTemplate::string()),
            TypeTemplate::field("health", TypeTemplate::double()),
            TypeTemplate::remainder(),
        ]);
        schemas
            .add_root(V_NAMES, TypeRegistry::new().register(player(), flat))
            .add(V_POSITIONS, V_NAMES, TypeRegistry::new().register(player(), positioned))
            .add(V_VITALS, V_POSITIONS, TypeRegistry::new().register(player(), vital))
    }

    fn register_fixes(
        &self,
        fixes: FixRegistrarBuilder<JsonOps>,
        _schemas: &SchemaRegistry,
    ) -> FixRegistrarBuilder<JsonOps> {
        fixes
            .add(
                player(),
                SchemaDataFix::new(
                    "player positions",
                    V_NAMES,
                    V_POSITIONS,
                    rules::seq([
                        rules::rename_field(player(), "playerName", "name"),
                        rules::group_fields(player(), "position", ["x", "y", "z"]),
                    ]),
                ),
            )
            .add(
                player(),
                SchemaDataFix::new(
                    "player vitals",
                    V_POSITIONS,
                    V_VITALS,
                    rules::add_field(player(), "health", |d| d.create_double(20.0)),
                ),
            )
    }
}

fn main() -> Result<()> {
    let fixer = create(V_VITALS, &PlayerGame)?;

    let saves = [
        json!({"playerName": "Alex", "x": 100.5, "y": 64.0, "z": -200.25}),
        json!({"name": "steve", "position": {"x": 0.0, "y": 70.0, "z": 0.0}}),
        // This one already has a `position` field, so the grouping fix
        // reports a collision and forwards the document unchanged.
        json!({"playerName": "griefer", "x": 1.0, "position": "??"}),
    ];
    let versions = [V_NAMES, V_POSITIONS, V_NAMES];

    for (save, version) in saves.into_iter().zip(versions) {
        println!("migrating from {version}: {save}");
        let tagged = TaggedDynamic::new(player(), JsonOps::dynamic(save));
        let (migrated, events) = fixer.update_with_report(tagged, version, fixer.current_version());
        println!("           up to {}: {}", fixer.current_version(), migrated.value().value());
        for event in events {
            println!("    [{:?}] {}: {}", event.level, event.fix, event.message);
        }
        println!();
    }
    Ok(())
}
