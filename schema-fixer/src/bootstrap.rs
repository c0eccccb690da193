//! Application entry point: schema and fix registration.

use dynamic_value::DynamicOps;

use crate::err::Result;
use crate::fix::FixRegistrarBuilder;
use crate::fixer::DataFixer;
use crate::schema::{SchemaRegistry, SchemaRegistryBuilder};
use crate::version::DataVersion;

/// What an application contributes to a fixer: its schema chain and
/// the fixes that walk it. Each hook runs exactly once per [`create`]
/// call; `register_fixes` receives the registry its sibling built, so
/// no state needs to live on the bootstrap between the two calls.
pub trait DataFixerBootstrap<O: DynamicOps> {
    /// Insert schemas in increasing version order, each after the
    /// first naming its parent.
    fn register_schemas(&self, schemas: SchemaRegistryBuilder) -> SchemaRegistryBuilder;
    fn register_fixes(
        &self,
        fixes: FixRegistrarBuilder<O>,
        schemas: &SchemaRegistry,
    ) -> FixRegistrarBuilder<O>;
}

/// Runs a bootstrap and assembles the fixer. Any registration mistake
/// aborts construction; nothing about a half-built fixer is safe to
/// use.
pub fn create<O: DynamicOps>(
    current_version: DataVersion,
    bootstrap: &impl DataFixerBootstrap<O>,
) -> Result<DataFixer<O>> {
    let schemas = bootstrap.register_schemas(SchemaRegistryBuilder::new()).build()?;
    let fixes = bootstrap
        .register_fixes(FixRegistrarBuilder::new(), &schemas)
        .build(&schemas)?;
    Ok(DataFixer::new(current_version, schemas, fixes))
}
