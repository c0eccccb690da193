//! Forward-only schema evolution for self-describing documents.
//!
//! Applications declare a linear chain of schema versions and register
//! fixes that carry data between them. At load time, a document tagged
//! with an older version is replayed through every applicable fix
//! until it matches the requested version. Data flows through
//! [`dynamic_value::Dynamic`], so the same fixes run over any backend
//! with a [`dynamic_value::DynamicOps`] adapter.
//!
//! The pieces, leaf first:
//!
//! * [`rules`] — composable rewrites of dynamic values, the vocabulary
//!   fixes are written in. [`traverse`] lifts them over whole trees,
//!   [`batch`] scripts several field edits at once.
//! * [`SchemaDataFix`] — a named version step backed by a rule.
//! * [`DataFixer`] — orders the registered fixes along the version
//!   chain and folds them over incoming data.
//! * [`create`] + [`DataFixerBootstrap`] — validated assembly of the
//!   whole thing.
//!
//! Migration is deliberately forgiving: a fix that fails reports what
//! happened and forwards the best value it has. Only bootstrap
//! mistakes are fatal — see [`err::BootstrapError`].

pub mod batch;
mod bootstrap;
pub mod err;
mod fix;
mod fixer;
mod reference;
pub mod rules;
mod schema;
pub mod template;
pub mod traverse;
mod version;

pub use bootstrap::{create, DataFixerBootstrap};
pub use fix::{
    DataFix, EventLevel, FixContext, FixEvent, FixRegistrar, FixRegistrarBuilder, SchemaDataFix,
};
pub use fixer::{coverage_gaps, CoverageGap, DataFixer};
pub use reference::{TaggedDynamic, TypeReference};
pub use rules::TypeRewriteRule;
pub use schema::{Schema, SchemaRegistry, SchemaRegistryBuilder, TypeRegistry};
pub use template::{PrimitiveKind, TypeTemplate};
pub use version::DataVersion;
