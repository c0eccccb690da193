//! Format-agnostic value trees.
//!
//! A [`Dynamic`] pairs a backend value (a JSON document, an NBT
//! compound, a TOML table…) with the [`DynamicOps`] adapter that knows
//! how to read and rebuild it. Everything above this crate manipulates
//! trees exclusively through that pair, so the same rewrite logic runs
//! unchanged over any backend with an adapter.
//!
//! Values are immutable: every editor returns a new `Dynamic` and the
//! receiver is untouched. Fallible reads report through
//! [`partial_result::DataResult`].

mod dynamic;
pub mod err;
mod finder;
#[cfg(feature = "json-ops")]
mod json_impls;
mod ops;
pub mod path;
mod tree;

pub use dynamic::Dynamic;
pub use finder::Finder;
#[cfg(feature = "json-ops")]
pub use json_impls::JsonOps;
pub use ops::{DynamicOps, ValueKind};
pub use tree::{TreeOps, TreeValue};
