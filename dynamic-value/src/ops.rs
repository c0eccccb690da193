use std::fmt;

use partial_result::DataResult;

/// The shapes a backend value can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Empty,
    Bool,
    Int,
    Float,
    String,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Map => "map",
        };
        write!(f, "{name}")
    }
}

/// Adapter over one concrete self-describing tree representation.
///
/// Every operation is pure: inputs are never mutated, editors hand back
/// a fresh value. An adapter over a representation with interior
/// mutability must clone defensively. Adapters may assume that all
/// values they are handed were produced by the same instance; the
/// [`Dynamic`](crate::Dynamic) layer rejects cross-instance mixing
/// before it reaches them.
///
/// Adapters are shared across threads, hence the `Send + Sync` bound:
/// stateless is easiest, thread-safe is required.
pub trait DynamicOps: Send + Sync + 'static {
    type Value: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;

    /// The no-value value. Indistinguishable from an absent field at
    /// read sites.
    fn empty(&self) -> Self::Value;
    fn create_bool(&self, value: bool) -> Self::Value;
    fn create_int(&self, value: i32) -> Self::Value;
    fn create_long(&self, value: i64) -> Self::Value;
    fn create_float(&self, value: f32) -> Self::Value;
    fn create_double(&self, value: f64) -> Self::Value;
    fn create_string(&self, value: &str) -> Self::Value;
    fn create_list(&self, items: Vec<Self::Value>) -> Self::Value;
    fn create_map(&self, entries: Vec<(Self::Value, Self::Value)>) -> Self::Value;

    fn kind(&self, value: &Self::Value) -> ValueKind;

    fn get_bool(&self, value: &Self::Value) -> DataResult<bool>;
    fn get_int(&self, value: &Self::Value) -> DataResult<i32>;
    fn get_long(&self, value: &Self::Value) -> DataResult<i64>;
    fn get_float(&self, value: &Self::Value) -> DataResult<f32>;
    fn get_double(&self, value: &Self::Value) -> DataResult<f64>;
    fn get_string(&self, value: &Self::Value) -> DataResult<String>;
    fn get_map_entries(&self, value: &Self::Value) -> DataResult<Vec<(Self::Value, Self::Value)>>;
    fn get_list(&self, value: &Self::Value) -> DataResult<Vec<Self::Value>>;
    /// The value under `key`, erroring when `value` is not a map or the
    /// key is absent.
    fn get_map_value(&self, value: &Self::Value, key: &Self::Value) -> DataResult<Self::Value>;

    fn set(&self, value: &Self::Value, key: Self::Value, entry: Self::Value)
        -> DataResult<Self::Value>;
    /// Removing an absent key succeeds and returns the map unchanged.
    fn remove(&self, value: &Self::Value, key: &Self::Value) -> DataResult<Self::Value>;
    /// Shallow right-biased merge: on key collision the `other` side
    /// wins. Errors with `MergeConflict` when either side is not a map.
    fn merge_to_map(&self, map: &Self::Value, other: &Self::Value) -> DataResult<Self::Value>;
    fn merge_to_list(&self, list: &Self::Value, other: &Self::Value) -> DataResult<Self::Value>;

    fn is_map(&self, value: &Self::Value) -> bool {
        matches!(self.kind(value), ValueKind::Map)
    }
    fn is_list(&self, value: &Self::Value) -> bool {
        matches!(self.kind(value), ValueKind::List)
    }
    fn is_empty(&self, value: &Self::Value) -> bool {
        matches!(self.kind(value), ValueKind::Empty)
    }
}
