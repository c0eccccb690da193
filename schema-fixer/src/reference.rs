use std::fmt;
use std::sync::Arc;

use dynamic_value::{Dynamic, DynamicOps};

/// The name of a logical data type, e.g. `"player"` or `"chunk"`.
///
/// References are cheap to clone and compare; the same id always
/// compares equal regardless of where it was created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference(Arc<str>);

impl TypeReference {
    /// Panics on an empty id; a nameless type cannot be routed.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "a TypeReference needs a non-empty id");
        Self(id)
    }
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A dynamic value together with the type reference that routes it
/// through the fixer. The tag is authoritative; the engine never
/// inspects the value for embedded type information.
pub struct TaggedDynamic<O: DynamicOps> {
    reference: TypeReference,
    value: Dynamic<O>,
}

impl<O: DynamicOps> Clone for TaggedDynamic<O> {
    fn clone(&self) -> Self {
        Self { reference: self.reference.clone(), value: self.value.clone() }
    }
}
impl<O: DynamicOps> fmt::Debug for TaggedDynamic<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedDynamic")
            .field("reference", &self.reference)
            .field("value", &self.value)
            .finish()
    }
}
impl<O: DynamicOps> PartialEq for TaggedDynamic<O> {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference && self.value == other.value
    }
}

impl<O: DynamicOps> TaggedDynamic<O> {
    pub fn new(reference: TypeReference, value: Dynamic<O>) -> Self {
        Self { reference, value }
    }
    pub fn reference(&self) -> &TypeReference {
        &self.reference
    }
    pub fn value(&self) -> &Dynamic<O> {
        &self.value
    }
    pub fn into_value(self) -> Dynamic<O> {
        self.value
    }
    pub fn into_parts(self) -> (TypeReference, Dynamic<O>) {
        (self.reference, self.value)
    }
}
