//! Declarative type shapes.
//!
//! A [`TypeTemplate`] records what a type looks like at one schema
//! version: which fields it has, which are optional, where lists and
//! tagged unions sit, and whether unenumerated fields are kept as a
//! remainder. Templates are purely informational — the engine uses
//! them to diff adjacent schemas and to drive the coverage audit, never
//! to validate or coerce data at runtime.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    Bool,
    I32,
    I64,
    F32,
    F64,
    String,
}

/// The closed set of shapes a type can declare.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeTemplate {
    Primitive(PrimitiveKind),
    /// A named required slot.
    Field(String, Box<TypeTemplate>),
    /// A named slot that may be absent.
    Optional(String, Box<TypeTemplate>),
    /// A product of templates, i.e. a record.
    And(Vec<TypeTemplate>),
    List(Box<TypeTemplate>),
    /// A discriminated union over one shared map: the value of
    /// `discriminator` selects which variant template applies.
    TaggedChoice {
        discriminator: String,
        discriminator_template: Box<TypeTemplate>,
        variants: BTreeMap<String, TypeTemplate>,
    },
    /// Every field not otherwise enumerated, preserved verbatim.
    Remainder,
}

impl TypeTemplate {
    pub fn bool() -> Self {
        Self::Primitive(PrimitiveKind::Bool)
    }
    pub fn int() -> Self {
        Self::Primitive(PrimitiveKind::I32)
    }
    pub fn long() -> Self {
        Self::Primitive(PrimitiveKind::I64)
    }
    pub fn float() -> Self {
        Self::Primitive(PrimitiveKind::F32)
    }
    pub fn double() -> Self {
        Self::Primitive(PrimitiveKind::F64)
    }
    pub fn string() -> Self {
        Self::Primitive(PrimitiveKind::String)
    }
    pub fn field(name: impl Into<String>, template: TypeTemplate) -> Self {
        Self::Field(name.into(), Box::new(template))
    }
    pub fn optional(name: impl Into<String>, template: TypeTemplate) -> Self {
        Self::Optional(name.into(), Box::new(template))
    }
    pub fn record(templates: impl IntoIterator<Item = TypeTemplate>) -> Self {
        Self::And(templates.into_iter().collect())
    }
    pub fn list(template: TypeTemplate) -> Self {
        Self::List(Box::new(template))
    }
    pub fn tagged_choice<S: Into<String>>(
        discriminator: impl Into<String>,
        discriminator_template: TypeTemplate,
        variants: impl IntoIterator<Item = (S, TypeTemplate)>,
    ) -> Self {
        Self::TaggedChoice {
            discriminator: discriminator.into(),
            discriminator_template: Box::new(discriminator_template),
            variants: variants
                .into_iter()
                .map(|(name, template)| (name.into(), template))
                .collect(),
        }
    }
    pub fn remainder() -> Self {
        Self::Remainder
    }

    /// Structural comparison; two templates with the same shape are
    /// interchangeable for diffing purposes.
    pub fn same_shape(&self, other: &Self) -> bool {
        self == other
    }
}
