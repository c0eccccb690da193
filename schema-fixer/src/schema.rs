//! Versioned type registries.
//!
//! A [`Schema`] owns the templates that changed at its version and
//! points at its parent for everything that didn't, so a lookup walks
//! the parent chain until the first hit. The [`SchemaRegistry`] is the
//! sorted chain of all registered schemas; both are immutable once the
//! bootstrap builder hands them over.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::err::{BootstrapError, Result, SchemaConflict};
use crate::reference::TypeReference;
use crate::template::TypeTemplate;
use crate::version::DataVersion;

/// The templates declared at one version. Insertion-only.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeReference, TypeTemplate>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn register(mut self, reference: TypeReference, template: TypeTemplate) -> Self {
        self.types.insert(reference, template);
        self
    }
    pub fn get(&self, reference: &TypeReference) -> Option<&TypeTemplate> {
        self.types.get(reference)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&TypeReference, &TypeTemplate)> {
        self.types.iter()
    }
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[derive(Debug)]
pub struct Schema {
    version: DataVersion,
    parent: Option<Arc<Schema>>,
    types: TypeRegistry,
}

impl Schema {
    pub fn version(&self) -> DataVersion {
        self.version
    }
    pub fn parent(&self) -> Option<&Arc<Schema>> {
        self.parent.as_ref()
    }
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Resolves a reference here or in the nearest ancestor declaring
    /// it.
    pub fn find_type(&self, reference: &TypeReference) -> Option<&TypeTemplate> {
        self.ancestry()
            .find_map(|schema| schema.types.get(reference))
    }

    /// The references this schema redeclares with a different shape
    /// than the parent chain resolves them to. Newly introduced types
    /// do not count as changed.
    pub fn changed_types(&self) -> Vec<TypeReference> {
        let Some(parent) = &self.parent else {
            return Vec::new();
        };
        self.types
            .iter()
            .filter(|(reference, template)| {
                parent
                    .find_type(reference)
                    .is_some_and(|inherited| !inherited.same_shape(template))
            })
            .map(|(reference, _)| reference.clone())
            .collect()
    }

    fn ancestry(&self) -> impl Iterator<Item = &Schema> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.as_deref();
            Some(current)
        })
    }
}

/// All registered schemas, sorted by version.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<DataVersion, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn get(&self, version: DataVersion) -> Option<&Arc<Schema>> {
        self.schemas.get(&version)
    }
    pub fn latest(&self) -> Option<&Arc<Schema>> {
        self.schemas.values().next_back()
    }
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }
    /// Consecutive `(older, newer)` version pairs along the chain.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = (&Arc<Schema>, &Arc<Schema>)> {
        self.schemas.values().zip(self.schemas.values().skip(1))
    }
    /// Whether any schema along the chain knows this reference.
    pub fn knows(&self, reference: &TypeReference) -> bool {
        self.schemas
            .values()
            .any(|schema| schema.find_type(reference).is_some())
    }
    pub fn known_references(&self) -> Vec<TypeReference> {
        let mut seen: Vec<TypeReference> = Vec::new();
        for schema in self.schemas.values() {
            for (reference, _) in schema.types().iter() {
                if !seen.contains(reference) {
                    seen.push(reference.clone());
                }
            }
        }
        seen
    }
}

/// Collects schemas during `register_schemas`; all validation happens
/// in [`SchemaRegistryBuilder::build`] so registration order mistakes
/// surface as one structured error instead of a panic mid-bootstrap.
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    pending: Vec<PendingSchema>,
}

#[derive(Debug)]
struct PendingSchema {
    version: DataVersion,
    parent: Option<DataVersion>,
    types: TypeRegistry,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    /// The first schema of the chain; it has no parent.
    pub fn add_root(mut self, version: DataVersion, types: TypeRegistry) -> Self {
        self.pending
            .push(PendingSchema { version, parent: None, types });
        self
    }
    pub fn add(mut self, version: DataVersion, parent: DataVersion, types: TypeRegistry) -> Self {
        self.pending
            .push(PendingSchema { version, parent: Some(parent), types });
        self
    }

    pub(crate) fn build(self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::default();
        let mut previous: Option<DataVersion> = None;
        for (index, pending) in self.pending.into_iter().enumerate() {
            let PendingSchema { version, parent, types } = pending;
            match previous {
                Some(previous) if version == previous => {
                    return Err(SchemaConflict::DuplicateVersion { version }.into());
                }
                Some(previous) if version < previous => {
                    return Err(SchemaConflict::NonMonotonicVersion { version, previous }.into());
                }
                _ => {}
            }
            let parent = match parent {
                None if index == 0 => None,
                None => return Err(SchemaConflict::MissingParent { version }.into()),
                Some(parent) => Some(
                    registry
                        .get(parent)
                        .cloned()
                        .ok_or(SchemaConflict::UnresolvedParent { version, parent })
                        .map_err(BootstrapError::from)?,
                ),
            };
            registry
                .schemas
                .insert(version, Arc::new(Schema { version, parent, types }));
            previous = Some(version);
        }
        if registry.schemas.is_empty() {
            return Err(SchemaConflict::NoSchemas.into());
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn reference(id: &str) -> TypeReference {
        TypeReference::new(id)
    }

    fn player_v1() -> TypeRegistry {
        TypeRegistry::new().register(
            reference("player"),
            TypeTemplate::record([
                TypeTemplate::field("name", TypeTemplate::string()),
                TypeTemplate::remainder(),
            ]),
        )
    }

    #[test]
    fn lookup_walks_parents() {
        let registry = SchemaRegistryBuilder::new()
            .add_root(DataVersion::new(1), player_v1())
            .add(DataVersion::new(2), DataVersion::new(1), TypeRegistry::new())
            .build()
            .unwrap();
        let newest = registry.get(DataVersion::new(2)).unwrap();
        assert!(newest.types().is_empty());
        assert!(newest.find_type(&reference("player")).is_some());
        assert!(newest.find_type(&reference("chunk")).is_none());
    }

    #[test]
    fn changed_types_ignores_inherited_and_new() {
        let changed_player = TypeRegistry::new()
            .register(
                reference("player"),
                TypeTemplate::record([
                    TypeTemplate::field("displayName", TypeTemplate::string()),
                    TypeTemplate::remainder(),
                ]),
            )
            .register(reference("chunk"), TypeTemplate::remainder());
        let registry = SchemaRegistryBuilder::new()
            .add_root(DataVersion::new(1), player_v1())
            .add(DataVersion::new(2), DataVersion::new(1), changed_player)
            .build()
            .unwrap();
        let newest = registry.get(DataVersion::new(2)).unwrap();
        assert_eq!(newest.changed_types(), vec![reference("player")]);
    }

    #[test]
    fn registration_order_is_validated() {
        let builder = |second: u32| {
            SchemaRegistryBuilder::new()
                .add_root(DataVersion::new(5), player_v1())
                .add(DataVersion::new(second), DataVersion::new(5), TypeRegistry::new())
        };
        assert_eq!(
            builder(5).build().unwrap_err().source,
            SchemaConflict::DuplicateVersion { version: DataVersion::new(5) },
        );
        assert_eq!(
            builder(3).build().unwrap_err().source,
            SchemaConflict::NonMonotonicVersion {
                version: DataVersion::new(3),
                previous: DataVersion::new(5),
            },
        );
        let orphan = SchemaRegistryBuilder::new()
            .add_root(DataVersion::new(1), player_v1())
            .add(DataVersion::new(2), DataVersion::new(9), TypeRegistry::new());
        assert_eq!(
            orphan.build().unwrap_err().source,
            SchemaConflict::UnresolvedParent {
                version: DataVersion::new(2),
                parent: DataVersion::new(9),
            },
        );
    }
}
