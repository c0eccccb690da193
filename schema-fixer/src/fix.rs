//! Named migration steps.
//!
//! A [`DataFix`] carries one piece of data of one type from one
//! version to a later one. Fixes never throw: whatever goes wrong is
//! published on the [`FixContext`] and the fix hands back the best
//! tree it has, falling back to its input. The registrar groups fixes
//! by the type reference they target, preserving registration order —
//! the driver's tie-breaker.

use std::collections::HashMap;
use std::sync::Arc;

use dynamic_value::{Dynamic, DynamicOps};

use crate::err::{Result, SchemaConflict};
use crate::reference::TypeReference;
use crate::rules::TypeRewriteRule;
use crate::schema::{Schema, SchemaRegistry};
use crate::version::DataVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// One structured event published while a fix ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixEvent {
    pub level: EventLevel,
    pub fix: String,
    pub message: String,
}

/// Collects the events of one `update` call and forwards them to
/// `tracing` as they happen.
#[derive(Debug, Default)]
pub struct FixContext {
    current_fix: String,
    events: Vec<FixEvent>,
}

impl FixContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }
    pub(crate) fn enter(&mut self, fix: &str) {
        self.current_fix = fix.to_owned();
    }
    pub(crate) fn into_events(self) -> Vec<FixEvent> {
        self.events
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(fix = %self.current_fix, "{message}");
        self.push(EventLevel::Info, message);
    }
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(fix = %self.current_fix, "{message}");
        self.push(EventLevel::Warn, message);
    }
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(fix = %self.current_fix, "{message}");
        self.push(EventLevel::Error, message);
    }
    pub fn events(&self) -> &[FixEvent] {
        &self.events
    }

    fn push(&mut self, level: EventLevel, message: String) {
        self.events
            .push(FixEvent { level, fix: self.current_fix.clone(), message });
    }
}

/// One forward migration step for a single type.
///
/// `apply` must not mutate its input, must stay on the input's
/// backend, and may return the input unchanged when nothing applies.
/// Implementations hold no per-call state; a fix object is shared
/// across concurrent updates.
pub trait DataFix<O: DynamicOps>: Send + Sync {
    fn name(&self) -> &str;
    fn from_version(&self) -> DataVersion;
    fn to_version(&self) -> DataVersion;
    fn apply(
        &self,
        reference: &TypeReference,
        input: &Dynamic<O>,
        ctx: &mut FixContext,
    ) -> Dynamic<O>;
}

/// The standard fix: a rewrite rule applied at the root, with error
/// recovery. A rule failure is recorded on the context; its partial
/// value is kept when there is one, otherwise the input passes through
/// untouched.
pub struct SchemaDataFix<O: DynamicOps> {
    name: String,
    from: DataVersion,
    to: DataVersion,
    rule: TypeRewriteRule<O>,
}

impl<O: DynamicOps> SchemaDataFix<O> {
    pub fn new(
        name: impl Into<String>,
        from: DataVersion,
        to: DataVersion,
        rule: TypeRewriteRule<O>,
    ) -> Self {
        Self { name: name.into(), from, to, rule }
    }

    /// Builds the rule with the schemas at the fix's two endpoints in
    /// hand. Most rules never look at them; [`SchemaDataFix::new`] is
    /// the shortcut for those.
    pub fn make(
        name: impl Into<String>,
        from: DataVersion,
        to: DataVersion,
        schemas: &SchemaRegistry,
        make_rule: impl FnOnce(Option<&Schema>, Option<&Schema>) -> TypeRewriteRule<O>,
    ) -> Self {
        let input = schemas.get(from).map(|schema| schema.as_ref());
        let output = schemas.get(to).map(|schema| schema.as_ref());
        Self::new(name, from, to, make_rule(input, output))
    }
}

impl<O: DynamicOps> DataFix<O> for SchemaDataFix<O> {
    fn name(&self) -> &str {
        &self.name
    }
    fn from_version(&self) -> DataVersion {
        self.from
    }
    fn to_version(&self) -> DataVersion {
        self.to
    }
    fn apply(
        &self,
        reference: &TypeReference,
        input: &Dynamic<O>,
        ctx: &mut FixContext,
    ) -> Dynamic<O> {
        match self.rule.apply(reference, input).into_result() {
            Ok(value) => value,
            Err(err) => {
                ctx.error(err.message());
                err.into_partial().unwrap_or_else(|| input.clone())
            }
        }
    }
}

/// Fixes grouped by target type, in registration order.
pub struct FixRegistrar<O: DynamicOps> {
    fixes: HashMap<TypeReference, Vec<Arc<dyn DataFix<O>>>>,
}

impl<O: DynamicOps> std::fmt::Debug for FixRegistrar<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixRegistrar")
            .field(
                "fixes",
                &self
                    .fixes
                    .iter()
                    .map(|(reference, fixes)| {
                        (reference, fixes.iter().map(|fix| fix.name()).collect::<Vec<_>>())
                    })
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<O: DynamicOps> FixRegistrar<O> {
    pub fn fixes_for(&self, reference: &TypeReference) -> &[Arc<dyn DataFix<O>>] {
        self.fixes.get(reference).map_or(&[], Vec::as_slice)
    }
    pub fn iter(&self) -> impl Iterator<Item = (&TypeReference, &[Arc<dyn DataFix<O>>])> {
        self.fixes
            .iter()
            .map(|(reference, fixes)| (reference, fixes.as_slice()))
    }
}

/// Collects fixes during `register_fixes`; validated as a whole by the
/// bootstrap factory.
pub struct FixRegistrarBuilder<O: DynamicOps> {
    pending: Vec<(TypeReference, Arc<dyn DataFix<O>>)>,
}

impl<O: DynamicOps> Default for FixRegistrarBuilder<O> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<O: DynamicOps> FixRegistrarBuilder<O> {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add(mut self, reference: TypeReference, fix: impl DataFix<O> + 'static) -> Self {
        self.pending.push((reference, Arc::new(fix)));
        self
    }

    pub(crate) fn build(self, schemas: &SchemaRegistry) -> Result<FixRegistrar<O>> {
        let mut registrar = FixRegistrar { fixes: HashMap::new() };
        for (reference, fix) in self.pending {
            if fix.from_version() >= fix.to_version() {
                return Err(SchemaConflict::InvertedFixRange {
                    name: fix.name().to_owned(),
                    from: fix.from_version(),
                    to: fix.to_version(),
                }
                .into());
            }
            if !schemas.knows(&reference) {
                return Err(SchemaConflict::FixForUnknownType {
                    reference: reference.id().to_owned(),
                    name: fix.name().to_owned(),
                    known: schemas
                        .known_references()
                        .iter()
                        .map(|known| known.id().to_owned())
                        .collect(),
                }
                .into());
            }
            let registered = registrar.fixes.entry(reference.clone()).or_default();
            let duplicate = registered.iter().any(|existing| {
                existing.name() == fix.name()
                    && existing.from_version() == fix.from_version()
                    && existing.to_version() == fix.to_version()
            });
            if duplicate {
                return Err(SchemaConflict::DuplicateFix {
                    reference: reference.id().to_owned(),
                    name: fix.name().to_owned(),
                    from: fix.from_version(),
                    to: fix.to_version(),
                }
                .into());
            }
            registered.push(fix);
        }
        Ok(registrar)
    }
}
