//! The migration driver.
//!
//! Given a tagged value and a version range, the fixer picks every
//! registered fix for that type whose own range sits inside the
//! requested one, orders them by starting version (registration order
//! breaks ties) and folds them left to right over the value. Nothing
//! here consults the schemas at runtime: whatever fixes exist are
//! applied, and data with no applicable fix is forwarded untouched.

use dynamic_value::DynamicOps;

use crate::fix::{FixContext, FixEvent, FixRegistrar};
use crate::reference::{TaggedDynamic, TypeReference};
use crate::schema::SchemaRegistry;
use crate::version::DataVersion;

#[derive(Debug)]
pub struct DataFixer<O: DynamicOps> {
    current_version: DataVersion,
    schemas: SchemaRegistry,
    fixes: FixRegistrar<O>,
}

impl<O: DynamicOps> DataFixer<O> {
    pub(crate) fn new(
        current_version: DataVersion,
        schemas: SchemaRegistry,
        fixes: FixRegistrar<O>,
    ) -> Self {
        Self { current_version, schemas, fixes }
    }

    /// The version the application declared at bootstrap.
    pub fn current_version(&self) -> DataVersion {
        self.current_version
    }
    pub fn schemas(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Migrates `tagged` from `from` up to `to`, discarding the event
    /// record. A range that goes nowhere returns the input as-is.
    pub fn update(
        &self,
        tagged: TaggedDynamic<O>,
        from: DataVersion,
        to: DataVersion,
    ) -> TaggedDynamic<O> {
        self.update_with_report(tagged, from, to).0
    }

    /// [`DataFixer::update`] up to the bootstrap-declared version.
    pub fn update_to_current(&self, tagged: TaggedDynamic<O>, from: DataVersion) -> TaggedDynamic<O> {
        self.update(tagged, from, self.current_version)
    }

    /// Like [`DataFixer::update`], also handing back everything the
    /// applied fixes published along the way.
    pub fn update_with_report(
        &self,
        tagged: TaggedDynamic<O>,
        from: DataVersion,
        to: DataVersion,
    ) -> (TaggedDynamic<O>, Vec<FixEvent>) {
        if from >= to {
            if from > to {
                tracing::warn!(%from, %to, "asked to migrate backwards, forwarding data untouched");
            }
            return (tagged, Vec::new());
        }
        let mut applicable: Vec<_> = self
            .fixes
            .fixes_for(tagged.reference())
            .iter()
            .filter(|fix| {
                from <= fix.from_version()
                    && fix.to_version() <= to
                    && fix.from_version() < fix.to_version()
            })
            .collect();
        // Stable sort: same starting version keeps registration order.
        applicable.sort_by_key(|fix| fix.from_version());

        let mut ctx = FixContext::new();
        let (reference, value) = tagged.into_parts();
        let value = applicable.into_iter().fold(value, |value, fix| {
            ctx.enter(fix.name());
            fix.apply(&reference, &value, &mut ctx)
        });
        (TaggedDynamic::new(reference, value), ctx.into_events())
    }

    /// See [`coverage_gaps`].
    pub fn coverage_gaps(&self) -> Vec<CoverageGap> {
        coverage_gaps(&self.schemas, &self.fixes)
    }
}

/// An adjacent version step over which a type changed shape but no
/// registered fix carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageGap {
    pub reference: TypeReference,
    pub from: DataVersion,
    pub to: DataVersion,
}

/// Audits the version chain: every type whose template changes between
/// two adjacent schemas needs at least one fix whose range covers that
/// step. Tooling-facing only — the driver never enforces this.
pub fn coverage_gaps<O: DynamicOps>(
    schemas: &SchemaRegistry,
    fixes: &FixRegistrar<O>,
) -> Vec<CoverageGap> {
    let mut gaps = Vec::new();
    for (older, newer) in schemas.adjacent_pairs() {
        for reference in newer.changed_types() {
            let covered = fixes.fixes_for(&reference).iter().any(|fix| {
                fix.from_version() <= older.version() && newer.version() <= fix.to_version()
            });
            if !covered {
                gaps.push(CoverageGap {
                    reference,
                    from: older.version(),
                    to: newer.version(),
                });
            }
        }
    }
    gaps
}
