#[cfg(feature = "fancy-errors")]
use miette::Diagnostic;

use crate::version::DataVersion;

/// A bootstrap registration mistake. All of these abort construction;
/// a fixer with a half-registered version chain would corrupt data
/// silently. The help text is computed from the conflict when the
/// error is built, so the fancy diagnostic renders it.
#[cfg_attr(feature = "fancy-errors", derive(Diagnostic), diagnostic())]
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{source}")]
pub struct BootstrapError {
    pub source: SchemaConflict,

    #[cfg(feature = "fancy-errors")]
    #[help]
    help: Option<String>,
}

impl From<SchemaConflict> for BootstrapError {
    fn from(source: SchemaConflict) -> Self {
        Self {
            #[cfg(feature = "fancy-errors")]
            help: source.help(),
            source,
        }
    }
}

/// The ways registration can conflict with itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SchemaConflict {
    #[error("SchemaConflict: no schemas were registered")]
    NoSchemas,
    #[error("SchemaConflict: schema {version} registered twice")]
    DuplicateVersion { version: DataVersion },
    #[error("SchemaConflict: schema {version} registered after {previous}")]
    NonMonotonicVersion {
        version: DataVersion,
        previous: DataVersion,
    },
    #[error("SchemaConflict: schema {version} names unregistered parent {parent}")]
    UnresolvedParent {
        version: DataVersion,
        parent: DataVersion,
    },
    #[error("SchemaConflict: schema {version} has no parent but is not the first")]
    MissingParent { version: DataVersion },
    #[error("SchemaConflict: fix {name:?} for {reference} over {from}..{to} registered twice")]
    DuplicateFix {
        reference: String,
        name: String,
        from: DataVersion,
        to: DataVersion,
    },
    #[error("SchemaConflict: fix {name:?} runs backwards, {from} is not below {to}")]
    InvertedFixRange {
        name: String,
        from: DataVersion,
        to: DataVersion,
    },
    #[error("SchemaConflict: fix {name:?} targets unknown type {reference}")]
    FixForUnknownType {
        reference: String,
        name: String,
        known: Vec<String>,
    },
}

impl SchemaConflict {
    #[cfg(feature = "fancy-errors")]
    pub fn help(&self) -> Option<String> {
        use strsim::levenshtein;
        use SchemaConflict::*;
        match self {
            NoSchemas => Some("register_schemas must add at least the current schema".to_owned()),
            DuplicateVersion { .. } | NonMonotonicVersion { .. } => {
                Some("schemas must be registered once each, in increasing version order".to_owned())
            }
            UnresolvedParent { parent, .. } => {
                Some(format!("register the {parent} schema first, or point at one that exists"))
            }
            MissingParent { .. } => {
                Some("only the first registered schema may be a root".to_owned())
            }
            DuplicateFix { .. } => None,
            InvertedFixRange { .. } => {
                Some("fixes only migrate forward; swap the two versions".to_owned())
            }
            FixForUnknownType { reference, known, .. } => {
                let closest = known
                    .iter()
                    .map(String::as_str)
                    .min_by_key(|candidate| levenshtein(reference, candidate))?;
                Some(format!("maybe you meant {closest}?"))
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
