//! Structured error types surfaced by the engine.
use core::fmt;

use jschema_referencing::{JsonPointerError, ReferencingError, UriError};
use serde_json::Value;

/// Configuration and lookup failures: unknown vocabulary, unknown format attribute,
/// unresolvable schema URI, invalid directory mount, or a metaschema that is invalid
/// against itself.
#[derive(Debug)]
pub enum CatalogueError {
    /// `versions` passed to [`crate::Catalogue::new`] contained an unrecognized draft name.
    UnknownVersion { version: String },
    /// `create_vocabulary`/`$vocabulary` referenced a URI nothing registered.
    UnknownVocabulary { uri: String },
    /// `format` named an attribute with no registered validator (only reachable when
    /// format assertion is explicitly requested; otherwise unknown formats are skipped).
    UnknownFormat { attribute: String },
    /// A session tag is already in use.
    SessionInUse,
    /// The object a URI resolved to is not a schema (not a bool, not a JSON object).
    NotASchema { uri: String },
    /// A metaschema failed to validate against itself during bootstrap.
    InvalidMetaschema {
        uri: String,
        errors: Vec<(String, String)>,
    },
    /// Loading, resolving, or pointing into a catalogued resource failed.
    Referencing(ReferencingError),
    /// Compiling a schema failed.
    Compile(CompileError),
    /// Evaluating a bootstrap metaschema against itself failed for a reason that
    /// escapes ordinary evaluation (unresolved reference, recursion limit).
    Eval(Box<EvalError>),
}

impl fmt::Display for CatalogueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueError::UnknownVersion { version } => {
                write!(f, "unrecognized draft version '{version}'")
            }
            CatalogueError::UnknownVocabulary { uri } => {
                write!(f, "unrecognized vocabulary URI '{uri}'")
            }
            CatalogueError::UnknownFormat { attribute } => {
                write!(f, "unsupported format attribute '{attribute}'")
            }
            CatalogueError::SessionInUse => write!(f, "session is already in use"),
            CatalogueError::NotASchema { uri } => {
                write!(f, "the object referenced by '{uri}' is not a JSON Schema")
            }
            CatalogueError::InvalidMetaschema { uri, errors } => {
                write!(f, "the metaschema '{uri}' is invalid against itself: ")?;
                for (i, (loc, msg)) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{loc}: {msg}")?;
                }
                Ok(())
            }
            CatalogueError::Referencing(err) => write!(f, "{err}"),
            CatalogueError::Compile(err) => write!(f, "{err}"),
            CatalogueError::Eval(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CatalogueError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogueError::Referencing(err) => Some(err),
            CatalogueError::Compile(err) => Some(err),
            CatalogueError::Eval(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<ReferencingError> for CatalogueError {
    fn from(err: ReferencingError) -> Self {
        CatalogueError::Referencing(err)
    }
}

impl From<UriError> for CatalogueError {
    fn from(err: UriError) -> Self {
        CatalogueError::Referencing(ReferencingError::from(err))
    }
}

impl From<JsonPointerError> for CatalogueError {
    fn from(err: JsonPointerError) -> Self {
        CatalogueError::Referencing(ReferencingError::from(err))
    }
}

impl From<CompileError> for CatalogueError {
    fn from(err: CompileError) -> Self {
        CatalogueError::Compile(err)
    }
}

/// Errors that escape [`crate::Evaluator::evaluate`]/`evaluate_with_path` themselves
/// rather than being folded into the [`crate::Scope`] tree as an ordinary assertion
/// failure. Both cases are programmer errors about the schema, not facts about the
/// instance: a `$ref` the catalogue cannot resolve to any known schema, or recursive
/// evaluation exceeding the engine's depth guard.
#[derive(Debug)]
pub enum EvalError {
    /// A `$ref`/`$dynamicRef`/`$recursiveRef` target does not resolve to a known schema.
    UnresolvedReference { uri: String, source: CatalogueError },
    /// Recursive schema evaluation exceeded the engine's depth guard, indicating an
    /// unguarded cyclic reference.
    MaxRecursionDepthExceeded,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnresolvedReference { uri, source } => {
                write!(f, "could not resolve reference '{uri}': {source}")
            }
            EvalError::MaxRecursionDepthExceeded => write!(
                f,
                "maximum schema recursion depth exceeded, likely an unguarded cyclic reference"
            ),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::UnresolvedReference { source, .. } => Some(source),
            EvalError::MaxRecursionDepthExceeded => None,
        }
    }
}

impl From<EvalError> for CatalogueError {
    fn from(err: EvalError) -> Self {
        CatalogueError::Eval(Box::new(err))
    }
}

/// Compile-time failures: a schema's shape or keyword dependency graph is unsound.
#[derive(Debug)]
pub enum CompileError {
    /// Sibling keyword dependencies form a cycle (e.g. two keywords declaring they
    /// each depend on the other).
    CyclicDependency { keywords: Vec<&'static str> },
    /// `$vocabulary` marked a vocabulary as required (`true`) but the catalogue does
    /// not have it registered.
    MissingRequiredVocabulary { uri: String },
    /// `$schema` named a metaschema URI the catalogue has no metaschema for.
    UnrecognizedMetaschema { uri: String },
    /// A keyword's value did not have the shape its factory expects.
    InvalidKeywordValue {
        keyword: &'static str,
        value: Value,
        reason: String,
    },
    /// Resolving `$id`/`$ref`/`$anchor` against the current base URI failed.
    Uri(UriError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::CyclicDependency { keywords } => {
                write!(f, "cyclic keyword dependency among: {}", keywords.join(", "))
            }
            CompileError::MissingRequiredVocabulary { uri } => {
                write!(f, "missing required vocabulary '{uri}'")
            }
            CompileError::UnrecognizedMetaschema { uri } => {
                write!(f, "unrecognized metaschema '{uri}'")
            }
            CompileError::InvalidKeywordValue {
                keyword,
                value,
                reason,
            } => write!(f, "invalid value for '{keyword}': {value} ({reason})"),
            CompileError::Uri(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Uri(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UriError> for CompileError {
    fn from(err: UriError) -> Self {
        CompileError::Uri(err)
    }
}
