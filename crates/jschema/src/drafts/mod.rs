//! Supported JSON Schema drafts and their bundled metaschemas/vocabularies.
mod draft201909;
mod draft202012;

use serde_json::Value;

use crate::vocabulary::Vocabulary;

/// A JSON Schema draft this engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Draft {
    Draft201909,
    Draft202012,
}

impl Draft {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "2019-09" => Some(Draft::Draft201909),
            "2020-12" => Some(Draft::Draft202012),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Draft::Draft201909 => "2019-09",
            Draft::Draft202012 => "2020-12",
        }
    }

    #[must_use]
    pub fn metaschema_uri(self) -> &'static str {
        match self {
            Draft::Draft201909 => "https://json-schema.org/draft/2019-09/schema",
            Draft::Draft202012 => "https://json-schema.org/draft/2020-12/schema",
        }
    }

    /// The bundled metaschema documents this draft ships (keyed by URI), loaded into
    /// the catalogue's registry during bootstrap.
    #[must_use]
    pub fn metaschema_documents(self) -> Vec<(&'static str, &'static Value)> {
        match self {
            Draft::Draft201909 => draft201909::documents(),
            Draft::Draft202012 => draft202012::documents(),
        }
    }

    /// The vocabularies this draft defines, in the order its metaschema's default
    /// `$vocabulary` map lists them.
    #[must_use]
    pub fn default_vocabularies(self) -> Vec<Vocabulary> {
        match self {
            Draft::Draft201909 => draft201909::vocabularies(),
            Draft::Draft202012 => draft202012::vocabularies(),
        }
    }

    /// The `$id` of the identifying anchor/recursive keyword this draft uses for
    /// `$ref`-like forwarding (`$recursiveAnchor` pre-2020-12, `$dynamicAnchor` after).
    #[must_use]
    pub fn uses_dynamic_anchor(self) -> bool {
        matches!(self, Draft::Draft202012)
    }

    /// `(vocabulary URI, required)` pairs this draft's own metaschema declares,
    /// in bootstrap order.
    #[must_use]
    pub fn default_vocabulary_declarations(self) -> Vec<(String, bool)> {
        match self {
            Draft::Draft201909 => draft201909::vocabulary_declarations(),
            Draft::Draft202012 => draft202012::vocabulary_declarations(),
        }
    }
}

/// Built-in format validators (`date-time`, `email`, `uuid`, `regex`, `ipv4`, `ipv6`,
/// `hostname`), registered into every catalogue regardless of which drafts it bootstraps.
#[must_use]
pub fn built_in_formats() -> Vec<(&'static str, crate::catalogue::FormatValidator)> {
    crate::keywords::format::built_in_validators()
}
