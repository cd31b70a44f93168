//! Vocabularies: named, versioned collections of keyword definitions.
use ahash::AHashMap;
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::CompileError;
use crate::keyword::Keyword;
use crate::primitive_type::TypeSet;

/// A single keyword's compile-time contract: what it applies to, what it must be
/// compiled after, and how to turn its schema value into a [`Keyword`].
#[derive(Clone)]
pub struct KeywordDef {
    pub name: &'static str,
    /// A schema the keyword's own value must satisfy, checked once when the
    /// vocabulary's metaschema is bootstrapped (`None` if the keyword's shape is
    /// checked ad hoc by its factory instead).
    pub meta_schema: Option<Value>,
    /// Instance types this keyword has any effect on. Keywords are compiled for every
    /// schema object regardless (so `$ref`-style forwarding stays correct no matter what
    /// an instance turns out to be), but at evaluation time a keyword whose `applies_to`
    /// excludes the instance's type is skipped outright rather than evaluated into a
    /// vacuous leaf.
    pub applies_to: TypeSet,
    /// Sibling keyword names that must be compiled (and, at evaluation time,
    /// evaluated) before this one. Cross-checked for cycles during compilation.
    pub depends_on: &'static [&'static str],
    pub factory: KeywordFactory,
}

pub type KeywordFactory =
    fn(&Value, &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError>;

impl KeywordDef {
    #[must_use]
    pub const fn new(
        name: &'static str,
        applies_to: TypeSet,
        depends_on: &'static [&'static str],
        factory: KeywordFactory,
    ) -> Self {
        KeywordDef {
            name,
            meta_schema: None,
            applies_to,
            depends_on,
            factory,
        }
    }
}

impl std::fmt::Debug for KeywordDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordDef").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A named collection of keyword definitions, identified by the `$vocabulary` URI
/// schema authors opt into.
#[derive(Debug)]
pub struct Vocabulary {
    pub uri: String,
    pub keywords: AHashMap<&'static str, KeywordDef>,
}

impl Vocabulary {
    #[must_use]
    pub fn new(uri: impl Into<String>, keywords: Vec<KeywordDef>) -> Self {
        Vocabulary {
            uri: uri.into(),
            keywords: keywords.into_iter().map(|k| (k.name, k)).collect(),
        }
    }
}
