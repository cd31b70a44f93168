//! The compiled form of a JSON Schema: either the trivial boolean schemas or a schema
//! object's ordered, dependency-sorted keyword list.
use std::sync::Arc;

use jschema_referencing::Uri;

use crate::drafts::Draft;
use crate::keyword::Keyword;
use crate::primitive_type::TypeSet;

/// A compiled schema, ready for repeated evaluation.
///
/// Cloning is cheap: [`Schema::Object`] wraps its data in an [`Arc`], so keywords that
/// hold subschemas (`allOf`, `properties`, ...) and the catalogue's schema cache share
/// the same compiled tree rather than duplicating it.
#[derive(Debug, Clone)]
pub enum Schema {
    /// `true` (every instance is valid) or `false` (no instance is valid).
    Boolean(bool),
    Object(Arc<SchemaObject>),
}

impl Schema {
    #[must_use]
    pub fn canonical_uri(&self) -> Option<&Uri> {
        match self {
            Schema::Boolean(_) => None,
            Schema::Object(obj) => obj.canonical_uri.as_ref(),
        }
    }
}

/// A compiled schema object (a JSON object schema, as opposed to the boolean schemas).
#[derive(Debug)]
pub struct SchemaObject {
    /// The absolute URI this schema resource is canonically known by, if it has one
    /// (inline subschemas reached only by JSON Pointer from a parent have none).
    pub canonical_uri: Option<Uri>,
    /// The metaschema this object (or its nearest ancestor `$schema`) declares.
    pub metaschema_uri: Uri,
    pub draft: Draft,
    /// The name this schema object declared via `$dynamicAnchor`, if any, making it a
    /// candidate landing site for a `$dynamicRef` resolving to the same anchor name.
    pub dynamic_anchor: Option<String>,
    /// Compiled keywords, in an order satisfying every [`crate::vocabulary::KeywordDef::depends_on`]
    /// constraint among them.
    pub keywords: Vec<CompiledKeyword>,
}

pub struct CompiledKeyword {
    pub name: &'static str,
    /// Instance types this keyword applies to, carried over from its [`crate::vocabulary::KeywordDef`]
    /// so the evaluator can skip keywords the instance's type rules out entirely.
    pub applies_to: TypeSet,
    pub keyword: Box<dyn Keyword>,
}

impl std::fmt::Debug for CompiledKeyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledKeyword").field("name", &self.name).finish_non_exhaustive()
    }
}
