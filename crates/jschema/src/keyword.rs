//! The `Keyword` trait: the unit of behavior a vocabulary contributes.
use core::fmt;

use serde_json::Value;

use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::scope::Scope;
use jschema_referencing::JsonPointer;

/// A compiled keyword, ready to evaluate instances.
///
/// Kept as a trait object (`Box<dyn Keyword>`) rather than a closed enum so that a
/// caller can register a custom vocabulary's keywords (via
/// [`crate::Catalogue::create_vocabulary`]) alongside the built-in ones, exactly like
/// adding a third-party applicator.
pub trait Keyword: fmt::Debug + Send + Sync {
    /// Evaluate this keyword against `instance`, producing the [`Scope`] node that
    /// reports its outcome (and, for applicator keywords, the subschema scopes beneath
    /// it).
    ///
    /// Returns `Err` only for the two cases that are programmer errors about the
    /// schema rather than facts about the instance: an unresolved `$ref`/`$dynamicRef`/
    /// `$recursiveRef` target, or recursion exceeding the engine's depth guard. Both
    /// escape the [`Scope`] tree entirely instead of being folded in as a failing leaf.
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError>;
}

/// Everything a [`Keyword::evaluate`] implementation needs besides the instance: how to
/// recurse into subschemas, where it sits in the instance/schema, and what its already-
/// evaluated sibling keywords (at the same schema object) produced.
pub struct EvalContext<'a> {
    pub evaluator: &'a Evaluator<'a>,
    pub instance_path: &'a JsonPointer,
    pub schema_path: &'a JsonPointer,
    /// Scopes already produced by earlier keywords at this same schema object, in
    /// compiled dependency order. Used by keywords whose semantics depend on a sibling's
    /// outcome (`unevaluatedProperties` on `properties`/`additionalProperties`/etc,
    /// `maxContains`/`minContains` on `contains`).
    pub siblings: &'a [Scope],
}

impl<'a> EvalContext<'a> {
    #[must_use]
    pub fn sibling(&self, keyword: &str) -> Option<&Scope> {
        self.siblings.iter().find(|s| s.keyword == Some(keyword))
    }

    #[must_use]
    pub fn child_instance_path(&self, token: impl Into<String>) -> JsonPointer {
        self.instance_path.push(token)
    }

    #[must_use]
    pub fn child_schema_path(&self, token: impl Into<String>) -> JsonPointer {
        self.schema_path.push(token)
    }

    /// `minContains`'s declared bound, if the sibling keyword is present at this
    /// schema object.
    #[must_use]
    pub fn min_contains_requirement(&self) -> Option<usize> {
        self.sibling("minContains")
            .and_then(|s| s.annotation.as_ref())
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }

    /// `maxContains`'s declared bound, if the sibling keyword is present at this
    /// schema object.
    #[must_use]
    pub fn max_contains_requirement(&self) -> Option<usize> {
        self.sibling("maxContains")
            .and_then(|s| s.annotation.as_ref())
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }
}
