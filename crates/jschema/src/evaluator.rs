//! Drives a compiled [`Schema`] against a JSON instance, producing a [`Scope`] tree.
use std::cell::RefCell;
use std::sync::Arc;

use jschema_referencing::JsonPointer;
use serde_json::Value;

use crate::catalogue::{Catalogue, SessionTag};
use crate::error::EvalError;
use crate::keyword::EvalContext;
use crate::primitive_type::PrimitiveType;
use crate::schema::{Schema, SchemaObject};
use crate::scope::Scope;

/// Evaluation blows the stack (a schema that `$ref`s itself with no base case) past this
/// many nested schema objects rather than recursing forever.
const MAX_DEPTH: usize = 500;

/// Evaluates instances against compiled schemas within one catalogue session.
///
/// Holds the *dynamic scope*: the stack of schema resources currently being evaluated,
/// which `$dynamicRef` walks (outermost first) to find a matching `$dynamicAnchor`.
pub struct Evaluator<'c> {
    catalogue: &'c Catalogue,
    session: SessionTag,
    dynamic_scope: RefCell<Vec<Arc<SchemaObject>>>,
    depth: RefCell<usize>,
}

impl<'c> Evaluator<'c> {
    #[must_use]
    pub fn new(catalogue: &'c Catalogue, session: SessionTag) -> Self {
        Evaluator {
            catalogue,
            session,
            dynamic_scope: RefCell::new(Vec::new()),
            depth: RefCell::new(0),
        }
    }

    #[must_use]
    pub fn catalogue(&self) -> &Catalogue {
        self.catalogue
    }

    #[must_use]
    pub fn session(&self) -> SessionTag {
        self.session.clone()
    }

    /// Evaluate `instance` against `schema`, starting a fresh result tree rooted at
    /// `instance_path`.
    ///
    /// # Errors
    ///
    /// Only for the two cases that are programmer errors about the schema rather than
    /// facts about the instance: an unresolved `$ref`/`$dynamicRef`/`$recursiveRef`
    /// target, or recursion exceeding the engine's depth guard.
    pub fn evaluate(&self, schema: &Schema, instance: &Value, instance_path: JsonPointer) -> Result<Scope, EvalError> {
        self.evaluate_with_path(schema, instance, instance_path, JsonPointer::root())
    }

    /// Evaluate `instance` against `schema`, reporting the node at `schema_path` (used
    /// when recursing from an applicator keyword, whose own `schema_path` is already
    /// past the keyword name).
    ///
    /// # Errors
    ///
    /// See [`Evaluator::evaluate`].
    pub fn evaluate_with_path(
        &self,
        schema: &Schema,
        instance: &Value,
        instance_path: JsonPointer,
        schema_path: JsonPointer,
    ) -> Result<Scope, EvalError> {
        match schema {
            Schema::Boolean(true) => Ok(Scope::node(instance_path, schema_path, true)),
            Schema::Boolean(false) => Ok(Scope::node(instance_path, schema_path, false)
                .with_error("the boolean schema 'false' rejects every instance")),
            Schema::Object(object) => self.evaluate_object(object, instance, instance_path, schema_path),
        }
    }

    fn evaluate_object(
        &self,
        object: &Arc<SchemaObject>,
        instance: &Value,
        instance_path: JsonPointer,
        schema_path: JsonPointer,
    ) -> Result<Scope, EvalError> {
        {
            let mut depth = self.depth.borrow_mut();
            *depth += 1;
            if *depth > MAX_DEPTH {
                *depth -= 1;
                return Err(EvalError::MaxRecursionDepthExceeded);
            }
        }
        self.dynamic_scope.borrow_mut().push(Arc::clone(object));

        let instance_types = PrimitiveType::of(instance);
        let mut siblings: Vec<Scope> = Vec::with_capacity(object.keywords.len());
        let mut failure: Option<EvalError> = None;
        for compiled in &object.keywords {
            if !compiled.applies_to.intersects(instance_types) {
                continue;
            }
            let keyword_schema_path = schema_path.push(compiled.name);
            let outcome = {
                let ctx = EvalContext {
                    evaluator: self,
                    instance_path: &instance_path,
                    schema_path: &keyword_schema_path,
                    siblings: &siblings,
                };
                compiled.keyword.evaluate(instance, &ctx)
            };
            match outcome {
                Ok(scope) => siblings.push(scope),
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        self.dynamic_scope.borrow_mut().pop();
        *self.depth.borrow_mut() -= 1;

        if let Some(err) = failure {
            return Err(err);
        }

        let valid = siblings.iter().all(|s| s.valid);
        Ok(Scope::node(instance_path, schema_path, valid).with_raw_children(siblings))
    }

    /// Search the dynamic scope outermost-first for a schema resource declaring
    /// `$dynamicAnchor: anchor`, per the 2020-12 `$dynamicRef` resolution algorithm.
    #[must_use]
    pub fn resolve_dynamic_anchor(&self, anchor: &str) -> Option<Schema> {
        self.dynamic_scope
            .borrow()
            .iter()
            .find(|object| object.dynamic_anchor.as_deref() == Some(anchor))
            .map(|object| Schema::Object(Arc::clone(object)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::Catalogue;

    #[test]
    fn keywords_outside_their_applicable_type_are_skipped_not_vacuously_evaluated() {
        let catalogue = Catalogue::new(&["2020-12"], false).unwrap();
        let session = catalogue.session(None).unwrap();
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "minLength": 3,
            "multipleOf": 2,
        });
        let uri = jschema_referencing::Uri::parse("https://example.com/type-skip").unwrap();
        session.catalogue().add_schema(uri.clone(), schema);
        let compiled = session.catalogue().get_schema(&uri, session.tag()).unwrap();

        let evaluator = super::Evaluator::new(session.catalogue(), session.tag());
        let outcome = evaluator
            .evaluate(&compiled, &json!(4), jschema_referencing::JsonPointer::root())
            .unwrap();

        // `minLength` doesn't apply to a number: it must be skipped outright, not
        // evaluated into a vacuously-true leaf.
        let keywords: Vec<_> = outcome.children.iter().filter_map(|c| c.keyword).collect();
        assert!(keywords.contains(&"multipleOf"));
        assert!(!keywords.contains(&"minLength"));
        assert!(outcome.valid);
    }
}
