//! `$ref`, `$dynamicRef`: cross-schema reference resolution.
use jschema_referencing::Uri;
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::scope::Scope;

#[derive(Debug)]
pub struct RefKeyword {
    target: Uri,
}

pub fn ref_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    let reference = value.as_str().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "$ref",
        value: value.clone(),
        reason: "must be a string".into(),
    })?;
    let target = ctx.base_uri.join(reference)?;
    Ok(Box::new(RefKeyword { target }))
}

impl Keyword for RefKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        evaluate_reference("$ref", &self.target, instance, ctx)
    }
}

/// `$dynamicRef`: resolved statically like `$ref` by default, but if the dynamic scope
/// (the chain of schemas whose evaluation is currently in progress) contains a schema
/// resource that declares a matching `$dynamicAnchor`, the *outermost* such resource is
/// used instead. This is what lets a reusable "library" schema be recursively extended
/// by whatever schema is actually being evaluated.
#[derive(Debug)]
pub struct DynamicRefKeyword {
    target: Uri,
    anchor: Option<String>,
}

pub fn dynamic_ref_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let reference = value.as_str().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "$dynamicRef",
        value: value.clone(),
        reason: "must be a string".into(),
    })?;
    let target = ctx.base_uri.join(reference)?;
    let anchor = target.fragment().filter(|f| !f.starts_with('/')).map(str::to_string);
    Ok(Box::new(DynamicRefKeyword { target, anchor }))
}

impl Keyword for DynamicRefKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        if let Some(anchor) = &self.anchor {
            if let Some(schema) = ctx.evaluator.resolve_dynamic_anchor(anchor) {
                let outcome = ctx.evaluator.evaluate_with_path(
                    &schema,
                    instance,
                    ctx.instance_path.clone(),
                    ctx.schema_path.clone(),
                )?;
                let valid = outcome.valid;
                return Ok(
                    Scope::leaf("$dynamicRef", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
                        .with_raw_children(vec![outcome]),
                );
            }
        }
        evaluate_reference("$dynamicRef", &self.target, instance, ctx)
    }
}

/// `$recursiveRef`: 2019-09's predecessor to `$dynamicRef`, always resolved against the
/// empty anchor name (see the `$recursiveAnchor` handling in [`crate::compiler`]).
#[derive(Debug)]
pub struct RecursiveRefKeyword {
    target: Uri,
}

pub fn recursive_ref_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let reference = value.as_str().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "$recursiveRef",
        value: value.clone(),
        reason: "must be a string".into(),
    })?;
    let target = ctx.base_uri.join(reference)?;
    Ok(Box::new(RecursiveRefKeyword { target }))
}

impl Keyword for RecursiveRefKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        if let Some(schema) = ctx.evaluator.resolve_dynamic_anchor("") {
            let outcome = ctx.evaluator.evaluate_with_path(
                &schema,
                instance,
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
            )?;
            let valid = outcome.valid;
            return Ok(
                Scope::leaf("$recursiveRef", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
                    .with_raw_children(vec![outcome]),
            );
        }
        evaluate_reference("$recursiveRef", &self.target, instance, ctx)
    }
}

/// Resolves `target` against the catalogue and recurses into it. An unresolved target
/// is a programmer error about the schema, not a fact about `instance`, so it escapes
/// as `Err` rather than becoming a failing leaf.
fn evaluate_reference(
    keyword: &'static str,
    target: &Uri,
    instance: &Value,
    ctx: &EvalContext<'_>,
) -> Result<Scope, EvalError> {
    let schema = ctx
        .evaluator
        .catalogue()
        .get_schema(target, ctx.evaluator.session())
        .map_err(|err| EvalError::UnresolvedReference {
            uri: target.to_string(),
            source: err,
        })?;
    let outcome = ctx.evaluator.evaluate_with_path(
        &schema,
        instance,
        ctx.instance_path.clone(),
        ctx.schema_path.clone(),
    )?;
    let valid = outcome.valid;
    Ok(
        Scope::leaf(keyword, ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_raw_children(vec![outcome]),
    )
}

#[cfg(test)]
mod tests {
    use crate::Catalogue;
    use jschema_referencing::{JsonPointer, Uri};
    use serde_json::json;

    #[test]
    fn ref_resolves_to_a_named_def() {
        let catalogue = Catalogue::new(&["2020-12"], false).unwrap();
        let session = catalogue.session(None).unwrap();
        let uri = Uri::parse("https://example.com/ref-test").unwrap();
        session.catalogue().add_schema(
            uri.clone(),
            json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$defs": {"positive": {"type": "integer", "minimum": 0}},
                "properties": {"count": {"$ref": "#/$defs/positive"}},
            }),
        );
        let schema = session.catalogue().get_schema(&uri, session.tag()).unwrap();
        let evaluator = crate::evaluator::Evaluator::new(session.catalogue(), session.tag());
        assert!(evaluator
            .evaluate(&schema, &json!({"count": 3}), JsonPointer::root())
            .unwrap()
            .valid);
        assert!(!evaluator
            .evaluate(&schema, &json!({"count": -1}), JsonPointer::root())
            .unwrap()
            .valid);
    }
}
