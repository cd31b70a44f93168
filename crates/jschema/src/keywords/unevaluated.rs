//! `unevaluatedProperties`, `unevaluatedItems`: catch-all applicators over whatever
//! sibling keywords (including nested applicators) left unclaimed.
use ahash::AHashSet;
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::schema::Schema;
use crate::scope::{ItemsCoverage, Scope};

#[derive(Debug)]
pub struct UnevaluatedPropertiesKeyword(Schema);

pub fn unevaluated_properties_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(UnevaluatedPropertiesKeyword(
        ctx.compile_subschema(value, "unevaluatedProperties")?,
    )))
}

impl Keyword for UnevaluatedPropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf(
                "unevaluatedProperties",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let mut already_evaluated: AHashSet<String> = AHashSet::new();
        for sibling in ctx.siblings {
            already_evaluated.extend(sibling.evaluated_properties());
        }
        let mut children = Vec::new();
        let mut matched = Vec::new();
        for (key, value) in obj {
            if already_evaluated.contains(key) {
                continue;
            }
            let instance_path = ctx.child_instance_path(key.clone());
            children.push(ctx.evaluator.evaluate_with_path(
                &self.0,
                value,
                instance_path,
                ctx.schema_path.clone(),
            )?);
            matched.push(Value::String(key.clone()));
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf(
            "unevaluatedProperties",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        )
        .with_children(children)
        .with_annotation(Value::Array(matched)))
    }
}

#[derive(Debug)]
pub struct UnevaluatedItemsKeyword(Schema);

pub fn unevaluated_items_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(UnevaluatedItemsKeyword(ctx.compile_subschema(value, "unevaluatedItems")?)))
}

impl Keyword for UnevaluatedItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf(
                "unevaluatedItems",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let mut coverage = ItemsCoverage::default();
        for sibling in ctx.siblings {
            coverage.merge(sibling.evaluated_items_coverage());
        }
        let mut children = Vec::new();
        let mut examined_any = false;
        for (i, item) in items.iter().enumerate() {
            if coverage.is_evaluated(i) {
                continue;
            }
            examined_any = true;
            let instance_path = ctx.child_instance_path(i.to_string());
            children.push(ctx.evaluator.evaluate_with_path(
                &self.0,
                item,
                instance_path,
                ctx.schema_path.clone(),
            )?);
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf(
            "unevaluatedItems",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        )
        .with_children(children)
        .with_annotation(Value::Bool(examined_any)))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn unevaluated_properties_sees_through_all_of() {
        let schema = json!({
            "allOf": [{"properties": {"a": {"type": "string"}}}],
            "unevaluatedProperties": false,
        });
        assert!(validates(schema.clone(), json!({"a": "hi"})));
        assert!(!validates(schema, json!({"a": "hi", "b": 1})));
    }

    #[test]
    fn unevaluated_items_sees_through_prefix_items() {
        let schema = json!({
            "prefixItems": [{"type": "string"}],
            "unevaluatedItems": false,
        });
        assert!(validates(schema.clone(), json!(["a"])));
        assert!(!validates(schema, json!(["a", 1])));
    }

    #[test]
    fn unevaluated_items_treats_contains_coverage_as_sparse() {
        // `contains` only covers the indices it actually matched (1 and 3 here), not
        // every index up to the last match. Indices 0 and 2 remain unevaluated and must
        // be caught by `unevaluatedItems: false`.
        let schema = json!({
            "contains": {"const": 5},
            "unevaluatedItems": false,
        });
        assert!(!validates(schema, json!([1, 5, 1, 5])));
    }
}
