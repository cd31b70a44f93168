//! `items`, `prefixItems`, `maxItems`, `minItems`, `uniqueItems`: array-instance keywords.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::number::deep_eq;
use crate::schema::Schema;
use crate::scope::Scope;

/// `prefixItems`: a tuple of per-position subschemas.
#[derive(Debug)]
pub struct PrefixItemsKeyword(Vec<Schema>);

pub fn prefix_items_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let items = value.as_array().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "prefixItems",
        value: value.clone(),
        reason: "must be an array of schemas".into(),
    })?;
    let schemas = items
        .iter()
        .enumerate()
        .map(|(i, v)| ctx.compile_subschema(v, &i.to_string()))
        .collect::<Result<_, _>>()?;
    Ok(Box::new(PrefixItemsKeyword(schemas)))
}

impl Keyword for PrefixItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf("prefixItems", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let mut children = Vec::new();
        let mut evaluated = 0usize;
        for (i, (schema, item)) in self.0.iter().zip(items.iter()).enumerate() {
            let instance_path = ctx.child_instance_path(i.to_string());
            let schema_path = ctx.child_schema_path(i.to_string());
            children.push(ctx.evaluator.evaluate_with_path(schema, item, instance_path, schema_path)?);
            evaluated = i + 1;
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf("prefixItems", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(children)
            .with_annotation(Value::from(evaluated)))
    }
}

/// `items`: a single subschema applied to every array element past `prefixItems`'
/// coverage (or every element, if there is no `prefixItems`).
#[derive(Debug)]
pub struct ItemsKeyword(Schema);

pub fn items_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ItemsKeyword(ctx.compile_subschema(value, "items")?)))
}

impl Keyword for ItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf("items", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let start = ctx
            .sibling("prefixItems")
            .and_then(|s| s.annotation.as_ref())
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;
        let mut children = Vec::new();
        for (i, item) in items.iter().enumerate().skip(start) {
            let instance_path = ctx.child_instance_path(i.to_string());
            children.push(ctx.evaluator.evaluate_with_path(&self.0, item, instance_path, ctx.schema_path.clone())?);
        }
        let valid = children.iter().all(|c| c.valid);
        let annotation = if start < items.len() { Value::Bool(true) } else { Value::Bool(false) };
        Ok(Scope::leaf("items", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(children)
            .with_annotation(annotation))
    }
}

fn non_negative_integer(keyword: &'static str, value: &Value) -> Result<u64, CompileError> {
    value
        .as_u64()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword,
            value: value.clone(),
            reason: "must be a non-negative integer".into(),
        })
}

#[derive(Debug)]
pub struct MaxItemsKeyword(u64);

pub fn max_items_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MaxItemsKeyword(non_negative_integer("maxItems", value)?)))
}

impl Keyword for MaxItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf("maxItems", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = (items.len() as u64) <= self.0;
        let scope = Scope::leaf("maxItems", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("array has more than {} items", self.0))
        })
    }
}

#[derive(Debug)]
pub struct MinItemsKeyword(u64);

pub fn min_items_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MinItemsKeyword(non_negative_integer("minItems", value)?)))
}

impl Keyword for MinItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf("minItems", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = (items.len() as u64) >= self.0;
        let scope = Scope::leaf("minItems", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("array has fewer than {} items", self.0))
        })
    }
}

#[derive(Debug)]
pub struct UniqueItemsKeyword(bool);

pub fn unique_items_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let flag = value.as_bool().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "uniqueItems",
        value: value.clone(),
        reason: "must be a boolean".into(),
    })?;
    Ok(Box::new(UniqueItemsKeyword(flag)))
}

impl Keyword for UniqueItemsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let scope_valid =
            |valid| Scope::leaf("uniqueItems", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        if !self.0 {
            return Ok(scope_valid(true));
        }
        let Value::Array(items) = instance else {
            return Ok(scope_valid(true));
        };
        // O(n^2) membership check, matching jschon's `uniquified` list: correct for any
        // JSON value including nested objects/arrays, where a hash-based set would need
        // a canonicalization step anyway.
        let mut seen: Vec<&Value> = Vec::with_capacity(items.len());
        for item in items {
            if seen.iter().any(|s| deep_eq(s, item)) {
                return Ok(scope_valid(false).with_error("array items are not unique".to_string()));
            }
            seen.push(item);
        }
        Ok(scope_valid(true))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn prefix_items_then_items_cover_the_rest() {
        assert!(validates(
            json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}}),
            json!(["a", 1, 2, 3])
        ));
        assert!(!validates(
            json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}}),
            json!(["a", 1, "oops"])
        ));
    }

    #[test]
    fn unique_items_rejects_deep_duplicates() {
        assert!(!validates(json!({"uniqueItems": true}), json!([{"a": 1}, {"a": 1.0}])));
        assert!(validates(json!({"uniqueItems": true}), json!([{"a": 1}, {"a": 2}])));
    }
}
