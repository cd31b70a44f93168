//! `contains`, `maxContains`, `minContains`: at-least/at-most-N-elements-match assertions.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::schema::Schema;
use crate::scope::Scope;

#[derive(Debug)]
pub struct ContainsKeyword(Schema);

pub fn contains_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ContainsKeyword(ctx.compile_subschema(value, "contains")?)))
}

impl Keyword for ContainsKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Array(items) = instance else {
            return Ok(Scope::leaf("contains", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let mut matches = Vec::new();
        let mut children = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let instance_path = ctx.child_instance_path(i.to_string());
            let node = ctx
                .evaluator
                .evaluate_with_path(&self.0, item, instance_path, ctx.schema_path.clone())?;
            if node.valid {
                matches.push(Value::from(i));
            }
            children.push(node);
        }
        let min = ctx.min_contains_requirement();
        let max = ctx.max_contains_requirement();
        let count = matches.len();
        let valid = count >= min.unwrap_or(1) && max.map_or(true, |m| count <= m);
        // `contains` reports only its own count assertion; a non-matching item among
        // `items` is not itself a `contains` failure.
        let mut scope = Scope::leaf("contains", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_raw_children(children)
            .with_annotation(Value::Array(matches));
        if !valid {
            scope = scope.with_error(format!(
                "array contains {count} matching item(s), expected between {} and {}",
                min.unwrap_or(1),
                max.map_or("unbounded".to_string(), |m| m.to_string())
            ));
        }
        Ok(scope)
    }
}

#[derive(Debug)]
pub struct MaxContainsKeyword(pub(crate) u64);
#[derive(Debug)]
pub struct MinContainsKeyword(pub(crate) u64);

fn non_negative_integer(keyword: &'static str, value: &Value) -> Result<u64, CompileError> {
    value
        .as_u64()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword,
            value: value.clone(),
            reason: "must be a non-negative integer".into(),
        })
}

pub fn max_contains_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MaxContainsKeyword(non_negative_integer("maxContains", value)?)))
}

pub fn min_contains_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MinContainsKeyword(non_negative_integer("minContains", value)?)))
}

/// `maxContains`/`minContains` have no independent instance-level meaning: they are
/// pure modifiers of `contains`'s own count assertion, looked up by `contains` via
/// [`EvalContext::max_contains_requirement`]/[`EvalContext::min_contains_requirement`].
/// They still produce a (trivially valid) scope node so catalogued error clearing
/// mirrors jschon's rule: when `contains` is valid, a subsidiary `maxContains`/
/// `minContains` failure (impossible here since the count check happens once, in
/// `contains`) never surfaces as a separate error.
impl Keyword for MaxContainsKeyword {
    fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        Ok(Scope::leaf("maxContains", ctx.instance_path.clone(), ctx.schema_path.clone(), true)
            .with_annotation(Value::from(self.0)))
    }
}

impl Keyword for MinContainsKeyword {
    fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        Ok(Scope::leaf("minContains", ctx.instance_path.clone(), ctx.schema_path.clone(), true)
            .with_annotation(Value::from(self.0)))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn contains_counts_matching_items() {
        let schema = json!({"contains": {"type": "integer"}, "minContains": 2, "maxContains": 3});
        assert!(validates(schema.clone(), json!([1, "a", 2])));
        assert!(!validates(schema.clone(), json!(["a", "b", 1])));
        assert!(!validates(schema, json!([1, 2, 3, 4])));
    }

    #[test]
    fn contains_without_min_max_requires_at_least_one() {
        assert!(!validates(json!({"contains": {"type": "integer"}}), json!(["a", "b"])));
    }
}
