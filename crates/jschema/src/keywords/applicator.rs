//! `allOf`, `anyOf`, `oneOf`, `not`, `if`/`then`/`else`: logical and conditional composition.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::schema::Schema;
use crate::scope::Scope;

fn compile_schema_array(
    keyword: &'static str,
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Vec<Schema>, CompileError> {
    let items = value.as_array().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword,
        value: value.clone(),
        reason: "must be an array of schemas".into(),
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, v)| ctx.compile_subschema(v, &i.to_string()))
        .collect()
}

#[derive(Debug)]
pub struct AllOfKeyword(Vec<Schema>);

pub fn all_of_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(AllOfKeyword(compile_schema_array("allOf", value, ctx)?)))
}

impl Keyword for AllOfKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let children: Vec<Scope> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, schema)| {
                let schema_path = ctx.child_schema_path(i.to_string());
                ctx.evaluator.evaluate_with_path(schema, instance, ctx.instance_path.clone(), schema_path)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf("allOf", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(children))
    }
}

#[derive(Debug)]
pub struct AnyOfKeyword(Vec<Schema>);

pub fn any_of_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(AnyOfKeyword(compile_schema_array("anyOf", value, ctx)?)))
}

impl Keyword for AnyOfKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let children: Vec<Scope> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, schema)| {
                let schema_path = ctx.child_schema_path(i.to_string());
                ctx.evaluator.evaluate_with_path(schema, instance, ctx.instance_path.clone(), schema_path)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        let valid = children.iter().any(|c| c.valid);
        let mut scope = Scope::leaf("anyOf", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_raw_children(children);
        if !valid {
            scope = scope.with_error("instance does not match any subschema in anyOf".to_string());
        }
        Ok(scope)
    }
}

#[derive(Debug)]
pub struct OneOfKeyword(Vec<Schema>);

pub fn one_of_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(OneOfKeyword(compile_schema_array("oneOf", value, ctx)?)))
}

impl Keyword for OneOfKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let children: Vec<Scope> = self
            .0
            .iter()
            .enumerate()
            .map(|(i, schema)| {
                let schema_path = ctx.child_schema_path(i.to_string());
                ctx.evaluator.evaluate_with_path(schema, instance, ctx.instance_path.clone(), schema_path)
            })
            .collect::<Result<Vec<_>, EvalError>>()?;
        let matches = children.iter().filter(|c| c.valid).count();
        let valid = matches == 1;
        let mut scope = Scope::leaf("oneOf", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_raw_children(children);
        if !valid {
            scope = scope.with_error(format!("instance matches {matches} subschemas in oneOf, expected exactly 1"));
        }
        Ok(scope)
    }
}

#[derive(Debug)]
pub struct NotKeyword(Schema);

pub fn not_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(NotKeyword(ctx.compile_subschema(value, "not")?)))
}

impl Keyword for NotKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let inner = ctx.evaluator.evaluate_with_path(
            &self.0,
            instance,
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
        )?;
        let valid = !inner.valid;
        let scope = Scope::leaf("not", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error("instance must not match the 'not' subschema".to_string())
        })
    }
}

/// `if`: has no assertion of its own. It evaluates the instance against its subschema
/// and publishes the (valid/invalid) outcome as an annotation-free scope that `then`/
/// `else` (both compiled as ordinary sibling keywords depending on `if`) consult via
/// [`EvalContext::sibling`].
#[derive(Debug)]
pub struct IfKeyword(Schema);

pub fn if_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(IfKeyword(ctx.compile_subschema(value, "if")?)))
}

impl Keyword for IfKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let inner = ctx.evaluator.evaluate_with_path(
            &self.0,
            instance,
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
        )?;
        // `if` itself always "passes": whether the instance matched only gates `then`/
        // `else`, it never fails validation on its own.
        Ok(Scope::leaf("if", ctx.instance_path.clone(), ctx.schema_path.clone(), true)
            .with_children(vec![inner]))
    }
}

#[derive(Debug)]
pub struct ThenKeyword(Schema);

pub fn then_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ThenKeyword(ctx.compile_subschema(value, "then")?)))
}

impl Keyword for ThenKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let if_matched = ctx
            .sibling("if")
            .and_then(|s| s.children.first())
            .map(|c| c.valid)
            .unwrap_or(false);
        if !if_matched {
            return Ok(Scope::leaf("then", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        }
        let inner = ctx.evaluator.evaluate_with_path(
            &self.0,
            instance,
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
        )?;
        let valid = inner.valid;
        Ok(Scope::leaf("then", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(vec![inner]))
    }
}

#[derive(Debug)]
pub struct ElseKeyword(Schema);

pub fn else_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ElseKeyword(ctx.compile_subschema(value, "else")?)))
}

impl Keyword for ElseKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let if_present = ctx.sibling("if").is_some();
        let if_matched = ctx
            .sibling("if")
            .and_then(|s| s.children.first())
            .map(|c| c.valid)
            .unwrap_or(false);
        if if_present && if_matched {
            return Ok(Scope::leaf("else", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        }
        let inner = ctx.evaluator.evaluate_with_path(
            &self.0,
            instance,
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
        )?;
        let valid = inner.valid;
        Ok(Scope::leaf("else", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(vec![inner]))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn all_of_requires_every_branch() {
        let schema = json!({"allOf": [{"type": "integer"}, {"minimum": 0}]});
        assert!(validates(schema.clone(), json!(5)));
        assert!(!validates(schema, json!(-5)));
    }

    #[test]
    fn one_of_requires_exactly_one_match() {
        let schema = json!({"oneOf": [{"type": "string"}, {"type": "integer"}]});
        assert!(validates(schema.clone(), json!("x")));
        assert!(!validates(schema, json!(1.5)));
    }

    #[test]
    fn if_then_else_picks_the_right_branch() {
        let schema = json!({
            "if": {"type": "string"},
            "then": {"minLength": 3},
            "else": {"minimum": 0},
        });
        assert!(validates(schema.clone(), json!("abc")));
        assert!(!validates(schema.clone(), json!("ab")));
        assert!(validates(schema.clone(), json!(5)));
        assert!(!validates(schema, json!(-5)));
    }
}
