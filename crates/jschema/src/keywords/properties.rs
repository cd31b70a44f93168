//! `properties`, `patternProperties`, `additionalProperties`, `propertyNames`,
//! `dependentSchemas`: per-property object applicators.
use ahash::AHashSet;
use fancy_regex::Regex;
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::schema::Schema;
use crate::scope::Scope;

#[derive(Debug)]
pub struct PropertiesKeyword(Vec<(String, Schema)>);

pub fn properties_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let map = value.as_object().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "properties",
        value: value.clone(),
        reason: "must be an object".into(),
    })?;
    let mut schemas = Vec::with_capacity(map.len());
    for (name, subschema) in map {
        schemas.push((name.clone(), ctx.compile_subschema(subschema, name)?));
    }
    Ok(Box::new(PropertiesKeyword(schemas)))
}

impl Keyword for PropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf("properties", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let mut children = Vec::new();
        let mut matched = Vec::new();
        for (name, schema) in &self.0 {
            if let Some(value) = obj.get(name) {
                let instance_path = ctx.child_instance_path(name.clone());
                let schema_path = ctx.child_schema_path(name.clone());
                children.push(ctx.evaluator.evaluate_with_path(schema, value, instance_path, schema_path)?);
                matched.push(Value::String(name.clone()));
            }
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf("properties", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(children)
            .with_annotation(Value::Array(matched)))
    }
}

#[derive(Debug)]
pub struct PatternPropertiesKeyword(Vec<(String, Regex, Schema)>);

pub fn pattern_properties_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let map = value.as_object().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "patternProperties",
        value: value.clone(),
        reason: "must be an object".into(),
    })?;
    let mut patterns = Vec::with_capacity(map.len());
    for (pattern, subschema) in map {
        let regex = Regex::new(pattern).map_err(|err| CompileError::InvalidKeywordValue {
            keyword: "patternProperties",
            value: value.clone(),
            reason: err.to_string(),
        })?;
        patterns.push((pattern.clone(), regex, ctx.compile_subschema(subschema, pattern)?));
    }
    Ok(Box::new(PatternPropertiesKeyword(patterns)))
}

impl Keyword for PatternPropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf(
                "patternProperties",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let mut children = Vec::new();
        let mut matched = Vec::new();
        for (key, value) in obj {
            for (pattern, regex, schema) in &self.0 {
                if regex.is_match(key).unwrap_or(false) {
                    let instance_path = ctx.child_instance_path(key.clone());
                    let schema_path = ctx.child_schema_path(pattern.clone());
                    children.push(ctx.evaluator.evaluate_with_path(schema, value, instance_path, schema_path)?);
                    matched.push(Value::String(key.clone()));
                }
            }
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf(
            "patternProperties",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        )
        .with_children(children)
        .with_annotation(Value::Array(matched)))
    }
}

#[derive(Debug)]
pub struct AdditionalPropertiesKeyword(Schema);

pub fn additional_properties_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(AdditionalPropertiesKeyword(
        ctx.compile_subschema(value, "additionalProperties")?,
    )))
}

impl Keyword for AdditionalPropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf(
                "additionalProperties",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let claimed: AHashSet<&str> = ctx
            .sibling("properties")
            .and_then(|s| s.annotation.as_ref())
            .into_iter()
            .chain(ctx.sibling("patternProperties").and_then(|s| s.annotation.as_ref()))
            .filter_map(|v| v.as_array())
            .flatten()
            .filter_map(Value::as_str)
            .collect();
        let mut children = Vec::new();
        let mut matched = Vec::new();
        for (key, value) in obj {
            if claimed.contains(key.as_str()) {
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
            "additionalProperties",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        )
        .with_children(children)
        .with_annotation(Value::Array(matched)))
    }
}

#[derive(Debug)]
pub struct PropertyNamesKeyword(Schema);

pub fn property_names_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(PropertyNamesKeyword(ctx.compile_subschema(value, "propertyNames")?)))
}

impl Keyword for PropertyNamesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf("propertyNames", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let mut children = Vec::new();
        for key in obj.keys() {
            let instance_path = ctx.child_instance_path(key.clone());
            children.push(ctx.evaluator.evaluate_with_path(
                &self.0,
                &Value::String(key.clone()),
                instance_path,
                ctx.schema_path.clone(),
            )?);
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf("propertyNames", ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
            .with_children(children))
    }
}

#[derive(Debug)]
pub struct DependentSchemasKeyword(Vec<(String, Schema)>);

pub fn dependent_schemas_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let map = value.as_object().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "dependentSchemas",
        value: value.clone(),
        reason: "must be an object".into(),
    })?;
    let mut schemas = Vec::with_capacity(map.len());
    for (name, subschema) in map {
        schemas.push((name.clone(), ctx.compile_subschema(subschema, name)?));
    }
    Ok(Box::new(DependentSchemasKeyword(schemas)))
}

impl Keyword for DependentSchemasKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf(
                "dependentSchemas",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let mut children = Vec::new();
        for (name, schema) in &self.0 {
            if obj.contains_key(name) {
                let schema_path = ctx.child_schema_path(name.clone());
                children.push(ctx.evaluator.evaluate_with_path(
                    schema,
                    instance,
                    ctx.instance_path.clone(),
                    schema_path,
                )?);
            }
        }
        let valid = children.iter().all(|c| c.valid);
        Ok(Scope::leaf(
            "dependentSchemas",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        )
        .with_children(children))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn additional_properties_excludes_properties_and_pattern_matches() {
        let schema = json!({
            "properties": {"a": {"type": "string"}},
            "patternProperties": {"^x-": {"type": "boolean"}},
            "additionalProperties": false,
        });
        assert!(validates(schema.clone(), json!({"a": "hi", "x-flag": true})));
        assert!(!validates(schema, json!({"a": "hi", "extra": 1})));
    }

    #[test]
    fn property_names_constrains_keys() {
        assert!(validates(
            json!({"propertyNames": {"pattern": "^[a-z]+$"}}),
            json!({"ok": 1})
        ));
        assert!(!validates(
            json!({"propertyNames": {"pattern": "^[a-z]+$"}}),
            json!({"Not OK": 1})
        ));
    }

    #[test]
    fn dependent_schemas_applies_when_property_is_present() {
        let schema = json!({
            "dependentSchemas": {"a": {"required": ["b"]}}
        });
        assert!(validates(schema.clone(), json!({})));
        assert!(!validates(schema, json!({"a": 1})));
    }
}
