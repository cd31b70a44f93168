//! `maxProperties`, `minProperties`, `required`, `dependentRequired`: object-shape assertions.
use ahash::AHashMap;
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::scope::Scope;

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
pub struct MaxPropertiesKeyword(u64);

pub fn max_properties_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MaxPropertiesKeyword(non_negative_integer("maxProperties", value)?)))
}

impl Keyword for MaxPropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf("maxProperties", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = (obj.len() as u64) <= self.0;
        let scope = Scope::leaf("maxProperties", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("object has more than {} properties", self.0))
        })
    }
}

#[derive(Debug)]
pub struct MinPropertiesKeyword(u64);

pub fn min_properties_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MinPropertiesKeyword(non_negative_integer("minProperties", value)?)))
}

impl Keyword for MinPropertiesKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf("minProperties", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = (obj.len() as u64) >= self.0;
        let scope = Scope::leaf("minProperties", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("object has fewer than {} properties", self.0))
        })
    }
}

#[derive(Debug)]
pub struct RequiredKeyword(Vec<String>);

pub fn required_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let names = value
        .as_array()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword: "required",
            value: value.clone(),
            reason: "must be an array of strings".into(),
        })?
        .iter()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| CompileError::InvalidKeywordValue {
                keyword: "required",
                value: value.clone(),
                reason: "array elements must be strings".into(),
            })
        })
        .collect::<Result<_, _>>()?;
    Ok(Box::new(RequiredKeyword(names)))
}

impl Keyword for RequiredKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf("required", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let missing: Vec<&String> = self.0.iter().filter(|name| !obj.contains_key(*name)).collect();
        let valid = missing.is_empty();
        let scope = Scope::leaf("required", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!(
                "object is missing required propert{}: {}",
                if missing.len() == 1 { "y" } else { "ies" },
                missing
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

#[derive(Debug)]
pub struct DependentRequiredKeyword(AHashMap<String, Vec<String>>);

pub fn dependent_required_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let map = value
        .as_object()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword: "dependentRequired",
            value: value.clone(),
            reason: "must be an object".into(),
        })?;
    let mut out = AHashMap::new();
    for (property, deps) in map {
        let names: Vec<String> = deps
            .as_array()
            .ok_or_else(|| CompileError::InvalidKeywordValue {
                keyword: "dependentRequired",
                value: value.clone(),
                reason: format!("value for '{property}' must be an array of strings"),
            })?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<_>>()
            .ok_or_else(|| CompileError::InvalidKeywordValue {
                keyword: "dependentRequired",
                value: value.clone(),
                reason: format!("value for '{property}' must be an array of strings"),
            })?;
        out.insert(property.clone(), names);
    }
    Ok(Box::new(DependentRequiredKeyword(out)))
}

impl Keyword for DependentRequiredKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::Object(obj) = instance else {
            return Ok(Scope::leaf(
                "dependentRequired",
                ctx.instance_path.clone(),
                ctx.schema_path.clone(),
                true,
            ));
        };
        let mut errors = Vec::new();
        for (property, deps) in &self.0 {
            if !obj.contains_key(property) {
                continue;
            }
            for dep in deps {
                if !obj.contains_key(dep) {
                    errors.push(format!("'{property}' requires property '{dep}' to also be present"));
                }
            }
        }
        let valid = errors.is_empty();
        let mut scope = Scope::leaf(
            "dependentRequired",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        );
        for error in errors {
            scope = scope.with_error(error);
        }
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn required_reports_all_missing_properties() {
        assert!(!validates(json!({"required": ["a", "b"]}), json!({"a": 1})));
        assert!(validates(json!({"required": ["a", "b"]}), json!({"a": 1, "b": 2})));
    }

    #[test]
    fn dependent_required_only_applies_when_the_property_is_present() {
        let schema = json!({"dependentRequired": {"credit_card": ["billing_address"]}});
        assert!(validates(schema.clone(), json!({})));
        assert!(!validates(schema, json!({"credit_card": "1234"})));
    }
}
