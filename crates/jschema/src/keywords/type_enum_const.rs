//! `type`, `enum`, `const`: instance-shape and exact-value assertions.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::number::deep_eq;
use crate::primitive_type::{PrimitiveType, TypeSet};
use crate::scope::Scope;

#[derive(Debug)]
pub struct TypeKeyword {
    allowed: TypeSet,
    names: Vec<String>,
}

pub fn type_factory(value: &Value, _ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    let names: Vec<String> = match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| CompileError::InvalidKeywordValue {
                    keyword: "type",
                    value: value.clone(),
                    reason: "array elements must be strings".into(),
                })
            })
            .collect::<Result<_, _>>()?,
        _ => {
            return Err(CompileError::InvalidKeywordValue {
                keyword: "type",
                value: value.clone(),
                reason: "must be a string or array of strings".into(),
            })
        }
    };
    let mut allowed = TypeSet::NONE;
    for name in &names {
        let ty = PrimitiveType::from_name(name).ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword: "type",
            value: value.clone(),
            reason: format!("unknown instance type '{name}'"),
        })?;
        allowed = allowed.insert(ty);
    }
    Ok(Box::new(TypeKeyword { allowed, names }))
}

impl Keyword for TypeKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let instance_types = PrimitiveType::of(instance);
        let valid = instance_types.intersects(self.allowed);
        let scope = Scope::leaf("type", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!(
                "{} is not of type {}",
                instance,
                self.names.join(", ")
            ))
        })
    }
}

#[derive(Debug)]
pub struct EnumKeyword {
    values: Vec<Value>,
}

pub fn enum_factory(value: &Value, _ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    let values = value
        .as_array()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword: "enum",
            value: value.clone(),
            reason: "must be an array".into(),
        })?
        .clone();
    Ok(Box::new(EnumKeyword { values }))
}

impl Keyword for EnumKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let valid = self.values.iter().any(|v| deep_eq(v, instance));
        let scope = Scope::leaf("enum", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("{instance} is not one of the enumerated values"))
        })
    }
}

#[derive(Debug)]
pub struct ConstKeyword {
    value: Value,
}

pub fn const_factory(value: &Value, _ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ConstKeyword { value: value.clone() }))
}

impl Keyword for ConstKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let valid = deep_eq(&self.value, instance);
        let scope = Scope::leaf("const", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("{instance} does not equal the required constant"))
        })
    }
}
