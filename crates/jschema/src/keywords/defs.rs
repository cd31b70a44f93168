//! `$defs` (and its legacy 2019-09 alias `definitions`): a bag of reusable subschemas
//! with no validation semantics of their own, addressed only via `$ref`/`$dynamicRef`
//! JSON Pointers into this object. Compiling each member is what registers it in the
//! catalogue under its pointer, which is the only reason a reference to it ever
//! resolves — `$ref` resolution never descends into sibling keywords on its own.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::scope::Scope;

#[derive(Debug)]
pub struct DefsKeyword;

fn compile_members(
    keyword: &'static str,
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<(), CompileError> {
    let members = value.as_object().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword,
        value: value.clone(),
        reason: "must be an object mapping names to schemas".into(),
    })?;
    for (name, subschema) in members {
        ctx.compile_subschema(subschema, name)?;
    }
    Ok(())
}

pub fn defs_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    compile_members("$defs", value, ctx)?;
    Ok(Box::new(DefsKeyword))
}

impl Keyword for DefsKeyword {
    fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        Ok(Scope::leaf("$defs", ctx.instance_path.clone(), ctx.schema_path.clone(), true))
    }
}

/// 2019-09 predates `$defs` (itself renamed from the draft-07-and-earlier `definitions`)
/// only in name; both drafts register this factory, just under their own keyword name.
#[derive(Debug)]
pub struct DefinitionsKeyword;

pub fn definitions_factory(value: &Value, ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    compile_members("definitions", value, ctx)?;
    Ok(Box::new(DefinitionsKeyword))
}

impl Keyword for DefinitionsKeyword {
    fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        Ok(Scope::leaf("definitions", ctx.instance_path.clone(), ctx.schema_path.clone(), true))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn ref_resolves_into_defs() {
        let schema = json!({
            "$defs": {"positive": {"type": "integer", "minimum": 0}},
            "properties": {"count": {"$ref": "#/$defs/positive"}},
        });
        assert!(validates(schema.clone(), json!({"count": 3})));
        assert!(!validates(schema, json!({"count": -1})));
    }
}
