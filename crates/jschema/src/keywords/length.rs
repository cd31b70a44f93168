//! `maxLength`, `minLength`, `pattern`: string-instance assertions.
use fancy_regex::Regex;
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

/// Code-point length, not byte length: `"é"` has length 1, matching jschon's
/// `len(instance)` over the decoded string, not its UTF-8 byte count.
fn code_point_len(s: &str) -> u64 {
    s.chars().count() as u64
}

#[derive(Debug)]
pub struct MaxLengthKeyword(u64);

pub fn max_length_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MaxLengthKeyword(non_negative_integer("maxLength", value)?)))
}

impl Keyword for MaxLengthKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::String(s) = instance else {
            return Ok(Scope::leaf("maxLength", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = code_point_len(s) <= self.0;
        let scope = Scope::leaf("maxLength", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("string is longer than {} characters", self.0))
        })
    }
}

#[derive(Debug)]
pub struct MinLengthKeyword(u64);

pub fn min_length_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(MinLengthKeyword(non_negative_integer("minLength", value)?)))
}

impl Keyword for MinLengthKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::String(s) = instance else {
            return Ok(Scope::leaf("minLength", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        let valid = code_point_len(s) >= self.0;
        let scope = Scope::leaf("minLength", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("string is shorter than {} characters", self.0))
        })
    }
}

#[derive(Debug)]
pub struct PatternKeyword {
    source: String,
    regex: Regex,
}

pub fn pattern_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let source = value.as_str().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword: "pattern",
        value: value.clone(),
        reason: "must be a string".into(),
    })?;
    let regex = Regex::new(source).map_err(|err| CompileError::InvalidKeywordValue {
        keyword: "pattern",
        value: value.clone(),
        reason: err.to_string(),
    })?;
    Ok(Box::new(PatternKeyword {
        source: source.to_string(),
        regex,
    }))
}

impl Keyword for PatternKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let Value::String(s) = instance else {
            return Ok(Scope::leaf("pattern", ctx.instance_path.clone(), ctx.schema_path.clone(), true));
        };
        // `pattern` requires a partial match anywhere in the string (ECMA-262 `test`
        // semantics), not a full-string match.
        let valid = self.regex.is_match(s).unwrap_or(false);
        let scope = Scope::leaf("pattern", ctx.instance_path.clone(), ctx.schema_path.clone(), valid);
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("{s:?} does not match pattern /{}/", self.source))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn length_is_counted_in_code_points() {
        assert!(validates(json!({"maxLength": 1}), json!("é")));
        assert!(!validates(json!({"minLength": 2}), json!("é")));
    }

    #[test]
    fn pattern_matches_anywhere_in_the_string() {
        assert!(validates(json!({"pattern": "bar"}), json!("foobarbaz")));
        assert!(!validates(json!({"pattern": "^bar$"}), json!("foobarbaz")));
    }
}
