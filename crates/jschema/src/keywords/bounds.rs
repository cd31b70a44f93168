//! `multipleOf`, `maximum`, `exclusiveMaximum`, `minimum`, `exclusiveMinimum`.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::number::{to_decimal, Decimal};
use crate::scope::Scope;

fn decimal_of(keyword: &'static str, value: &Value) -> Result<Decimal, CompileError> {
    let n = value.as_number().ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword,
        value: value.clone(),
        reason: "must be a number".into(),
    })?;
    to_decimal(n).ok_or_else(|| CompileError::InvalidKeywordValue {
        keyword,
        value: value.clone(),
        reason: "is not a finite decimal".into(),
    })
}

#[derive(Debug)]
pub struct MultipleOfKeyword(Decimal);

pub fn multiple_of_factory(
    value: &Value,
    _ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    let divisor = decimal_of("multipleOf", value)?;
    if divisor <= Decimal::from(0u8) {
        return Err(CompileError::InvalidKeywordValue {
            keyword: "multipleOf",
            value: value.clone(),
            reason: "must be a positive number".into(),
        });
    }
    Ok(Box::new(MultipleOfKeyword(divisor)))
}

impl Keyword for MultipleOfKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let path = |k| Scope::leaf(k, ctx.instance_path.clone(), ctx.schema_path.clone(), true);
        let Some(n) = instance.as_number() else {
            return Ok(path("multipleOf"));
        };
        let Some(value) = to_decimal(n) else {
            return Ok(path("multipleOf"));
        };
        // Division never panics: `multipleOf` is validated strictly positive at compile time.
        let quotient = value / self.0.clone();
        let valid = quotient.fract() == Decimal::from(0u8);
        let scope = Scope::leaf(
            "multipleOf",
            ctx.instance_path.clone(),
            ctx.schema_path.clone(),
            valid,
        );
        Ok(if valid {
            scope
        } else {
            scope.with_error(format!("{instance} is not a multiple of the required divisor"))
        })
    }
}

macro_rules! comparison_keyword {
    ($ty:ident, $factory:ident, $name:literal, $cmp:expr) => {
        #[derive(Debug)]
        pub struct $ty(Decimal);

        pub fn $factory(
            value: &Value,
            _ctx: &mut CompileContext<'_>,
        ) -> Result<Box<dyn Keyword>, CompileError> {
            Ok(Box::new($ty(decimal_of($name, value)?)))
        }

        impl Keyword for $ty {
            fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
                let scope_valid = |valid| {
                    Scope::leaf($name, ctx.instance_path.clone(), ctx.schema_path.clone(), valid)
                };
                let Some(n) = instance.as_number() else {
                    return Ok(scope_valid(true));
                };
                let Some(value) = to_decimal(n) else {
                    return Ok(scope_valid(true));
                };
                let cmp: fn(&Decimal, &Decimal) -> bool = $cmp;
                let valid = cmp(&value, &self.0);
                Ok(if valid {
                    scope_valid(true)
                } else {
                    scope_valid(false).with_error(format!(
                        "{instance} does not satisfy {} {}",
                        $name, self.0
                    ))
                })
            }
        }
    };
}

comparison_keyword!(MaximumKeyword, maximum_factory, "maximum", |v, bound| v <= bound);
comparison_keyword!(
    ExclusiveMaximumKeyword,
    exclusive_maximum_factory,
    "exclusiveMaximum",
    |v, bound| v < bound
);
comparison_keyword!(MinimumKeyword, minimum_factory, "minimum", |v, bound| v >= bound);
comparison_keyword!(
    ExclusiveMinimumKeyword,
    exclusive_minimum_factory,
    "exclusiveMinimum",
    |v, bound| v > bound
);

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn multiple_of_handles_exact_decimals() {
        assert!(validates(json!({"multipleOf": 0.1}), json!(0.3)));
        assert!(!validates(json!({"multipleOf": 0.1}), json!(0.35)));
    }

    #[test]
    fn multiple_of_rejects_non_positive_divisors_at_compile_time() {
        use crate::Catalogue;

        let catalogue = Catalogue::new(&["2020-12"], false).unwrap();
        let session = catalogue.session(None).unwrap();
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "multipleOf": 0,
        });
        let uri = jschema_referencing::Uri::parse("https://example.com/multiple-of-zero").unwrap();
        session.catalogue().add_schema(uri.clone(), schema);
        assert!(session.catalogue().get_schema(&uri, session.tag()).is_err());

        let schema = json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "multipleOf": -2,
        });
        let uri = jschema_referencing::Uri::parse("https://example.com/multiple-of-negative").unwrap();
        session.catalogue().add_schema(uri.clone(), schema);
        assert!(session.catalogue().get_schema(&uri, session.tag()).is_err());
    }

    #[test]
    fn exclusive_bounds_exclude_the_edge() {
        assert!(!validates(json!({"exclusiveMaximum": 10}), json!(10)));
        assert!(validates(json!({"maximum": 10}), json!(10)));
    }
}
