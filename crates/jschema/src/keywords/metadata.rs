//! Annotation-only keywords: `title`, `description`, `default`, `deprecated`,
//! `readOnly`, `writeOnly`, `examples`, `contentEncoding`, `contentMediaType`,
//! `contentSchema`. None of these constrain the instance; they only publish their
//! value as an annotation for tooling (documentation generators, UI form builders) to
//! read back out of the [`Scope`] tree.
use serde_json::Value;

use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::scope::Scope;

macro_rules! annotation_keyword {
    ($ty:ident, $name:literal, $factory:ident) => {
        #[derive(Debug)]
        pub struct $ty(Value);

        pub fn $factory(
            value: &Value,
            _ctx: &mut CompileContext<'_>,
        ) -> Result<Box<dyn Keyword>, CompileError> {
            Ok(Box::new($ty(value.clone())))
        }

        impl Keyword for $ty {
            fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
                Ok(Scope::leaf($name, ctx.instance_path.clone(), ctx.schema_path.clone(), true)
                    .with_annotation(self.0.clone()))
            }
        }
    };
}

annotation_keyword!(TitleKeyword, "title", title_factory);
annotation_keyword!(DescriptionKeyword, "description", description_factory);
annotation_keyword!(DefaultKeyword, "default", default_factory);
annotation_keyword!(DeprecatedKeyword, "deprecated", deprecated_factory);
annotation_keyword!(ReadOnlyKeyword, "readOnly", read_only_factory);
annotation_keyword!(WriteOnlyKeyword, "writeOnly", write_only_factory);
annotation_keyword!(ExamplesKeyword, "examples", examples_factory);
annotation_keyword!(ContentEncodingKeyword, "contentEncoding", content_encoding_factory);
annotation_keyword!(ContentMediaTypeKeyword, "contentMediaType", content_media_type_factory);

/// `contentSchema` is itself a schema (applied to the *decoded* content, which this
/// engine does not attempt to decode), so it is compiled for shape-checking but, like
/// the rest of this module, never fails validation.
#[derive(Debug)]
pub struct ContentSchemaKeyword(crate::schema::Schema);

pub fn content_schema_factory(
    value: &Value,
    ctx: &mut CompileContext<'_>,
) -> Result<Box<dyn Keyword>, CompileError> {
    Ok(Box::new(ContentSchemaKeyword(ctx.compile_subschema(value, "contentSchema")?)))
}

impl Keyword for ContentSchemaKeyword {
    fn evaluate(&self, _instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        Ok(Scope::leaf("contentSchema", ctx.instance_path.clone(), ctx.schema_path.clone(), true))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn metadata_keywords_never_fail_validation() {
        let schema = json!({
            "title": "count",
            "description": "how many",
            "default": 0,
            "deprecated": true,
            "readOnly": true,
            "examples": [1, 2, 3],
        });
        assert!(validates(schema, json!(5)));
    }
}
