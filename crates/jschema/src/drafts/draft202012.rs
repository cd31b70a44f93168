//! The 2020-12 draft's bundled metaschema and default vocabulary set.
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::keywords::{applicator, bounds, contains, defs, format, items, length, metadata, object_count, properties, reference, type_enum_const, unevaluated};
use crate::primitive_type::{PrimitiveType, TypeSet};
use crate::vocabulary::{KeywordDef, Vocabulary};

const BASE: &str = "https://json-schema.org/draft/2020-12";

/// A deliberately small, self-describing metaschema: rather than ship the full
/// official 2020-12 meta-schema text, `bootstrap_draft` only needs a document that (a)
/// declares this draft's `$vocabulary` map and (b) validates against itself with the
/// keyword set this engine actually implements.
static METASCHEMA: Lazy<Value> = Lazy::new(|| {
    let mut vocabulary = serde_json::Map::new();
    for (uri, required) in vocabulary_declarations() {
        vocabulary.insert(uri, Value::Bool(required));
    }
    json!({
        "$schema": format!("{BASE}/schema"),
        "$id": format!("{BASE}/schema"),
        "$dynamicAnchor": "meta",
        "$vocabulary": vocabulary,
        "type": ["object", "boolean"],
    })
});

#[must_use]
pub fn documents() -> Vec<(&'static str, &'static Value)> {
    vec![(concat!("https://json-schema.org/draft/2020-12/schema"), &*METASCHEMA)]
}

#[must_use]
pub fn vocabulary_declarations() -> Vec<(String, bool)> {
    vec![
        (format!("{BASE}/vocab/core"), true),
        (format!("{BASE}/vocab/applicator"), true),
        (format!("{BASE}/vocab/unevaluated"), true),
        (format!("{BASE}/vocab/validation"), true),
        (format!("{BASE}/vocab/meta-data"), false),
        (format!("{BASE}/vocab/format-annotation"), false),
        (format!("{BASE}/vocab/content"), false),
    ]
}

fn object_type() -> TypeSet {
    TypeSet::from(PrimitiveType::Object)
}
fn array_type() -> TypeSet {
    TypeSet::from(PrimitiveType::Array)
}
fn string_type() -> TypeSet {
    TypeSet::from(PrimitiveType::String)
}
fn number_type() -> TypeSet {
    TypeSet::from(PrimitiveType::Number) | TypeSet::from(PrimitiveType::Integer)
}

#[must_use]
pub fn vocabularies() -> Vec<Vocabulary> {
    vec![
        Vocabulary::new(
            format!("{BASE}/vocab/core"),
            vec![
                KeywordDef::new("$ref", TypeSet::ALL, &[], reference::ref_factory),
                KeywordDef::new("$dynamicRef", TypeSet::ALL, &[], reference::dynamic_ref_factory),
                KeywordDef::new("$defs", TypeSet::ALL, &[], defs::defs_factory),
                KeywordDef::new("definitions", TypeSet::ALL, &[], defs::definitions_factory),
            ],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/applicator"),
            vec![
                KeywordDef::new("prefixItems", array_type(), &[], items::prefix_items_factory),
                KeywordDef::new("items", array_type(), &["prefixItems"], items::items_factory),
                KeywordDef::new("contains", array_type(), &["minContains", "maxContains"], contains::contains_factory),
                KeywordDef::new("properties", object_type(), &[], properties::properties_factory),
                KeywordDef::new("patternProperties", object_type(), &[], properties::pattern_properties_factory),
                KeywordDef::new(
                    "additionalProperties",
                    object_type(),
                    &["properties", "patternProperties"],
                    properties::additional_properties_factory,
                ),
                KeywordDef::new("propertyNames", object_type(), &[], properties::property_names_factory),
                KeywordDef::new("dependentSchemas", object_type(), &[], properties::dependent_schemas_factory),
                KeywordDef::new("if", TypeSet::ALL, &[], applicator::if_factory),
                KeywordDef::new("then", TypeSet::ALL, &["if"], applicator::then_factory),
                KeywordDef::new("else", TypeSet::ALL, &["if"], applicator::else_factory),
                KeywordDef::new("allOf", TypeSet::ALL, &[], applicator::all_of_factory),
                KeywordDef::new("anyOf", TypeSet::ALL, &[], applicator::any_of_factory),
                KeywordDef::new("oneOf", TypeSet::ALL, &[], applicator::one_of_factory),
                KeywordDef::new("not", TypeSet::ALL, &[], applicator::not_factory),
            ],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/unevaluated"),
            vec![
                KeywordDef::new(
                    "unevaluatedItems",
                    array_type(),
                    &["prefixItems", "items", "contains", "allOf", "anyOf", "oneOf", "if", "then", "else", "$ref", "$dynamicRef"],
                    unevaluated::unevaluated_items_factory,
                ),
                KeywordDef::new(
                    "unevaluatedProperties",
                    object_type(),
                    &[
                        "properties", "patternProperties", "additionalProperties", "dependentSchemas",
                        "allOf", "anyOf", "oneOf", "if", "then", "else", "$ref", "$dynamicRef",
                    ],
                    unevaluated::unevaluated_properties_factory,
                ),
            ],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/validation"),
            vec![
                KeywordDef::new("type", TypeSet::ALL, &[], type_enum_const::type_factory),
                KeywordDef::new("enum", TypeSet::ALL, &[], type_enum_const::enum_factory),
                KeywordDef::new("const", TypeSet::ALL, &[], type_enum_const::const_factory),
                KeywordDef::new("multipleOf", number_type(), &[], bounds::multiple_of_factory),
                KeywordDef::new("maximum", number_type(), &[], bounds::maximum_factory),
                KeywordDef::new("exclusiveMaximum", number_type(), &[], bounds::exclusive_maximum_factory),
                KeywordDef::new("minimum", number_type(), &[], bounds::minimum_factory),
                KeywordDef::new("exclusiveMinimum", number_type(), &[], bounds::exclusive_minimum_factory),
                KeywordDef::new("maxLength", string_type(), &[], length::max_length_factory),
                KeywordDef::new("minLength", string_type(), &[], length::min_length_factory),
                KeywordDef::new("pattern", string_type(), &[], length::pattern_factory),
                KeywordDef::new("maxItems", array_type(), &[], items::max_items_factory),
                KeywordDef::new("minItems", array_type(), &[], items::min_items_factory),
                KeywordDef::new("uniqueItems", array_type(), &[], items::unique_items_factory),
                KeywordDef::new("maxContains", array_type(), &[], contains::max_contains_factory),
                KeywordDef::new("minContains", array_type(), &[], contains::min_contains_factory),
                KeywordDef::new("maxProperties", object_type(), &[], object_count::max_properties_factory),
                KeywordDef::new("minProperties", object_type(), &[], object_count::min_properties_factory),
                KeywordDef::new("required", object_type(), &[], object_count::required_factory),
                KeywordDef::new("dependentRequired", object_type(), &[], object_count::dependent_required_factory),
            ],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/meta-data"),
            vec![
                KeywordDef::new("title", TypeSet::ALL, &[], metadata::title_factory),
                KeywordDef::new("description", TypeSet::ALL, &[], metadata::description_factory),
                KeywordDef::new("default", TypeSet::ALL, &[], metadata::default_factory),
                KeywordDef::new("deprecated", TypeSet::ALL, &[], metadata::deprecated_factory),
                KeywordDef::new("readOnly", TypeSet::ALL, &[], metadata::read_only_factory),
                KeywordDef::new("writeOnly", TypeSet::ALL, &[], metadata::write_only_factory),
                KeywordDef::new("examples", TypeSet::ALL, &[], metadata::examples_factory),
            ],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/format-annotation"),
            vec![KeywordDef::new("format", string_type(), &[], format::format_factory)],
        ),
        Vocabulary::new(
            format!("{BASE}/vocab/content"),
            vec![
                KeywordDef::new("contentEncoding", string_type(), &[], metadata::content_encoding_factory),
                KeywordDef::new("contentMediaType", string_type(), &[], metadata::content_media_type_factory),
                KeywordDef::new("contentSchema", string_type(), &[], metadata::content_schema_factory),
            ],
        ),
    ]
}
