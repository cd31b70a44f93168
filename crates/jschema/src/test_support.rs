//! Shared helpers for keyword unit tests: compile a one-off schema against the
//! built-in 2020-12 draft and report whether an instance validates.
#![cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

use crate::Catalogue;

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Merge `keyword_json` (an object of one or more keyword/value pairs) into a schema
/// tagged with the 2020-12 metaschema, compile it, and evaluate `instance` against it.
#[must_use]
pub fn validates(keyword_json: Value, instance: Value) -> bool {
    let catalogue = Catalogue::new(&["2020-12"], false).unwrap();
    let session = catalogue.session(None).unwrap();
    let mut schema = serde_json::Map::new();
    schema.insert(
        "$schema".to_string(),
        Value::String("https://json-schema.org/draft/2020-12/schema".to_string()),
    );
    schema.extend(keyword_json.as_object().unwrap().clone());

    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = jschema_referencing::Uri::parse(&format!("https://example.com/test-{n}")).unwrap();
    session.catalogue().add_schema(uri.clone(), Value::Object(schema));
    let compiled = session.catalogue().get_schema(&uri, session.tag()).unwrap();
    let evaluator = crate::evaluator::Evaluator::new(session.catalogue(), session.tag());
    evaluator
        .evaluate(&compiled, &instance, jschema_referencing::JsonPointer::root())
        .unwrap()
        .valid
}
