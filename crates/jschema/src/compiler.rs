//! Schema compilation: turns a raw JSON value into a [`Schema`], resolving `$id`,
//! `$anchor`/`$dynamicAnchor`, the enabled vocabulary's keyword set, and each
//! keyword's dependency order.
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use ahash::AHashMap;
use jschema_referencing::{JsonPointer, Uri};
use serde_json::Value;

use crate::catalogue::{Catalogue, SessionTag};
use crate::drafts::Draft;
use crate::error::CompileError;
use crate::schema::{CompiledKeyword, Schema, SchemaObject};
use crate::vocabulary::KeywordDef;

/// Per-compile-call state threaded through a schema document's recursive compilation.
///
/// Cloning is shallow: `keyword_defs` and `registrations` are reference-counted, so a
/// clone taken to descend into a subschema shares the same enabled-keyword table and
/// accumulates into the same flat registration list as its parent.
#[derive(Clone)]
pub struct CompileContext<'c> {
    pub catalogue: &'c Catalogue,
    pub session: SessionTag,
    pub draft: Draft,
    /// The innermost schema resource's base URI (updated whenever a nested `$id` is
    /// seen); used to resolve `$ref`/`$anchor`/`$dynamicAnchor`.
    pub base_uri: Uri,
    /// The URI of the document originally passed to [`compile_document`], fragmentless.
    document_base: Uri,
    /// Pointer from the document root to the schema object currently being compiled.
    pointer: JsonPointer,
    keyword_defs: Arc<AHashMap<&'static str, KeywordDef>>,
    registrations: Rc<RefCell<Vec<(String, Schema)>>>,
}

/// The result of compiling a whole document: the schema reachable at its own base URI,
/// plus every schema (including nested ones) reachable via JSON Pointer or anchor,
/// flattened into a flat URI -> schema list the catalogue merges into its cache.
pub struct CompileOutput {
    pub root: Schema,
    pub registrations: Vec<(String, Schema)>,
}

/// Compile `document` (the JSON value loaded for `base_uri`) into a [`CompileOutput`].
///
/// # Errors
///
/// Returns [`CompileError`] if `document`'s declared `$schema` is unrecognized, a
/// keyword's value is malformed, or keyword dependencies are cyclic. Returns it wrapped
/// in [`crate::error::CatalogueError`] at the catalogue boundary for metaschema/vocabulary
/// lookup failures.
pub fn compile_document(
    catalogue: &Catalogue,
    document: &Value,
    base_uri: Uri,
    draft: Draft,
    session: SessionTag,
) -> Result<CompileOutput, crate::error::CatalogueError> {
    let keyword_defs = initial_keyword_defs(catalogue, document, draft)?;
    let ctx = CompileContext {
        catalogue,
        session,
        draft,
        base_uri: base_uri.clone(),
        document_base: base_uri,
        pointer: JsonPointer::root(),
        keyword_defs: Arc::new(keyword_defs),
        registrations: Rc::new(RefCell::new(Vec::new())),
    };
    let root = compile_schema_value(document, &ctx)?;
    let registrations = ctx.registrations.borrow().clone();
    Ok(CompileOutput { root, registrations })
}

fn initial_keyword_defs(
    catalogue: &Catalogue,
    document: &Value,
    draft: Draft,
) -> Result<AHashMap<&'static str, KeywordDef>, crate::error::CatalogueError> {
    let schema_uri = document
        .get("$schema")
        .and_then(Value::as_str)
        .unwrap_or_else(|| draft.metaschema_uri());
    let uri = Uri::parse(schema_uri)?;
    let vocabularies = catalogue.metaschema_vocabularies(&uri).ok_or_else(|| {
        crate::error::CatalogueError::Compile(CompileError::UnrecognizedMetaschema {
            uri: schema_uri.to_string(),
        })
    })?;
    Ok(catalogue.enabled_keywords(&vocabularies)?)
}

impl<'c> CompileContext<'c> {
    /// Compile a subschema reached from the current schema object by one more pointer
    /// token (a property name, array index, or keyword name).
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] under the same conditions as [`compile_document`].
    pub fn compile_subschema(&self, value: &Value, token: &str) -> Result<Schema, CompileError> {
        let mut child = self.clone();
        child.pointer = self.pointer.push(token);
        compile_schema_value(value, &child)
    }
}

fn compile_schema_value(value: &Value, ctx: &CompileContext<'_>) -> Result<Schema, CompileError> {
    let schema = match value {
        Value::Bool(b) => Schema::Boolean(*b),
        Value::Object(obj) => {
            let mut resource_ctx = ctx.clone();
            let mut canonical_uri = None;
            if let Some(id) = obj.get("$id").and_then(Value::as_str) {
                let resolved = resource_ctx.base_uri.join(id)?;
                resource_ctx.base_uri = resolved.clone();
                canonical_uri = Some(resolved);
            }
            let anchor_uri = obj
                .get("$anchor")
                .and_then(Value::as_str)
                .map(|anchor| format!("{}#{anchor}", resource_ctx.base_uri.without_fragment()));
            let mut dynamic_anchor = obj.get("$dynamicAnchor").and_then(Value::as_str);
            // 2019-09's `$recursiveAnchor: true` is `$dynamicAnchor`'s predecessor: it
            // marks a schema resource as a landing site for `$recursiveRef`, which is
            // modeled as a `$dynamicRef` targeting the empty anchor name.
            if dynamic_anchor.is_none() && obj.get("$recursiveAnchor") == Some(&Value::Bool(true)) {
                dynamic_anchor = Some("");
            }
            let dynamic_anchor_uri = dynamic_anchor
                .filter(|a| !a.is_empty())
                .map(|anchor| format!("{}#{anchor}", resource_ctx.base_uri.without_fragment()));

            let present: Vec<&'static str> = resource_ctx
                .keyword_defs
                .keys()
                .filter(|name| obj.contains_key(**name))
                .copied()
                .collect();
            let ordered = topological_order(&present, &resource_ctx.keyword_defs)?;

            let mut keywords = Vec::with_capacity(ordered.len());
            for name in ordered {
                let def = &resource_ctx.keyword_defs[name];
                let mut keyword_ctx = resource_ctx.clone();
                keyword_ctx.pointer = resource_ctx.pointer.push(name);
                let keyword = (def.factory)(&obj[name], &mut keyword_ctx)?;
                keywords.push(CompiledKeyword { name, applies_to: def.applies_to, keyword });
            }

            let object = Schema::Object(Arc::new(SchemaObject {
                canonical_uri: canonical_uri.clone(),
                metaschema_uri: schema_metaschema_uri(ctx, obj)?,
                draft: ctx.draft,
                dynamic_anchor: dynamic_anchor.map(str::to_string),
                keywords,
            }));
            if let Some(uri) = canonical_uri {
                push_registration(ctx, uri.to_string(), object.clone());
            }
            if let Some(uri) = anchor_uri {
                push_registration(ctx, uri, object.clone());
            }
            if let Some(uri) = dynamic_anchor_uri {
                push_registration(ctx, uri, object.clone());
            }
            object
        }
        _ => {
            return Err(CompileError::InvalidKeywordValue {
                keyword: "$schema",
                value: value.clone(),
                reason: "a schema must be a boolean or an object".into(),
            })
        }
    };

    push_registration(
        ctx,
        format!("{}#{}", ctx.document_base, ctx.pointer.to_uri_fragment()),
        schema.clone(),
    );
    Ok(schema)
}

fn schema_metaschema_uri(ctx: &CompileContext<'_>, obj: &serde_json::Map<String, Value>) -> Result<Uri, CompileError> {
    match obj.get("$schema").and_then(Value::as_str) {
        Some(uri) => Ok(Uri::parse(uri)?),
        None => Ok(Uri::parse(ctx.draft.metaschema_uri())?),
    }
}

fn push_registration(ctx: &CompileContext<'_>, uri: String, schema: Schema) {
    ctx.registrations.borrow_mut().push((uri, schema));
}

fn topological_order(
    present: &[&'static str],
    defs: &AHashMap<&'static str, KeywordDef>,
) -> Result<Vec<&'static str>, CompileError> {
    let mut ordered = Vec::with_capacity(present.len());
    let mut visited: AHashMap<&'static str, VisitState> = AHashMap::new();

    fn visit(
        name: &'static str,
        present: &[&'static str],
        defs: &AHashMap<&'static str, KeywordDef>,
        visited: &mut AHashMap<&'static str, VisitState>,
        ordered: &mut Vec<&'static str>,
    ) -> Result<(), CompileError> {
        match visited.get(name) {
            Some(VisitState::Done) => return Ok(()),
            Some(VisitState::InProgress) => {
                return Err(CompileError::CyclicDependency {
                    keywords: vec![name],
                })
            }
            None => {}
        }
        visited.insert(name, VisitState::InProgress);
        if let Some(def) = defs.get(name) {
            for dep in def.depends_on {
                if present.contains(dep) {
                    visit(*dep, present, defs, visited, ordered)?;
                }
            }
        }
        visited.insert(name, VisitState::Done);
        ordered.push(name);
        Ok(())
    }

    for name in present {
        visit(*name, present, defs, &mut visited, &mut ordered)?;
    }
    Ok(ordered)
}

#[derive(Clone, Copy)]
enum VisitState {
    InProgress,
    Done,
}
