//! The catalogue: a process- or application-wide registry of schema resources,
//! vocabularies, metaschemas and format validators, partitioned into sessions.
use std::sync::Arc;

use ahash::AHashMap;
use jschema_referencing::{JsonPointer, ReferencingError, Registry, Uri};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::compiler;
use crate::drafts::Draft;
use crate::error::CatalogueError;
use crate::metaschema::Metaschema;
use crate::schema::Schema;
use crate::vocabulary::{KeywordDef, Vocabulary};

/// A session tag partitioning the catalogue's compiled-schema cache. Two callers using
/// different tags never see each other's cached schemas, so a caller that mutates a
/// schema resource and recompiles cannot observe another caller's stale cache entry.
pub type SessionTag = Arc<str>;

const META_SESSION: &str = "__meta__";

pub type FormatValidator = Box<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Default)]
struct CatalogueState {
    registry: Registry,
    vocabularies: AHashMap<String, Vocabulary>,
    metaschemas: AHashMap<String, Metaschema>,
    format_validators: AHashMap<String, FormatValidator>,
    /// session tag -> (absolute URI, including any fragment, -> compiled schema)
    cache: AHashMap<SessionTag, AHashMap<String, Schema>>,
}

/// The catalogue. Mutations (adding directories, vocabularies, metaschemas, schemas,
/// sessions) are serialized behind a single lock; schema compilation and evaluation
/// only need read access once the relevant entries exist, so concurrent evaluation
/// against an already-warm catalogue does not contend.
pub struct Catalogue {
    state: RwLock<CatalogueState>,
}

static DEFAULT_CATALOGUE: OnceCell<Arc<Catalogue>> = OnceCell::new();

impl Catalogue {
    /// Build a catalogue bootstrapped with the built-in vocabularies, metaschemas and
    /// format validators for `versions` (e.g. `&["2019-09", "2020-12"]`).
    ///
    /// If `default` is true, this instance becomes [`Catalogue::get_default`]'s answer
    /// (the first catalogue built with `default: true` wins; later calls are no-ops).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if `versions` names an unrecognized draft, or if a
    /// bundled metaschema fails to validate against itself.
    pub fn new(versions: &[&str], default: bool) -> Result<Arc<Catalogue>, CatalogueError> {
        let catalogue = Arc::new(Catalogue {
            state: RwLock::new(CatalogueState::default()),
        });
        {
            let mut state = catalogue.state.write();
            state.cache.insert(Arc::from(META_SESSION), AHashMap::new());
        }
        for name in versions {
            let draft = Draft::from_name(name).ok_or_else(|| CatalogueError::UnknownVersion {
                version: (*name).to_string(),
            })?;
            catalogue.bootstrap_draft(draft)?;
        }
        if default {
            let _ = DEFAULT_CATALOGUE.set(Arc::clone(&catalogue));
        }
        Ok(catalogue)
    }

    /// The process-wide default catalogue, if one has been created with `default: true`.
    #[must_use]
    pub fn get_default() -> Option<Arc<Catalogue>> {
        DEFAULT_CATALOGUE.get().cloned()
    }

    fn bootstrap_draft(&self, draft: Draft) -> Result<(), CatalogueError> {
        for vocabulary in draft.default_vocabularies() {
            self.create_vocabulary(vocabulary)?;
        }
        for (uri, document) in draft.metaschema_documents() {
            let uri = Uri::parse(uri)?;
            self.state.write().registry.add_resource(uri.clone(), (*document).clone());
        }
        let vocabularies = draft.default_vocabulary_declarations();
        self.create_metaschema(
            Uri::parse(draft.metaschema_uri())?,
            vocabularies,
            META_SESSION,
        )?;
        for (name, validator) in crate::drafts::built_in_formats() {
            self.add_format_validators([(name, validator)]);
        }
        Ok(())
    }

    /// Register a directory mount so bare URIs beneath `base_uri` resolve to files
    /// under `base_dir` on disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if `base_uri` is not mount-shaped or `base_dir` is
    /// not a directory.
    pub fn add_directory(
        &self,
        base_uri: Uri,
        base_dir: impl Into<std::path::PathBuf>,
    ) -> Result<(), CatalogueError> {
        self.state
            .write()
            .registry
            .add_directory(base_uri, base_dir)
            .map_err(Into::into)
    }

    /// Register a vocabulary's keyword set, making it available to any metaschema that
    /// subsequently opts into its URI.
    ///
    /// # Errors
    ///
    /// Currently infallible; returns `Result` for symmetry with the rest of the
    /// catalogue API and room to validate keyword definitions in the future.
    pub fn create_vocabulary(&self, vocabulary: Vocabulary) -> Result<(), CatalogueError> {
        self.state.write().vocabularies.insert(vocabulary.uri.clone(), vocabulary);
        Ok(())
    }

    /// Borrow a previously registered vocabulary's keyword table.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::UnknownVocabulary`] if no vocabulary has been
    /// registered under `uri`.
    pub fn enabled_keywords(
        &self,
        vocabulary_uris: &[(String, bool)],
    ) -> Result<AHashMap<&'static str, KeywordDef>, CatalogueError> {
        let state = self.state.read();
        let mut keywords = AHashMap::new();
        for (uri, required) in vocabulary_uris {
            match state.vocabularies.get(uri) {
                Some(vocabulary) => {
                    for (name, def) in &vocabulary.keywords {
                        keywords.insert(*name, def.clone());
                    }
                }
                None if *required => {
                    return Err(CatalogueError::UnknownVocabulary { uri: uri.clone() })
                }
                None => {}
            }
        }
        Ok(keywords)
    }

    /// Bootstrap a metaschema: validate `document` against itself (the metaschema must
    /// be a valid instance of the vocabulary set it declares) and register it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::InvalidMetaschema`] if `document` does not validate
    /// against its own declared vocabulary set.
    pub fn create_metaschema(
        &self,
        uri: Uri,
        vocabularies: Vec<(String, bool)>,
        session: &str,
    ) -> Result<(), CatalogueError> {
        let metaschema = Metaschema::new(uri.clone(), vocabularies);
        self.state
            .write()
            .metaschemas
            .insert(metaschema.uri.to_string(), metaschema.clone());
        if let Some(document) = self.state.read().registry.get_resource(&uri).cloned() {
            let session: SessionTag = Arc::from(session);
            self.cache_document(&uri, &document, session.clone())?;
            let schema = self
                .state
                .read()
                .cache
                .get(&session)
                .and_then(|c| c.get(&uri.to_string()))
                .cloned()
                .ok_or_else(|| CatalogueError::NotASchema {
                    uri: uri.to_string(),
                })?;
            let outcome = crate::evaluator::Evaluator::new(self, session).evaluate(
                &schema,
                &document,
                JsonPointer::root(),
            )?;
            if !outcome.valid {
                return Err(CatalogueError::InvalidMetaschema {
                    uri: uri.to_string(),
                    errors: outcome
                        .flatten_errors()
                        .into_iter()
                        .map(|(path, msg)| (path.to_string(), msg))
                        .collect(),
                });
            }
        }
        Ok(())
    }

    /// Register one or more named format validators.
    pub fn add_format_validators(
        &self,
        validators: impl IntoIterator<Item = (&'static str, FormatValidator)>,
    ) {
        let mut state = self.state.write();
        for (name, validator) in validators {
            state.format_validators.insert(name.to_string(), validator);
        }
    }

    /// Run a registered format validator against `instance`, if one is registered.
    /// Unregistered formats are treated as vacuously valid, matching the keyword's
    /// annotation-only default.
    #[must_use]
    pub fn run_format(&self, attribute: &str, instance: &Value) -> Option<bool> {
        let state = self.state.read();
        state.format_validators.get(attribute).map(|f| f(instance))
    }

    /// Insert a schema resource directly (bypassing directory mounts).
    pub fn add_schema(&self, uri: Uri, document: Value) {
        self.state.write().registry.add_resource(uri, document);
    }

    /// Remove a previously inserted schema resource.
    pub fn del_schema(&self, uri: &Uri) {
        self.state.write().registry.remove_resource(uri);
    }

    /// Fetch (compiling and caching on first use) the schema identified by `uri`
    /// within `session`.
    ///
    /// Lookup order mirrors the catalogue's bootstrap ordering: the session's own
    /// cache is consulted first, then the eternal `__meta__` session (so application
    /// schemas transparently share compiled metaschemas), before falling back to
    /// loading and compiling the raw document.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError`] if `uri` cannot be loaded, is not a schema, or fails
    /// to compile.
    pub fn get_schema(&self, uri: &Uri, session: SessionTag) -> Result<Schema, CatalogueError> {
        let key = uri.to_string();
        {
            let state = self.state.read();
            if let Some(schema) = state.cache.get(&session).and_then(|c| c.get(&key)) {
                return Ok(schema.clone());
            }
            if session.as_ref() != META_SESSION {
                if let Some(schema) = state.cache.get(META_SESSION).and_then(|c| c.get(&key)) {
                    return Ok(schema.clone());
                }
            }
        }
        let (base, _fragment) = uri.split();
        let document = self.state.read().registry.load_json(&base)?;
        self.cache_document(&base, &document, session.clone())?;
        let state = self.state.read();
        state
            .cache
            .get(&session)
            .and_then(|c| c.get(&key))
            .cloned()
            .ok_or(CatalogueError::NotASchema { uri: key })
    }

    fn cache_document(
        &self,
        base_uri: &Uri,
        document: &Value,
        session: SessionTag,
    ) -> Result<(), CatalogueError> {
        let draft = self.draft_for(document)?;
        let output = compiler::compile_document(self, document, base_uri.clone(), draft, session.clone())?;
        let mut state = self.state.write();
        let bucket = state.cache.entry(session).or_default();
        for (uri, schema) in output.registrations {
            bucket.entry(uri).or_insert(schema);
        }
        bucket.entry(base_uri.to_string()).or_insert(output.root);
        Ok(())
    }

    fn draft_for(&self, document: &Value) -> Result<Draft, CatalogueError> {
        let schema_uri = document
            .get("$schema")
            .and_then(Value::as_str)
            .unwrap_or_else(|| Draft::Draft202012.metaschema_uri());
        let state = self.state.read();
        let metaschema = state
            .metaschemas
            .get(schema_uri.trim_end_matches('#'))
            .ok_or_else(|| CatalogueError::Referencing(ReferencingError::Unretrievable {
                uri: schema_uri.to_string(),
            }))?;
        drop(state);
        for draft in [Draft::Draft201909, Draft::Draft202012] {
            if draft.metaschema_uri() == metaschema.uri.to_string() {
                return Ok(draft);
            }
        }
        Ok(Draft::Draft202012)
    }

    #[must_use]
    pub(crate) fn metaschema_vocabularies(&self, uri: &Uri) -> Option<Vec<(String, bool)>> {
        self.state
            .read()
            .metaschemas
            .get(&uri.to_string())
            .map(|m| m.vocabularies.clone())
    }

    /// Open a new session, identified by `tag` (a fresh random UUID if `None`).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::SessionInUse`] if `tag` is already live.
    pub fn session(self: &Arc<Self>, tag: Option<&str>) -> Result<SessionGuard, CatalogueError> {
        let tag: SessionTag = match tag {
            Some(tag) => Arc::from(tag),
            None => Arc::from(Uuid::new_v4().to_string().as_str()),
        };
        let mut state = self.state.write();
        if state.cache.contains_key(&tag) {
            return Err(CatalogueError::SessionInUse);
        }
        state.cache.insert(tag.clone(), AHashMap::new());
        drop(state);
        Ok(SessionGuard {
            catalogue: Arc::clone(self),
            tag,
        })
    }

    fn release_session(&self, tag: &SessionTag) {
        self.state.write().cache.remove(tag);
    }
}

/// A RAII handle on a catalogue session: the session's schema cache is released when
/// this guard is dropped.
pub struct SessionGuard {
    catalogue: Arc<Catalogue>,
    tag: SessionTag,
}

impl SessionGuard {
    #[must_use]
    pub fn tag(&self) -> SessionTag {
        self.tag.clone()
    }

    #[must_use]
    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.catalogue.release_session(&self.tag);
    }
}
