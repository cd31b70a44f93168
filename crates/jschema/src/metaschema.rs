//! Metaschemas: the vocabulary sets a schema document's `$schema` opts into.
use jschema_referencing::Uri;

/// A bootstrapped metaschema: which vocabularies (and whether each is required) a
/// schema naming this metaschema's URI as its `$schema` gets compiled with.
#[derive(Debug, Clone)]
pub struct Metaschema {
    pub uri: Uri,
    /// `(vocabulary URI, required)` pairs, in the order the metaschema's own
    /// `$vocabulary` map lists them. An unknown vocabulary marked `required: true` is a
    /// compile-time error; marked `false`, it is silently skipped.
    pub vocabularies: Vec<(String, bool)>,
}

impl Metaschema {
    #[must_use]
    pub fn new(uri: Uri, vocabularies: Vec<(String, bool)>) -> Self {
        Metaschema { uri, vocabularies }
    }
}
