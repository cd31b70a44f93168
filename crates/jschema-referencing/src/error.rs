use core::fmt;

/// Errors that can occur while parsing or manipulating a URI.
#[derive(Debug)]
pub enum UriError {
    /// The URI could not be parsed at all.
    Parse(url::ParseError),
    /// The URI lacks a scheme where one is required.
    MissingScheme { uri: String },
    /// The URI carries a fragment where one is disallowed.
    UnexpectedFragment { uri: String },
    /// A base URI used for directory mounting does not end with `/`.
    BaseNotDirectoryShaped { uri: String },
}

impl fmt::Display for UriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriError::Parse(err) => write!(f, "invalid URI: {err}"),
            UriError::MissingScheme { uri } => write!(f, "URI '{uri}' has no scheme"),
            UriError::UnexpectedFragment { uri } => {
                write!(f, "URI '{uri}' must not have a fragment")
            }
            UriError::BaseNotDirectoryShaped { uri } => {
                write!(f, "base URI '{uri}' must end with '/'")
            }
        }
    }
}

impl std::error::Error for UriError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UriError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<url::ParseError> for UriError {
    fn from(err: url::ParseError) -> Self {
        UriError::Parse(err)
    }
}

/// Errors raised while decoding or evaluating a JSON Pointer.
#[derive(Debug)]
pub enum JsonPointerError {
    /// A `~` escape sequence was not followed by `0` or `1`.
    InvalidEscape { pointer: String },
    /// The pointer's percent-encoded fragment form contained invalid UTF-8.
    InvalidPercentEncoding { pointer: String },
    /// An array-index token was not a valid non-negative integer.
    InvalidIndex { pointer: String, token: String },
    /// Descending through the pointer ran off the edge of the document.
    NotFound { pointer: String },
}

impl fmt::Display for JsonPointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonPointerError::InvalidEscape { pointer } => {
                write!(f, "invalid '~' escape in pointer '{pointer}'")
            }
            JsonPointerError::InvalidPercentEncoding { pointer } => {
                write!(f, "invalid percent-encoding in pointer '{pointer}'")
            }
            JsonPointerError::InvalidIndex { pointer, token } => {
                write!(f, "invalid array index '{token}' in pointer '{pointer}'")
            }
            JsonPointerError::NotFound { pointer } => {
                write!(f, "pointer '{pointer}' does not resolve to any value")
            }
        }
    }
}

impl std::error::Error for JsonPointerError {}

/// Errors raised while resolving references against a [`crate::Registry`].
#[derive(Debug)]
pub enum ReferencingError {
    /// A resource is not present in the registry.
    Unretrievable { uri: String },
    /// A resource was found but the file could not be read from disk.
    Io {
        uri: String,
        source: std::io::Error,
    },
    /// A resource was found on disk but was not valid JSON.
    InvalidJson {
        uri: String,
        source: serde_json::Error,
    },
    /// An anchor does not exist within a particular resource.
    NoSuchAnchor { anchor: String },
    Uri(UriError),
    Pointer(JsonPointerError),
}

impl fmt::Display for ReferencingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferencingError::Unretrievable { uri } => {
                write!(f, "resource '{uri}' is not present in the registry")
            }
            ReferencingError::Io { uri, source } => {
                write!(f, "failed to read resource '{uri}': {source}")
            }
            ReferencingError::InvalidJson { uri, source } => {
                write!(f, "resource '{uri}' is not valid JSON: {source}")
            }
            ReferencingError::NoSuchAnchor { anchor } => {
                write!(f, "anchor '{anchor}' does not exist")
            }
            ReferencingError::Uri(err) => write!(f, "{err}"),
            ReferencingError::Pointer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReferencingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReferencingError::Io { source, .. } => Some(source),
            ReferencingError::InvalidJson { source, .. } => Some(source),
            ReferencingError::Uri(err) => Some(err),
            ReferencingError::Pointer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UriError> for ReferencingError {
    fn from(err: UriError) -> Self {
        ReferencingError::Uri(err)
    }
}

impl From<JsonPointerError> for ReferencingError {
    fn from(err: JsonPointerError) -> Self {
        ReferencingError::Pointer(err)
    }
}
