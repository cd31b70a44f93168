//! Normalized, RFC-3986 URIs used as schema and resource identifiers.
use std::fmt;

use crate::error::UriError;

/// An absolute or relative URI, wrapping [`url::Url`] for parsing and normalization.
///
/// Unlike a bare `url::Url`, [`Uri`] distinguishes a URI with an empty fragment
/// (`http://example.com#`) from one with none at all, which JSON Schema's `$id`/`$ref`
/// resolution cares about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(url::Url);

impl Uri {
    /// Parse `input` as an absolute URI.
    ///
    /// # Errors
    ///
    /// Returns [`UriError`] if `input` cannot be parsed as a URI.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        Ok(Uri(url::Url::parse(input)?))
    }

    /// Resolve `reference` (which may itself be relative) against `self` as a base.
    ///
    /// # Errors
    ///
    /// Returns [`UriError`] if the combined reference cannot be parsed.
    pub fn join(&self, reference: &str) -> Result<Self, UriError> {
        Ok(Uri(self.0.join(reference)?))
    }

    /// Whether this URI carries an explicit scheme (always true once parsed by `url`,
    /// kept for parity with the language-neutral validation surface described in the spec).
    #[must_use]
    pub fn has_scheme(&self) -> bool {
        !self.0.scheme().is_empty()
    }

    /// Whether this URI carries a fragment component (including an empty one, `#`).
    #[must_use]
    pub fn has_fragment(&self) -> bool {
        self.0.fragment().is_some()
    }

    /// The fragment component, if any, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.0.fragment()
    }

    /// A URI is considered normalized here if re-parsing its string form is idempotent,
    /// i.e. `url`'s own normalization (case-folding the scheme/host, resolving `.`/`..`
    /// segments) already settled it.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        url::Url::parse(self.0.as_str())
            .map(|reparsed| reparsed.as_str() == self.0.as_str())
            .unwrap_or(false)
    }

    /// The path component.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Split off the fragment, returning the base URI and the (possibly empty) fragment text.
    #[must_use]
    pub fn split(&self) -> (Uri, Option<String>) {
        let fragment = self.0.fragment().map(str::to_string);
        let mut base = self.0.clone();
        base.set_fragment(None);
        (Uri(base), fragment)
    }

    /// Return a copy of this URI with its fragment removed.
    #[must_use]
    pub fn without_fragment(&self) -> Self {
        let mut base = self.0.clone();
        base.set_fragment(None);
        Uri(base)
    }

    /// Validate this URI as a directory-mount base: absolute, normalized, fragmentless,
    /// and path ending in `/`.
    ///
    /// # Errors
    ///
    /// Returns [`UriError`] describing which constraint was violated.
    pub fn validate_as_mount_base(&self) -> Result<(), UriError> {
        if !self.has_scheme() {
            return Err(UriError::MissingScheme {
                uri: self.to_string(),
            });
        }
        if self.has_fragment() {
            return Err(UriError::UnexpectedFragment {
                uri: self.to_string(),
            });
        }
        if !self.path().ends_with('/') {
            return Err(UriError::BaseNotDirectoryShaped {
                uri: self.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl From<url::Url> for Uri {
    fn from(url: url::Url) -> Self {
        Uri(url)
    }
}

impl From<Uri> for url::Url {
    fn from(uri: Uri) -> Self {
        uri.0
    }
}

#[cfg(test)]
mod tests {
    use super::Uri;

    #[test]
    fn mount_base_requires_trailing_slash() {
        let uri = Uri::parse("https://example.com/schemas").unwrap();
        assert!(uri.validate_as_mount_base().is_err());
        let uri = Uri::parse("https://example.com/schemas/").unwrap();
        assert!(uri.validate_as_mount_base().is_ok());
    }

    #[test]
    fn mount_base_rejects_fragment() {
        let uri = Uri::parse("https://example.com/schemas/#frag").unwrap();
        assert!(uri.validate_as_mount_base().is_err());
    }

    #[test]
    fn join_resolves_relative_references() {
        let base = Uri::parse("https://example.com/a/b.json").unwrap();
        let joined = base.join("c.json").unwrap();
        assert_eq!(joined.to_string(), "https://example.com/a/c.json");
    }

    #[test]
    fn split_separates_fragment() {
        let uri = Uri::parse("https://example.com/a.json#/defs/x").unwrap();
        let (base, fragment) = uri.split();
        assert_eq!(base.to_string(), "https://example.com/a.json");
        assert_eq!(fragment.as_deref(), Some("/defs/x"));
    }
}
