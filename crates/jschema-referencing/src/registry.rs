//! A registry of JSON resources addressable by URI, with optional disk-backed mounts.
use std::{fs, path::PathBuf};

use ahash::AHashMap;
use serde_json::Value;

use crate::{error::ReferencingError, uri::Uri};

/// A directory-backed or in-memory collection of JSON resources, keyed by URI.
///
/// Mirrors the catalogue's `_directories`/in-memory resource bookkeeping: resources can be
/// inserted directly (`add_resource`), or discovered lazily from a mounted directory
/// (`add_directory` + `load_json`).
#[derive(Debug, Default)]
pub struct Registry {
    directories: Vec<(Uri, PathBuf)>,
    resources: AHashMap<Uri, Value>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a base URI-to-directory mapping.
    ///
    /// `base_uri` must be absolute, normalized, fragmentless, and path-end with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ReferencingError`] if `base_uri` fails validation or `base_dir` is not a
    /// directory on disk.
    pub fn add_directory(
        &mut self,
        base_uri: Uri,
        base_dir: impl Into<PathBuf>,
    ) -> Result<(), ReferencingError> {
        base_uri.validate_as_mount_base()?;
        let base_dir = base_dir.into();
        if !base_dir.is_dir() {
            return Err(ReferencingError::Io {
                uri: base_uri.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("'{}' is not a directory", base_dir.display()),
                ),
            });
        }
        self.directories.push((base_uri, base_dir));
        Ok(())
    }

    /// Insert a resource directly into the registry, bypassing disk loading.
    pub fn add_resource(&mut self, uri: Uri, contents: Value) {
        self.resources.insert(uri, contents);
    }

    /// Remove a previously inserted resource.
    pub fn remove_resource(&mut self, uri: &Uri) {
        self.resources.remove(uri);
    }

    /// Fetch an already-registered in-memory resource, if any.
    #[must_use]
    pub fn get_resource(&self, uri: &Uri) -> Option<&Value> {
        self.resources.get(uri)
    }

    /// Load the JSON document identified by `uri`.
    ///
    /// First consults in-memory resources, then the longest matching directory mount,
    /// probing the literal remainder path and then the remainder with a `.json` suffix.
    ///
    /// # Errors
    ///
    /// Returns [`ReferencingError::Unretrievable`] if no resource or mount can satisfy `uri`,
    /// [`ReferencingError::Io`] if the matched file cannot be read, or
    /// [`ReferencingError::InvalidJson`] if it is not valid JSON.
    pub fn load_json(&self, uri: &Uri) -> Result<Value, ReferencingError> {
        if let Some(value) = self.resources.get(uri) {
            return Ok(value.clone());
        }

        let uri_str = uri.to_string();
        let mut candidates: Vec<&(Uri, PathBuf)> = self
            .directories
            .iter()
            .filter(|(base, _)| uri_str.starts_with(&base.to_string()))
            .collect();
        // Longest matching base URI wins: a deeper mount shadows its parent.
        candidates.sort_by_key(|(base, _)| std::cmp::Reverse(base.to_string().len()));

        if let Some((base, dir)) = candidates.first() {
            let remainder = &uri_str[base.to_string().len()..];
            let candidate_path = dir.join(remainder);
            if let Some(value) = try_read_json(&candidate_path)? {
                return Ok(value);
            }
            let with_suffix = dir.join(format!("{remainder}.json"));
            if let Some(value) = try_read_json(&with_suffix)? {
                return Ok(value);
            }
        }

        Err(ReferencingError::Unretrievable {
            uri: uri_str,
        })
    }
}

fn try_read_json(path: &std::path::Path) -> Result<Option<Value>, ReferencingError> {
    match fs::read_to_string(path) {
        Ok(text) => {
            let value = serde_json::from_str(&text).map_err(|source| {
                ReferencingError::InvalidJson {
                    uri: path.display().to_string(),
                    source,
                }
            })?;
            Ok(Some(value))
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ReferencingError::Io {
            uri: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::uri::Uri;
    use serde_json::json;
    use std::fs;

    #[test]
    fn in_memory_resource_is_found_before_disk() {
        let mut registry = Registry::new();
        let uri = Uri::parse("https://example.com/schema.json").unwrap();
        registry.add_resource(uri.clone(), json!({"type": "string"}));
        assert_eq!(registry.load_json(&uri).unwrap(), json!({"type": "string"}));
    }

    #[test]
    fn longest_prefix_mount_wins() {
        let dir = tempdir();
        let bar_dir = dir.join("bar");
        fs::create_dir_all(&bar_dir).unwrap();
        fs::write(dir.join("baz.json"), r#"{"from": "root"}"#).unwrap();
        fs::write(bar_dir.join("baz.json"), r#"{"from": "bar"}"#).unwrap();

        let mut registry = Registry::new();
        registry
            .add_directory(Uri::parse("https://example.com/foo/").unwrap(), &dir)
            .unwrap();
        registry
            .add_directory(Uri::parse("https://example.com/foo/bar/").unwrap(), &bar_dir)
            .unwrap();

        let resolved = registry
            .load_json(&Uri::parse("https://example.com/foo/bar/baz.json").unwrap())
            .unwrap();
        assert_eq!(resolved, json!({"from": "bar"}));
    }

    #[test]
    fn probes_json_suffix_second() {
        let dir = tempdir();
        fs::write(dir.join("schema.json"), r#"{"type": "object"}"#).unwrap();

        let mut registry = Registry::new();
        registry
            .add_directory(Uri::parse("https://example.com/").unwrap(), &dir)
            .unwrap();

        let resolved = registry
            .load_json(&Uri::parse("https://example.com/schema").unwrap())
            .unwrap();
        assert_eq!(resolved, json!({"type": "object"}));
    }

    #[test]
    fn unknown_uri_is_unretrievable() {
        let registry = Registry::new();
        let err = registry
            .load_json(&Uri::parse("https://example.com/missing.json").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("is not present"));
    }

    fn tempdir() -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!(
            "jschema-referencing-test-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
