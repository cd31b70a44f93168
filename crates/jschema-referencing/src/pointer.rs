//! JSON Pointer ([RFC 6901]) parsing, encoding and evaluation.
//!
//! [RFC 6901]: https://datatracker.ietf.org/doc/html/rfc6901
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

use crate::error::JsonPointerError;

/// A JSON Pointer as a sequence of decoded tokens.
///
/// Tokens are stored already unescaped (`~1` -> `/`, `~0` -> `~`); [`JsonPointer::to_string`]
/// re-escapes them when rendering the pointer back to its wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer(Vec<String>);

const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`');

impl JsonPointer {
    /// The root pointer (`""`), pointing at the whole document.
    #[must_use]
    pub fn root() -> Self {
        JsonPointer(Vec::new())
    }

    /// Build a pointer from already-decoded tokens.
    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        JsonPointer(tokens.into_iter().map(Into::into).collect())
    }

    /// Parse a pointer in its standard textual form (`/a/b/0`).
    ///
    /// # Errors
    ///
    /// Returns [`JsonPointerError`] if a `~` escape is not followed by `0` or `1`.
    pub fn parse(pointer: &str) -> Result<Self, JsonPointerError> {
        if pointer.is_empty() {
            return Ok(JsonPointer::root());
        }
        let Some(rest) = pointer.strip_prefix('/') else {
            // Non-conformant pointers (missing leading '/') are treated as a single token,
            // matching the permissive behaviour jschon's anchor-vs-pointer disambiguation relies on.
            return Ok(JsonPointer(vec![pointer.to_string()]));
        };
        let mut tokens = Vec::new();
        for raw in rest.split('/') {
            tokens.push(decode_token(raw, pointer)?);
        }
        Ok(JsonPointer(tokens))
    }

    /// Parse a pointer from the percent-encoded form used in URI fragments (`#/a%20b`).
    ///
    /// # Errors
    ///
    /// Returns [`JsonPointerError`] if the percent-encoding or `~` escaping is malformed.
    pub fn parse_uri_fragment(fragment: &str) -> Result<Self, JsonPointerError> {
        let decoded = percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|_| JsonPointerError::InvalidPercentEncoding {
                pointer: fragment.to_string(),
            })?;
        Self::parse(&decoded)
    }

    /// Whether this is the root pointer.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrowed tokens, in order.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Append one more token, returning a new pointer (the original is left untouched).
    #[must_use]
    pub fn push(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.0.clone();
        tokens.push(token.into());
        JsonPointer(tokens)
    }

    /// Evaluate this pointer against `value`, descending one token at a time.
    ///
    /// # Errors
    ///
    /// Returns [`JsonPointerError::NotFound`] if any step does not exist, or
    /// [`JsonPointerError::InvalidIndex`] if an array step is not a valid index.
    pub fn resolve<'v>(&self, value: &'v Value) -> Result<&'v Value, JsonPointerError> {
        let mut current = value;
        for token in &self.0 {
            current = match current {
                Value::Object(map) => map.get(token).ok_or_else(|| JsonPointerError::NotFound {
                    pointer: self.to_string(),
                })?,
                Value::Array(items) => {
                    let index: usize =
                        token
                            .parse()
                            .map_err(|_| JsonPointerError::InvalidIndex {
                                pointer: self.to_string(),
                                token: token.clone(),
                            })?;
                    items.get(index).ok_or_else(|| JsonPointerError::NotFound {
                        pointer: self.to_string(),
                    })?
                }
                _ => {
                    return Err(JsonPointerError::NotFound {
                        pointer: self.to_string(),
                    })
                }
            };
        }
        Ok(current)
    }

    /// Render this pointer as a URI fragment (percent-encoded, with the leading `#` omitted).
    #[must_use]
    pub fn to_uri_fragment(&self) -> String {
        let plain = self.to_string();
        utf8_percent_encode(&plain, FRAGMENT).to_string()
    }
}

fn decode_token(raw: &str, whole: &str) -> Result<String, JsonPointerError> {
    if !raw.contains('~') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => {
                    return Err(JsonPointerError::InvalidEscape {
                        pointer: whole.to_string(),
                    })
                }
            }
        } else {
            out.push(ch);
        }
    }
    Ok(out)
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_str("/")?;
            for ch in token.chars() {
                match ch {
                    '~' => f.write_str("~0")?,
                    '/' => f.write_str("~1")?,
                    _ => f.write_char(ch)?,
                }
            }
        }
        Ok(())
    }
}

use std::fmt::Write as _;

#[cfg(test)]
mod tests {
    use super::JsonPointer;
    use serde_json::json;

    #[test]
    fn round_trips_escaped_tokens() {
        for token in ["/", "~", "a/b~c"] {
            let pointer = JsonPointer::from_tokens([token]);
            let text = pointer.to_string();
            let reparsed = JsonPointer::parse(&text).unwrap();
            assert_eq!(reparsed.tokens(), &[token.to_string()]);
        }
    }

    #[test]
    fn resolves_nested_paths() {
        let value = json!({"a": {"b": [1, 2, {"c": "x"}]}});
        let pointer = JsonPointer::parse("/a/b/2/c").unwrap();
        assert_eq!(pointer.resolve(&value).unwrap(), "x");
    }

    #[test]
    fn root_pointer_resolves_to_whole_document() {
        let value = json!({"a": 1});
        assert_eq!(JsonPointer::root().resolve(&value).unwrap(), &value);
    }

    #[test]
    fn missing_path_is_not_found() {
        let value = json!({"a": 1});
        let pointer = JsonPointer::parse("/b").unwrap();
        assert!(pointer.resolve(&value).is_err());
    }

    #[test]
    fn uri_fragment_round_trip() {
        let pointer = JsonPointer::from_tokens(["a b", "c"]);
        let fragment = pointer.to_uri_fragment();
        let reparsed = JsonPointer::parse_uri_fragment(&fragment).unwrap();
        assert_eq!(reparsed, pointer);
    }
}
