//! The `format` keyword: an annotation by default, promoted to an assertion when a
//! validator is registered for its name (built-in, via [`built_in_validators`], or
//! custom, via [`crate::Catalogue::add_format_validators`]).
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use email_address::EmailAddress;
use fancy_regex::Regex;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::catalogue::FormatValidator;
use crate::compiler::CompileContext;
use crate::error::{CompileError, EvalError};
use crate::keyword::{EvalContext, Keyword};
use crate::scope::Scope;

#[derive(Debug)]
pub struct FormatKeyword {
    name: String,
}

pub fn format_factory(value: &Value, _ctx: &mut CompileContext<'_>) -> Result<Box<dyn Keyword>, CompileError> {
    let name = value
        .as_str()
        .ok_or_else(|| CompileError::InvalidKeywordValue {
            keyword: "format",
            value: value.clone(),
            reason: "must be a string".into(),
        })?
        .to_string();
    Ok(Box::new(FormatKeyword { name }))
}

impl Keyword for FormatKeyword {
    fn evaluate(&self, instance: &Value, ctx: &EvalContext<'_>) -> Result<Scope, EvalError> {
        let scope = Scope::leaf("format", ctx.instance_path.clone(), ctx.schema_path.clone(), true)
            .with_annotation(Value::String(self.name.clone()));
        if !matches!(instance, Value::String(_)) {
            return Ok(scope);
        }
        Ok(match ctx.evaluator.catalogue().run_format(&self.name, instance) {
            Some(true) | None => scope,
            Some(false) => scope.with_error(format!("instance does not match format '{}'", self.name)),
        })
    }
}

static JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/(([^/~])|(~[01]))*)*\z").expect("valid regex"));
static RELATIVE_JSON_POINTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:0|[1-9][0-9]*)(?:#|(?:/(?:[^~/]|~0|~1)*)*)\z").expect("valid regex"));
static URI_TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?:[^\x00-\x20"'<>%\\^`{|}]|%[0-9a-f]{2})|\{[+#./;?&=,!@|]?(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?(?:,(?:[a-z0-9_]|%[0-9a-f]{2})+(?::[1-9][0-9]{0,3}|\*)?)*})*\z"#,
    )
    .expect("valid regex")
});

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn is_valid_full_date(date: &str) -> bool {
    if date.len() != 10 {
        return false;
    }
    let bytes = date.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' || !bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit()) {
        return false;
    }
    let year = (bytes[0] as u16 - b'0' as u16) * 1000
        + (bytes[1] as u16 - b'0' as u16) * 100
        + (bytes[2] as u16 - b'0' as u16) * 10
        + (bytes[3] as u16 - b'0' as u16);
    let month = (bytes[5] - b'0') * 10 + (bytes[6] - b'0');
    if !(1..=12).contains(&month) {
        return false;
    }
    let day = (bytes[8] - b'0') * 10 + (bytes[9] - b'0');
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => day >= 1 && day <= 31,
        4 | 6 | 9 | 11 => day >= 1 && day <= 30,
        2 if is_leap_year(year) => day >= 1 && day <= 29,
        2 => day >= 1 && day <= 28,
        _ => false,
    }
}

fn is_valid_full_time(time: &str) -> bool {
    let bytes = time.as_bytes();
    let len = bytes.len();
    if len < 9 {
        return false;
    }
    if !bytes[0].is_ascii_digit()
        || !bytes[1].is_ascii_digit()
        || bytes[2] != b':'
        || !bytes[3].is_ascii_digit()
        || !bytes[4].is_ascii_digit()
        || bytes[5] != b':'
        || !bytes[6].is_ascii_digit()
        || !bytes[7].is_ascii_digit()
    {
        return false;
    }
    let hh = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let mm = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    let ss = (bytes[6] - b'0') * 10 + (bytes[7] - b'0');
    if hh > 23 || mm > 59 || ss > 60 {
        return false;
    }
    let mut i = 8;
    if i < len && bytes[i] == b'.' {
        i += 1;
        let start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if i == len {
        return false;
    }
    match bytes[i] {
        b'Z' | b'z' => i == len - 1,
        b'+' | b'-' => {
            len - i == 6
                && bytes[i + 1].is_ascii_digit()
                && bytes[i + 2].is_ascii_digit()
                && bytes[i + 3] == b':'
                && bytes[i + 4].is_ascii_digit()
                && bytes[i + 5].is_ascii_digit()
        }
        _ => false,
    }
}

fn is_valid_date_time(value: &str) -> bool {
    match value.as_bytes().get(10) {
        Some(b'T') | Some(b't') => is_valid_full_date(&value[..10]) && is_valid_full_time(&value[11..]),
        _ => false,
    }
}

fn is_valid_hostname(hostname: &str) -> bool {
    !(hostname.is_empty()
        || hostname.starts_with('-')
        || hostname.ends_with('-')
        || bytecount::num_chars(hostname.as_bytes()) > 255
        || hostname.chars().any(|c| !(c.is_alphanumeric() || c == '-' || c == '.'))
        || hostname.split('.').any(|part| bytecount::num_chars(part.as_bytes()) > 63))
}

fn is_valid_email(email: &str) -> bool {
    match EmailAddress::from_str(email) {
        Ok(parsed) => {
            let domain = parsed.domain();
            if let Some(v6) = domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
                v6.strip_prefix("IPv6:").unwrap_or(v6).parse::<Ipv6Addr>().is_ok()
                    || v6.parse::<Ipv4Addr>().is_ok()
            } else {
                is_valid_hostname(domain)
            }
        }
        Err(_) => false,
    }
}

/// The built-in format validators registered into every catalogue at bootstrap.
/// Draft-specific gating (e.g. `idn-hostname` only since draft 7) is not enforced here:
/// an unsupported-for-this-draft format name simply has no registered validator, and
/// `format` then behaves as a pure annotation for it, matching a lenient default.
#[must_use]
pub fn built_in_validators() -> Vec<(&'static str, FormatValidator)> {
    fn string_validator(f: impl Fn(&str) -> bool + Send + Sync + 'static) -> FormatValidator {
        Box::new(move |instance: &Value| match instance {
            Value::String(s) => f(s),
            _ => true,
        })
    }

    vec![
        ("date", string_validator(is_valid_full_date)),
        ("time", string_validator(is_valid_full_time)),
        ("date-time", string_validator(is_valid_date_time)),
        ("email", string_validator(is_valid_email)),
        ("idn-email", string_validator(is_valid_email)),
        ("hostname", string_validator(is_valid_hostname)),
        ("idn-hostname", string_validator(|s| idna::domain_to_ascii(s).is_ok())),
        ("ipv4", string_validator(|s| Ipv4Addr::from_str(s).is_ok())),
        ("ipv6", string_validator(|s| Ipv6Addr::from_str(s).is_ok())),
        ("uuid", string_validator(|s| uuid::Uuid::parse_str(s).is_ok())),
        ("uri", string_validator(|s| jschema_referencing::Uri::parse(s).is_ok())),
        (
            "uri-reference",
            string_validator(|s| jschema_referencing::Uri::parse(s).is_ok() || !s.contains(':')),
        ),
        ("uri-template", string_validator(|s| URI_TEMPLATE_RE.is_match(s).unwrap_or(false))),
        ("json-pointer", string_validator(|s| JSON_POINTER_RE.is_match(s).unwrap_or(false))),
        (
            "relative-json-pointer",
            string_validator(|s| RELATIVE_JSON_POINTER_RE.is_match(s).unwrap_or(false)),
        ),
        ("regex", string_validator(|s| fancy_regex::Regex::new(s).is_ok())),
    ]
}

#[cfg(test)]
mod tests {
    use crate::test_support::validates;
    use serde_json::json;

    #[test]
    fn email_format_is_enforced() {
        let schema = json!({"type": "string", "format": "email"});
        assert!(validates(schema.clone(), json!("person@example.com")));
        assert!(!validates(schema, json!("not-an-email")));
    }

    #[test]
    fn format_ignores_non_string_instances() {
        assert!(validates(json!({"format": "email"}), json!(42)));
    }

    #[test]
    fn date_time_format_rejects_bare_date() {
        let schema = json!({"format": "date-time"});
        assert!(validates(schema.clone(), json!("2020-01-02T03:04:05Z")));
        assert!(!validates(schema, json!("2020-01-02")));
    }
}
