//! Redaction of credentials before they reach the logs.
//!
//! Catalog request URLs carry `sessionId`/`token` query parameters and stream
//! URLs carry signed `__token__` parameters; both must be scrubbed before a
//! URL is logged.

use std::borrow::Cow;

const REDACTED: &str = "[REDACTED]";

/// Query/form parameters whose values are secret.
const SECRET_PARAMS: &[&str] = &[
    "sessionId=",
    "__token__=",
    "token=",
    "access_token=",
    "password=",
    "username=",
];

/// Header prefixes whose values are secret.
const SECRET_HEADERS: &[&str] = &["X-Tidal-Token: ", "x-tidal-token: ", "Authorization: "];

/// Replace the values of known secret parameters and headers with `[REDACTED]`.
///
/// ```
/// use tidalink_core::redact::redact_secrets;
///
/// let url = "https://api.tidalhifi.com/v1/tracks/1?sessionId=abc123&countryCode=US";
/// let safe = redact_secrets(url);
/// assert!(!safe.contains("abc123"));
/// assert!(safe.contains("countryCode=US"));
/// ```
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    if !contains_sensitive(input) {
        return Cow::Borrowed(input);
    }

    let mut output = input.to_string();
    for param in SECRET_PARAMS {
        output = redact_values(&output, param, is_param_boundary);
    }
    for header in SECRET_HEADERS {
        output = redact_values(&output, header, |c| c == '\n' || c == '\r');
    }
    Cow::Owned(output)
}

pub fn contains_sensitive(input: &str) -> bool {
    SECRET_PARAMS
        .iter()
        .chain(SECRET_HEADERS)
        .any(|pattern| input.contains(pattern))
}

fn is_param_boundary(c: char) -> bool {
    c == '&' || c == '"' || c == '\'' || c.is_whitespace()
}

fn redact_values(input: &str, key: &str, ends_value: impl Fn(char) -> bool) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(key) {
        let is_whole_key = pos == 0
            || rest[..pos]
                .chars()
                .last()
                .is_some_and(|c| !c.is_ascii_alphanumeric() && c != '_');
        let value_start = pos + key.len();
        result.push_str(&rest[..value_start]);
        let value = &rest[value_start..];
        let value_len = value.find(&ends_value).unwrap_or(value.len());

        if is_whole_key && !value[..value_len].starts_with(REDACTED) {
            result.push_str(REDACTED);
        } else {
            result.push_str(&value[..value_len]);
        }
        rest = &value[value_len..];
    }

    result.push_str(rest);
    result
}
