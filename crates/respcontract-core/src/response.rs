//! Recorded HTTP response, consumed read-only by the checker

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Response under test.
///
/// Header values are `None` when the header is present without a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Response {
    /// Status code, kept as text so `"200"` and `200` compare equal
    #[serde(deserialize_with = "deserialize_code")]
    #[schemars(with = "CodeRepr")]
    pub code: String,
    #[serde(default)]
    pub headers: HashMap<String, Option<String>>,
    #[serde(default)]
    pub body: String,
}

impl Response {
    #[must_use]
    pub fn new(code: impl ToString, body: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Add a header with a value
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), Some(value.into()));
        self
    }

    /// Add a header that is present but carries no value
    #[must_use]
    pub fn with_null_header(mut self, name: impl Into<String>) -> Self {
        self.headers.insert(name.into(), None);
        self
    }

    /// Look up a header, ignoring ASCII case.
    ///
    /// Outer `None`: header absent. `Some(None)`: present with a null value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<Option<&str>> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref())
    }
}

/// Status codes are written either as `200` or `"200"`.
#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
pub(crate) enum CodeRepr {
    Text(String),
    Number(u64),
}

pub(crate) fn deserialize_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CodeRepr::deserialize(deserializer)? {
        CodeRepr::Text(s) => s,
        CodeRepr::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let resp = Response::new(200, "").with_header("X-Request-Id", "abc");
        assert_eq!(resp.header("x-request-id"), Some(Some("abc")));
        assert_eq!(resp.header("X-REQUEST-ID"), Some(Some("abc")));
    }

    #[test]
    fn null_header_is_present() {
        let resp = Response::new(204, "").with_null_header("ETag");
        assert_eq!(resp.header("etag"), Some(None));
        assert_eq!(resp.header("Location"), None);
    }

    #[test]
    fn code_accepts_number_or_text() {
        let a: Response = serde_json::from_str(r#"{"code": 201, "body": "{}"}"#).unwrap();
        let b: Response = serde_json::from_str(r#"{"code": "201", "body": "{}"}"#).unwrap();
        assert_eq!(a.code, "201");
        assert_eq!(a, b);
    }

    #[test]
    fn null_header_from_json() {
        let resp: Response =
            serde_json::from_str(r#"{"code": 200, "headers": {"X-Trace": null}}"#).unwrap();
        assert_eq!(resp.header("x-trace"), Some(None));
        assert!(resp.body.is_empty());
    }
}
