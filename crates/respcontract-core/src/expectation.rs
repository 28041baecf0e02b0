//! Response expectations: raw declarations and their resolved form

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::Config;
use crate::deprecation::{Deprecation, DeprecationSink};
use crate::response::{CodeRepr, deserialize_code};

/// Presence rules for one response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HeaderRule {
    /// Header must be present (default: true)
    #[serde(default = "default_true")]
    pub required: bool,
    /// Header may be present with a null value (default: false)
    #[serde(default)]
    pub nullable: bool,
}

impl Default for HeaderRule {
    fn default() -> Self {
        Self {
            required: true,
            nullable: false,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Declared headers, in declaration order.
///
/// Written as a mapping (`{"X-Id": {"nullable": true}}`); the order of the
/// mapping is kept because headers are checked in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRules(Vec<(String, HeaderRule)>);

impl HeaderRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; a repeated name replaces the earlier rule in place.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, rule: HeaderRule) -> Self {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = rule,
            None => self.0.push((name, rule)),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderRule)> {
        self.0.iter().map(|(n, r)| (n.as_str(), r))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for HeaderRules {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, rule) in &self.0 {
            map.serialize_entry(name, rule)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RulesVisitor;

        impl<'de> Visitor<'de> for RulesVisitor {
            type Value = HeaderRules;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a mapping of header name to header rule")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<HeaderRules, A::Error> {
                let mut rules = HeaderRules::new();
                while let Some((name, rule)) = access.next_entry::<String, HeaderRule>()? {
                    rules = rules.with(name, rule);
                }
                Ok(rules)
            }
        }

        deserializer.deserialize_map(RulesVisitor)
    }
}

/// One expected response as written in a declaration file.
///
/// Strictness is not settled yet; see [`ResponseDeclaration::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResponseDeclaration {
    /// Expected status code
    #[serde(deserialize_with = "deserialize_code")]
    #[schemars(with = "CodeRepr")]
    pub code: String,
    /// Header presence rules
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, HeaderRule>")]
    pub headers: HeaderRules,
    /// JSON Schema of the body; absent means the body is not checked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
    /// Strict body validation for this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
    /// Deprecated spelling of `strict`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_mode: Option<bool>,
}

impl ResponseDeclaration {
    /// Settle strictness: `strict`, then the deprecated `strict_mode`
    /// (reported to `sink`), then the configured default.
    #[must_use]
    pub fn resolve(self, config: &Config, sink: &dyn DeprecationSink) -> ExpectationRecord {
        let strict = match (self.strict, self.strict_mode) {
            (Some(strict), _) => strict,
            (None, Some(legacy)) => {
                sink.deprecated(&Deprecation::LegacyStrictFlag {
                    code: self.code.clone(),
                });
                legacy
            }
            (None, None) => config.default_strict(sink),
        };
        ExpectationRecord {
            code: self.code,
            headers: self.headers,
            schema: self.schema,
            strict,
        }
    }
}

/// Resolved expectation for one status code.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectationRecord {
    pub code: String,
    pub headers: HeaderRules,
    pub schema: Option<serde_json::Value>,
    pub strict: bool,
}

impl ExpectationRecord {
    #[must_use]
    pub fn new(code: impl ToString) -> Self {
        Self {
            code: code.to_string(),
            headers: HeaderRules::new(),
            schema: None,
            strict: false,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, rule: HeaderRule) -> Self {
        self.headers = self.headers.with(name, rule);
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Whether `code` names this expectation's status; surrounding
    /// whitespace is ignored.
    #[must_use]
    pub fn matches_code(&self, code: &str) -> bool {
        self.code.trim() == code.trim()
    }
}

/// Declaration file: every expected response of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DeclarationFile {
    pub responses: Vec<ResponseDeclaration>,
}
