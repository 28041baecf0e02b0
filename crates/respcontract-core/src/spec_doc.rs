//! API description document holding shared schemas

use serde_json::Value;

/// Version prefix of Swagger 2.x documents, which keep shared schemas under `definitions`.
pub const LEGACY_MAJOR: &str = "2";

/// OpenAPI / Swagger document plus its version tag.
///
/// Never mutated by the checker; one document is shared by many checks.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocument {
    pub version: String,
    pub document: Value,
}

impl SpecDocument {
    #[must_use]
    pub fn new(version: impl Into<String>, document: Value) -> Self {
        Self {
            version: version.into(),
            document,
        }
    }

    /// Take the version from the `swagger` or `openapi` field.
    ///
    /// Documents with neither are treated as current (`3.0.0`).
    #[must_use]
    pub fn from_value(document: Value) -> Self {
        let version = ["swagger", "openapi"]
            .iter()
            .find_map(|key| document.get(*key).and_then(version_text))
            .unwrap_or_else(|| "3.0.0".to_string());
        Self { version, document }
    }

    /// Swagger 2.x document
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.version.starts_with(LEGACY_MAJOR)
    }

    /// Top-level `definitions` section, if any
    #[must_use]
    pub fn definitions(&self) -> Option<&Value> {
        self.document.get("definitions")
    }

    /// Top-level `components` section, if any
    #[must_use]
    pub fn components(&self) -> Option<&Value> {
        self.document.get("components")
    }
}

// YAML authors sometimes write `swagger: 2.0` unquoted
fn version_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
