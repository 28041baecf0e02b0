//! Locate the shared schema section of an API document

use serde_json::{Map, Value};

use respcontract_core::{Deprecation, DeprecationSink, SpecDocument};

/// Shared schemas taken from a document, in the shape they were found.
#[derive(Debug, Clone, PartialEq)]
pub enum SharedSchemas {
    /// A `definitions` section: name → schema
    Definitions(Map<String, Value>),
    /// A `components` section; schemas sit under its `schemas` key
    Components(Map<String, Value>),
}

impl SharedSchemas {
    /// Name → schema entries, whichever shape holds them.
    #[must_use]
    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Definitions(defs) => Some(defs),
            Self::Components(components) => components.get("schemas").and_then(Value::as_object),
        }
    }
}

/// Pick the shared schemas of `spec`.
///
/// - Swagger 2.x: `definitions` (empty when absent)
/// - Current document with a `definitions` section: that section, with a
///   deprecation notice; it wins over `components.schemas`
/// - Otherwise: `components` (empty when absent)
///
/// Sections are copied; `spec` is left untouched.
pub fn resolve(spec: &SpecDocument, sink: &dyn DeprecationSink) -> SharedSchemas {
    if spec.is_legacy() {
        return SharedSchemas::Definitions(object_or_empty(spec.definitions()));
    }
    if let Some(definitions) = spec.definitions() {
        sink.deprecated(&Deprecation::LegacyDefinitions {
            version: spec.version.clone(),
        });
        return SharedSchemas::Definitions(object_or_empty(Some(definitions)));
    }
    SharedSchemas::Components(object_or_empty(spec.components()))
}

fn object_or_empty(section: Option<&Value>) -> Map<String, Value> {
    section
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}
