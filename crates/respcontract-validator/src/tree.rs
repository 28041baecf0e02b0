//! Depth-first walk over a JSON schema tree

use serde_json::{Map, Value};

/// Callbacks fired by [`walk`]. Both default to no-ops.
pub(crate) trait Visitor {
    /// Every schema node, before its children are walked
    fn visit_map(&mut self, _map: &mut Map<String, Value>) {}

    /// Every string stored under a `$ref` key
    fn visit_ref(&mut self, _reference: &mut String) {}
}

/// Keywords whose value maps names to subschemas. The map itself is not a
/// schema, so it is never passed to `visit_map`.
const SCHEMA_MAPS: &[&str] = &[
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
];

/// Keywords holding instance data rather than schemas
const DATA_KEYWORDS: &[&str] = &["enum", "const", "default", "example", "examples"];

/// Walk every schema reachable from `node`.
///
/// A schema is visited before its children, so children added by
/// `visit_map` are walked too. Name maps (`properties`, `$defs`, ...) are
/// stepped through without being visited, and data keywords are skipped.
pub(crate) fn walk(node: &mut Value, visitor: &mut impl Visitor) {
    match node {
        Value::Object(map) => {
            visitor.visit_map(map);
            for (key, child) in map.iter_mut() {
                match child {
                    Value::String(reference) if key == "$ref" => visitor.visit_ref(reference),
                    _ if DATA_KEYWORDS.contains(&key.as_str()) => {}
                    Value::Object(named) if SCHEMA_MAPS.contains(&key.as_str()) => {
                        for schema in named.values_mut() {
                            walk(schema, visitor);
                        }
                    }
                    _ => walk(child, visitor),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, visitor);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
}
