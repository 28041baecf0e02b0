//! Strict mode: close every object schema that declares properties
//!
//! Applies to the whole tree, shared definitions included. An explicit
//! `additionalProperties: true` is kept.

use serde_json::{Map, Value};

use crate::tree::{self, Visitor};

/// Return `tree` with every node that has a non-empty `properties` mapping
/// rewritten to `required = <all property names>` and
/// `additionalProperties = false` (unless it is `true`).
///
/// Idempotent.
#[must_use]
pub fn apply_strict(mut tree: Value) -> Value {
    apply_strict_in_place(&mut tree);
    tree
}

/// In-place form of [`apply_strict`].
pub fn apply_strict_in_place(tree: &mut Value) {
    tree::walk(tree, &mut Strictifier);
}

struct Strictifier;

impl Visitor for Strictifier {
    fn visit_map(&mut self, map: &mut Map<String, Value>) {
        let names: Vec<Value> = match map.get("properties") {
            Some(Value::Object(props)) if !props.is_empty() => {
                props.keys().cloned().map(Value::String).collect()
            }
            _ => return,
        };
        map.insert("required".to_string(), Value::Array(names));
        if map.get("additionalProperties") != Some(&Value::Bool(true)) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
}
