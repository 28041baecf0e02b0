//! OpenAPI 3.0 `nullable` and Swagger `x-nullable`
//!
//! Neither is a JSON Schema keyword. A schema flagged with either one gets
//! `"null"` added to its `type`, so draft-4 validation accepts `null`.

use serde_json::{Map, Value};

use crate::tree::{self, Visitor};

const FLAGS: &[&str] = &["nullable", "x-nullable"];

/// Widen every flagged schema in `tree` to also accept `null`.
///
/// Schemas without a `type` already accept `null` and are left as written.
pub fn widen_nullable_in_place(tree: &mut Value) {
    tree::walk(tree, &mut Widener);
}

struct Widener;

impl Visitor for Widener {
    fn visit_map(&mut self, map: &mut Map<String, Value>) {
        let flagged = FLAGS
            .iter()
            .any(|flag| map.get(*flag) == Some(&Value::Bool(true)));
        if !flagged {
            return;
        }
        let null = Value::String("null".to_string());
        let Some(ty) = map.get_mut("type") else {
            return;
        };
        match ty {
            Value::String(single) if single != "null" => {
                let single = std::mem::take(single);
                *ty = Value::Array(vec![Value::String(single), null]);
            }
            Value::Array(types) if !types.contains(&null) => types.push(null),
            _ => {}
        }
    }
}
