//! Merge a body schema with shared schemas into one self-contained tree
//!
//! Shared schemas land under `$defs`, and every local `$ref` is rewritten by
//! name: `#/<anything>/<Name>` becomes `#/$defs/<Name>`. Because only the last
//! segment survives, two sources defining the same name collide; the later
//! source in merge order wins:
//!
//! 1. shared schemas of the document
//! 2. the body schema's own `definitions`
//! 3. the body schema's own `components.schemas`
//! 4. the body schema's own `$defs`
//!
//! References that point outside the tree (`https://…`, `common.json#/…`)
//! are kept as written and left to the validator's retriever.

use serde_json::{Map, Value};

use crate::definitions::SharedSchemas;
use crate::tree::{self, Visitor};

/// Key of the merged definitions section
pub const DEFS_KEY: &str = "$defs";

const DEFS_POINTER: &str = "#/$defs/";

/// Build a self-contained copy of `body_schema`.
///
/// Neither input is modified. A boolean body schema is wrapped as
/// `{"allOf": [schema]}` so the definitions have somewhere to live.
#[must_use]
pub fn bundle(body_schema: &Value, shared: &SharedSchemas) -> Value {
    let mut defs = shared.schemas().cloned().unwrap_or_default();

    let mut root = match body_schema {
        Value::Object(map) => map.clone(),
        other => {
            let mut wrapper = Map::new();
            wrapper.insert("allOf".to_string(), Value::Array(vec![other.clone()]));
            wrapper
        }
    };

    if let Some(Value::Object(own)) = root.remove("definitions") {
        defs.extend(own);
    }
    if let Some(Value::Object(mut components)) = root.remove("components") {
        if let Some(Value::Object(own)) = components.remove("schemas") {
            defs.extend(own);
        }
    }
    if let Some(Value::Object(own)) = root.remove(DEFS_KEY) {
        defs.extend(own);
    }
    root.insert(DEFS_KEY.to_string(), Value::Object(defs));

    let mut tree = Value::Object(root);
    tree::walk(&mut tree, &mut RefRewriter);
    tree
}

/// Name-based target of a local reference, or `None` to keep it as is.
///
/// Only same-document pointers with at least one `/` are rewritten; plain
/// anchors (`#node`), the root (`#`) and other documents are kept.
#[must_use]
pub fn rewrite_ref(reference: &str) -> Option<String> {
    let pointer = reference.strip_prefix('#')?;
    let (_, name) = pointer.rsplit_once('/')?;
    if name.is_empty() {
        return None;
    }
    Some(format!("{DEFS_POINTER}{name}"))
}

struct RefRewriter;

impl Visitor for RefRewriter {
    fn visit_ref(&mut self, reference: &mut String) {
        if let Some(rewritten) = rewrite_ref(reference) {
            *reference = rewritten;
        }
    }
}
