//! JSON Schema export of the declaration and response file formats

use crate::expectation::DeclarationFile;
use crate::response::Response;

/// JSON Schema of a declaration file, pretty-printed.
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(DeclarationFile);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}

/// JSON Schema of a recorded response file, pretty-printed.
pub fn generate_response_schema() -> String {
    let schema = schemars::schema_for!(Response);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| "{}".to_string())
}
