//! Read API documents, declaration files and recorded responses from disk

use std::path::Path;

use serde::de::DeserializeOwned;

use respcontract_core::{DeclarationFile, Response, SpecDocument};

/// Read and parse an OpenAPI / Swagger document.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn load_spec(path: &Path) -> Result<SpecDocument, LoadError> {
    let content = read(path)?;
    let document: serde_json::Value = parse_document(path, &content)?;
    Ok(SpecDocument::from_value(document))
}

/// Read and parse a declaration file.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn load_declarations(path: &Path) -> Result<DeclarationFile, LoadError> {
    let content = read(path)?;
    parse_document(path, &content)
}

/// Read and parse a recorded response.
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed.
pub fn load_response(path: &Path) -> Result<Response, LoadError> {
    let content = read(path)?;
    parse_document(path, &content)
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::Io(format!("{}: {e}", path.display())))
}

/// Parse a document from JSON or YAML.
///
/// Detection strategy: try extension first (`.yaml`/`.yml`), then fall back to
/// content sniffing (leading `{` → JSON, otherwise YAML).
///
/// # Errors
///
/// Returns `LoadError::Parse` naming the format that was tried.
pub fn parse_document<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "yaml" | "yml" => from_yaml(content),
        "json" => from_json(content),
        _ => {
            // Content sniffing: trimmed first char
            if content.trim_start().starts_with('{') {
                from_json(content)
            } else {
                from_yaml(content)
            }
        }
    }
}

fn from_json<T: DeserializeOwned>(content: &str) -> Result<T, LoadError> {
    serde_json::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid JSON: {e}")))
}

fn from_yaml<T: DeserializeOwned>(content: &str) -> Result<T, LoadError> {
    serde_yml::from_str(content).map_err(|e| LoadError::Parse(format!("Invalid YAML: {e}")))
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
}
