//! Contract violations - one per failed facet

use serde::{Deserialize, Serialize};

/// One schema constraint the body broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON pointer to the offending value; empty for the document root
    pub instance_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.instance_path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.instance_path, self.message)
        }
    }
}

/// Why a response does not honor its declared contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    #[error("expected status {expected}, got {actual}\n\nbody:\n{body}")]
    StatusMismatch {
        expected: String,
        actual: String,
        body: String,
    },
    #[error("required header `{name}` is missing")]
    HeaderMissing { name: String },
    #[error("header `{name}` is null but not nullable")]
    HeaderNotNullable { name: String },
    #[error("response body is not valid JSON: {message}\n\nbody:\n{body}")]
    BodyNotJson { message: String, body: String },
    #[error(
        "response body does not match schema ({} errors):\n{}\n\nbody:\n{body}",
        .errors.len(),
        join_errors(.errors)
    )]
    BodySchemaMismatch {
        errors: Vec<ValidationError>,
        /// Pretty-printed body
        body: String,
    },
    #[error("cannot compile response schema: {message}")]
    SchemaCompile { message: String },
}

impl ContractViolation {
    /// Short machine-friendly kind, used in reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StatusMismatch { .. } => "status_mismatch",
            Self::HeaderMissing { .. } => "header_missing",
            Self::HeaderNotNullable { .. } => "header_not_nullable",
            Self::BodyNotJson { .. } => "body_not_json",
            Self::BodySchemaMismatch { .. } => "body_schema_mismatch",
            Self::SchemaCompile { .. } => "schema_compile",
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}
