//! Compile bundled schemas and validate response bodies

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use jsonschema::{Draft, Retrieve, Uri, Validator};
use serde_json::Value;

use respcontract_core::{ContractViolation, SpecDocument, ValidationError};

type RetrieveError = Box<dyn std::error::Error + Send + Sync>;

/// JSON Schema rules a document's schema objects follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchemaDialect {
    /// Swagger 2.x and OpenAPI 3.0.x
    Draft4,
    /// OpenAPI 3.1 onwards
    #[default]
    Draft202012,
}

impl SchemaDialect {
    /// Dialect of `spec`, taken from its version tag.
    #[must_use]
    pub fn of(spec: &SpecDocument) -> Self {
        let version = spec.version.as_str();
        if spec.is_legacy() || version == "3.0" || version.starts_with("3.0.") {
            Self::Draft4
        } else {
            Self::Draft202012
        }
    }

    const fn draft(self) -> Draft {
        match self {
            Self::Draft4 => Draft::Draft4,
            Self::Draft202012 => Draft::Draft202012,
        }
    }
}

/// Default retriever: every reference outside the schema tree is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectExternal;

impl Retrieve for RejectExternal {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, RetrieveError> {
        Err(format!("external schema reference not allowed: {}", uri.as_str()).into())
    }
}

/// Offline retriever serving documents from memory, keyed by absolute URI.
#[derive(Debug, Clone, Default)]
pub struct StaticRetriever {
    documents: HashMap<String, Value>,
}

impl StaticRetriever {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, uri: impl Into<String>, document: Value) -> Self {
        self.documents.insert(uri.into(), document);
        self
    }
}

impl Retrieve for StaticRetriever {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, RetrieveError> {
        self.documents
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| format!("unknown schema document: {}", uri.as_str()).into())
    }
}

// `with_retriever` wants an owned retriever per build
struct SharedRetriever(Arc<dyn Retrieve>);

impl Retrieve for SharedRetriever {
    fn retrieve(&self, uri: &Uri<String>) -> Result<Value, RetrieveError> {
        self.0.retrieve(uri)
    }
}

/// JSON Schema validator with a pluggable retriever and a compile cache.
///
/// Compiled validators are cached by dialect and the schema's JSON text, so a
/// strict and a lenient form of one schema are distinct entries.
pub struct SchemaValidator {
    retriever: Arc<dyn Retrieve>,
    cache: Option<Mutex<HashMap<String, Arc<Validator>>>>,
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self {
            retriever: Arc::new(RejectExternal),
            cache: Some(Mutex::new(HashMap::new())),
        }
    }
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve references outside the tree through `retriever`.
    #[must_use]
    pub fn with_retriever(mut self, retriever: impl Retrieve + 'static) -> Self {
        self.retriever = Arc::new(retriever);
        self
    }

    /// Compile on every call.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Number of compiled validators held.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| match cache.lock() {
            Ok(c) => c.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        })
    }

    /// Compile `schema` under the default dialect.
    ///
    /// # Errors
    ///
    /// Returns `SchemaCompile` if the schema is invalid or a reference
    /// cannot be resolved.
    pub fn compile(&self, schema: &Value) -> Result<Arc<Validator>, ContractViolation> {
        self.compile_for(SchemaDialect::default(), schema)
    }

    /// Compile `schema` under `dialect`, reusing an earlier compilation when
    /// cached.
    ///
    /// # Errors
    ///
    /// Returns `SchemaCompile` if the schema is invalid or a reference
    /// cannot be resolved.
    pub fn compile_for(
        &self,
        dialect: SchemaDialect,
        schema: &Value,
    ) -> Result<Arc<Validator>, ContractViolation> {
        let Some(cache) = &self.cache else {
            return self.build(dialect, schema).map(Arc::new);
        };

        let key = format!("{dialect:?}:{schema}");
        if let Some(hit) = lock(cache).get(&key) {
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(self.build(dialect, schema)?);
        lock(cache).insert(key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Every constraint `body` breaks under the default dialect; empty when
    /// it conforms.
    ///
    /// # Errors
    ///
    /// Returns `SchemaCompile` if the schema cannot be compiled.
    pub fn validate(
        &self,
        schema: &Value,
        body: &Value,
    ) -> Result<Vec<ValidationError>, ContractViolation> {
        self.validate_for(SchemaDialect::default(), schema, body)
    }

    /// Every constraint `body` breaks under `dialect`, with the JSON pointer
    /// of the offending value.
    ///
    /// # Errors
    ///
    /// Returns `SchemaCompile` if the schema cannot be compiled.
    pub fn validate_for(
        &self,
        dialect: SchemaDialect,
        schema: &Value,
        body: &Value,
    ) -> Result<Vec<ValidationError>, ContractViolation> {
        let validator = self.compile_for(dialect, schema)?;
        Ok(validator
            .iter_errors(body)
            .map(|e| ValidationError::new(e.instance_path().to_string(), e.to_string()))
            .collect())
    }

    fn build(&self, dialect: SchemaDialect, schema: &Value) -> Result<Validator, ContractViolation> {
        tracing::debug!(?dialect, "compiling response schema");
        jsonschema::options()
            .with_draft(dialect.draft())
            .with_retriever(SharedRetriever(Arc::clone(&self.retriever)))
            .build(schema)
            .map_err(|e| ContractViolation::SchemaCompile {
                message: e.to_string(),
            })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conforming_body_has_no_errors() {
        let v = SchemaValidator::new();
        let schema = json!({"type": "object", "properties": {"id": {"type": "integer"}}});
        assert!(v.validate(&schema, &json!({"id": 1})).unwrap().is_empty());
    }

    #[test]
    fn every_violation_is_reported() {
        let v = SchemaValidator::new();
        let schema = json!({
            "type": "object",
            "properties": {
                "id": {"type": "integer"},
                "name": {"type": "string"}
            },
            "required": ["id", "name", "kind"]
        });
        let errors = v
            .validate(&schema, &json!({"id": "x", "name": 5}))
            .unwrap();
        // id type, name type, missing kind
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn internal_refs_resolve_without_retriever() {
        let v = SchemaValidator::new();
        let schema = json!({
            "$ref": "#/$defs/Widget",
            "$defs": {"Widget": {"type": "object", "required": ["id"]}}
        });
        assert!(v.validate(&schema, &json!({"id": 1})).unwrap().is_empty());
        assert_eq!(v.validate(&schema, &json!({})).unwrap().len(), 1);
    }

    #[test]
    fn external_refs_are_rejected_by_default() {
        let v = SchemaValidator::new();
        let schema = json!({"$ref": "https://schemas.example.com/money.json"});
        let err = v.validate(&schema, &json!(1)).unwrap_err();
        assert_eq!(err.kind(), "schema_compile");
    }

    #[test]
    fn external_refs_use_injected_retriever() {
        let retriever = StaticRetriever::new().with_document(
            "https://schemas.example.com/money.json",
            json!({"type": "object", "required": ["amount"]}),
        );
        let v = SchemaValidator::new().with_retriever(retriever);
        let schema = json!({"$ref": "https://schemas.example.com/money.json"});

        assert!(v.validate(&schema, &json!({"amount": 3})).unwrap().is_empty());
        assert_eq!(v.validate(&schema, &json!({})).unwrap().len(), 1);
    }

    #[test]
    fn compiled_schemas_are_cached() {
        let v = SchemaValidator::new();
        let schema = json!({"type": "string"});
        v.validate(&schema, &json!("a")).unwrap();
        v.validate(&schema, &json!("b")).unwrap();
        assert_eq!(v.cached(), 1);

        v.validate(&json!({"type": "integer"}), &json!(1)).unwrap();
        assert_eq!(v.cached(), 2);
    }

    #[test]
    fn cache_can_be_disabled() {
        let v = SchemaValidator::new().without_cache();
        v.validate(&json!({"type": "string"}), &json!("a")).unwrap();
        assert_eq!(v.cached(), 0);
    }

    #[test]
    fn errors_carry_instance_paths() {
        let v = SchemaValidator::new();
        let schema = json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}
        });
        let errors = v.validate(&schema, &json!({"a": "x", "b": "x"})).unwrap();

        let mut paths: Vec<&str> = errors.iter().map(|e| e.instance_path.as_str()).collect();
        paths.sort_unstable();
        assert_eq!(paths, vec!["/a", "/b"]);
        assert_ne!(errors[0], errors[1]);
    }

    #[test]
    fn dialect_follows_document_version() {
        let of = |doc| SchemaDialect::of(&SpecDocument::from_value(doc));
        assert_eq!(of(json!({"swagger": "2.0"})), SchemaDialect::Draft4);
        assert_eq!(of(json!({"openapi": "3.0.3"})), SchemaDialect::Draft4);
        assert_eq!(of(json!({"openapi": "3.1.0"})), SchemaDialect::Draft202012);
    }

    #[test]
    fn draft4_boolean_exclusive_minimum() {
        let v = SchemaValidator::new();
        let schema = json!({"type": "integer", "minimum": 0, "exclusiveMinimum": true});

        let ok = v.validate_for(SchemaDialect::Draft4, &schema, &json!(5)).unwrap();
        assert!(ok.is_empty());
        let errors = v.validate_for(SchemaDialect::Draft4, &schema, &json!(0)).unwrap();
        assert_eq!(errors.len(), 1);

        // Not a valid 2020-12 schema
        assert!(v.validate(&schema, &json!(5)).is_err());
    }

    #[test]
    fn dialect_is_part_of_cache_key() {
        let v = SchemaValidator::new();
        let schema = json!({"type": "string"});
        v.validate_for(SchemaDialect::Draft4, &schema, &json!("a")).unwrap();
        v.validate_for(SchemaDialect::Draft202012, &schema, &json!("a")).unwrap();
        assert_eq!(v.cached(), 2);
    }

    #[test]
    fn invalid_schema_fails_to_compile() {
        let v = SchemaValidator::new();
        let err = v
            .validate(&json!({"type": "no-such-type"}), &json!(1))
            .unwrap_err();
        assert!(matches!(err, ContractViolation::SchemaCompile { .. }));
    }
}
