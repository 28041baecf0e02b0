//! Response contract checks (3-facet pipeline)
//!
//! No I/O. Status, headers and body are independent facets; each one fails
//! on its first violation.

use std::sync::Arc;

use serde_json::Value;

use respcontract_core::{
    Config, ContractViolation, DeprecationSink, ExpectationRecord, Response,
    ResponseDeclaration, SpecDocument, TracingSink,
};

use crate::bundle::bundle;
use crate::definitions;
use crate::nullable::widen_nullable_in_place;
use crate::strict::apply_strict_in_place;
use crate::validate::{SchemaDialect, SchemaValidator};

/// Checks recorded responses against their expectations.
///
/// Holds no per-check state; one checker can serve many concurrent checks
/// against a shared [`SpecDocument`].
pub struct ResponseContractChecker {
    sink: Arc<dyn DeprecationSink>,
    validator: SchemaValidator,
}

impl std::fmt::Debug for ResponseContractChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseContractChecker")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl Default for ResponseContractChecker {
    fn default() -> Self {
        Self {
            sink: Arc::new(TracingSink),
            validator: SchemaValidator::new(),
        }
    }
}

impl ResponseContractChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DeprecationSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_validator(mut self, validator: SchemaValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Settle a declaration's strictness against `config`, reporting
    /// deprecated flags to this checker's sink.
    #[must_use]
    pub fn resolve(&self, declaration: ResponseDeclaration, config: &Config) -> ExpectationRecord {
        declaration.resolve(config, self.sink.as_ref())
    }

    /// Run all three facets.
    ///
    /// # Errors
    ///
    /// Returns the violation of the first failing facet.
    pub fn check(
        &self,
        expectation: &ExpectationRecord,
        spec: &SpecDocument,
        response: &Response,
    ) -> Result<(), ContractViolation> {
        check_status(expectation, response)?;
        check_headers(expectation, response)?;
        self.check_body(expectation, spec, response)
    }

    /// Body facet: parse, bundle, optionally tighten, validate.
    ///
    /// Skipped when the expectation declares no schema.
    ///
    /// # Errors
    ///
    /// `BodyNotJson` before any schema work, then `SchemaCompile` or
    /// `BodySchemaMismatch`.
    pub fn check_body(
        &self,
        expectation: &ExpectationRecord,
        spec: &SpecDocument,
        response: &Response,
    ) -> Result<(), ContractViolation> {
        if expectation.schema.is_none() {
            tracing::debug!(code = %expectation.code, "no body schema declared, body not checked");
            return Ok(());
        }

        let body: Value =
            serde_json::from_str(&response.body).map_err(|e| ContractViolation::BodyNotJson {
                message: e.to_string(),
                body: response.body.clone(),
            })?;

        let Some(schema) = self.bundled_schema(expectation, spec) else {
            return Ok(());
        };
        let errors = self
            .validator
            .validate_for(SchemaDialect::of(spec), &schema, &body)?;
        if errors.is_empty() {
            tracing::debug!(code = %expectation.code, strict = expectation.strict, "body conforms");
            return Ok(());
        }

        Err(ContractViolation::BodySchemaMismatch {
            errors,
            body: serde_json::to_string_pretty(&body).unwrap_or_else(|_| response.body.clone()),
        })
    }

    /// Self-contained schema the body is validated against, strict when the
    /// expectation asks for it. `None` when no schema is declared.
    ///
    /// Draft-4 documents also have their `nullable` flags folded into `type`.
    #[must_use]
    pub fn bundled_schema(
        &self,
        expectation: &ExpectationRecord,
        spec: &SpecDocument,
    ) -> Option<Value> {
        let schema = expectation.schema.as_ref()?;
        let shared = definitions::resolve(spec, self.sink.as_ref());
        let mut tree = bundle(schema, &shared);
        if SchemaDialect::of(spec) == SchemaDialect::Draft4 {
            widen_nullable_in_place(&mut tree);
        }
        if expectation.strict {
            apply_strict_in_place(&mut tree);
        }
        Some(tree)
    }
}

/// Status facet: codes compare as trimmed text.
///
/// # Errors
///
/// `StatusMismatch` carrying the response body.
pub fn check_status(
    expectation: &ExpectationRecord,
    response: &Response,
) -> Result<(), ContractViolation> {
    if expectation.matches_code(&response.code) {
        return Ok(());
    }
    Err(ContractViolation::StatusMismatch {
        expected: expectation.code.clone(),
        actual: response.code.clone(),
        body: response.body.clone(),
    })
}

/// Header facet: every declared header is examined, in declaration order;
/// the first violation found is returned. Undeclared headers are ignored.
///
/// # Errors
///
/// `HeaderMissing` or `HeaderNotNullable`.
pub fn check_headers(
    expectation: &ExpectationRecord,
    response: &Response,
) -> Result<(), ContractViolation> {
    let mut violations: Vec<ContractViolation> = expectation
        .headers
        .iter()
        .filter_map(|(name, rule)| match response.header(name) {
            None if rule.required => Some(ContractViolation::HeaderMissing {
                name: name.to_string(),
            }),
            Some(None) if !rule.nullable => Some(ContractViolation::HeaderNotNullable {
                name: name.to_string(),
            }),
            _ => None,
        })
        .collect();

    if violations.is_empty() {
        return Ok(());
    }
    tracing::debug!(count = violations.len(), "header violations found");
    Err(violations.swap_remove(0))
}
