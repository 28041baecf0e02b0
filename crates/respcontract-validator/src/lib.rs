//! respcontract-validator: response contract checks against OpenAPI schemas
//!
//! Bundles a response schema with the document's shared schemas into one
//! self-contained tree, optionally tightens it to strict form, and validates
//! the response body against it alongside status and header checks.

pub mod bundle;
pub mod checker;
pub mod definitions;
pub mod load;
pub mod nullable;
pub mod strict;
mod tree;
pub mod validate;

pub use bundle::bundle;
pub use checker::{ResponseContractChecker, check_headers, check_status};
pub use definitions::{SharedSchemas, resolve};
pub use load::{LoadError, load_declarations, load_response, load_spec};
pub use strict::apply_strict;
pub use validate::{RejectExternal, SchemaDialect, SchemaValidator, StaticRetriever};
