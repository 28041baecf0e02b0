//! respcontract-core: Core types for HTTP response contract checking
//!
//! This crate provides the data the checker works on: the API document holding
//! shared schemas, the expected response, the recorded response, and the
//! violations and deprecation notices a check can produce.

pub mod config;
pub mod deprecation;
pub mod expectation;
pub mod response;
pub mod schema;
pub mod spec_doc;
pub mod violation;

pub use config::{Config, ConfigError};
pub use deprecation::{Deprecation, DeprecationSink, RecordingSink, TracingSink};
pub use expectation::{
    DeclarationFile, ExpectationRecord, HeaderRule, HeaderRules, ResponseDeclaration,
};
pub use response::Response;
pub use spec_doc::SpecDocument;
pub use violation::{ContractViolation, ValidationError};
