//! Request input aggregation and declarative validation.
//!
//! This crate decorates an inbound HTTP request for handler code:
//! - **Aggregation**: query parameters, body parameters, uploaded files and a
//!   JSON body are merged into one ordered map
//! - **Validation**: the merged input is checked against a declarative
//!   [`RuleSet`] by a pluggable [`Validator`]
//! - **Accessors**: projections (`only`, `except`, `has`), path lookups and
//!   content negotiation helpers
//!
//! # Core Types
//!
//! - [`FormRequest`]: The request wrapper handed to handlers
//! - [`RequestSource`]: What the wrapper needs from a framework request
//! - [`RawRequest`]: An owned `RequestSource`
//! - [`RequestRules`]: Supplies the rule schema and an optional post-validation hook
//! - [`RuleValidator`]: The built-in validation engine
//! - [`PropertyPath`]: Nested reads and writes used for grouped errors
//!
//! # Examples
//!
//! ```
//! use form_request::{Constraint, FormRequest, RawRequest, RequestRules, RuleSet};
//! use serde_json::json;
//!
//! struct CreateUser;
//!
//! impl RequestRules for CreateUser {
//!     fn rules(&self) -> RuleSet {
//!         RuleSet::new()
//!             .field("name", [Constraint::NotBlank])
//!             .optional("age", [Constraint::Range { min: Some(18.0), max: None }])
//!     }
//! }
//!
//! let raw = RawRequest::builder()
//!     .header("Accept", "application/json")
//!     .json(&json!({"name": "Alice", "age": 30}))
//!     .build();
//!
//! let mut form = FormRequest::with_default_validator(&raw, CreateUser);
//! assert!(form.is_valid());
//! assert!(form.wants_json());
//! assert!(form.has(["name", "age"]));
//!
//! // Re-validate with a stricter schema
//! let strict = RuleSet::new().field("email", [Constraint::NotBlank]);
//! assert!(!form.validate_with(&strict).is_valid());
//! assert_eq!(form.errors()["email"], json!(["This field is missing."]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod constraint;
mod error;
mod form;
mod input;
mod logging;
mod property_path;
mod request;
mod rules;
mod validator;
mod violation;

pub use constraint::{Constraint, ValueType};
pub use error::{Error, Result};
pub use form::{FormRequest, NoRules, RequestRules, ValidationState};
pub use logging::RequestLog;
pub use property_path::PropertyPath;
pub use request::{
    is_json_media_type, parse_accept, HttpMethod, RawRequest, RawRequestBuilder, RequestSource,
    UploadedFile,
};
pub use rules::{FieldRules, RuleSet};
pub use validator::{RuleValidator, Validator};
pub use violation::{Violation, ViolationList};
