//! JSON-Schema-subset validator for graph node writes (spec 4.K).

pub mod error;
pub mod registry;
pub mod validator;

pub use error::{FieldError, SchemaValidationError};
pub use registry::SchemaRegistry;
pub use validator::{validate, ValidationMode};
