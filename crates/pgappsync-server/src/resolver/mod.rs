//! Request execution: turns one AppSync field invocation into a single
//! pg_graphql operation and returns the field's value.
//!
//! ```text
//! InvocationEvent -> build_document + request_settings -> SchemaBackend::execute -> extract_field
//! ```

pub mod adapter;
pub mod backend;
pub mod document;
pub mod error;
pub mod event;
pub mod settings;

pub use adapter::{LoadedSchema, RequestAdapter};
pub use backend::{ExecutionRequest, PostgresBackend, SchemaBackend};
pub use document::{build_document, extract_field};
pub use error::{AdapterError, Result};
pub use event::{FieldInfo, InvocationEvent, Stash};
pub use settings::{flatten_settings, request_settings};
