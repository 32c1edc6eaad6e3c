//! # pgappsync-schema
//!
//! GraphQL schema model and the transformations that turn a
//! database-introspected schema into one AWS AppSync accepts.
//!
//! ## Pipeline
//!
//! The sync path works on a clone of the introspected schema:
//!
//! 1. [`prune::prune_schema`] drops relay plumbing fields
//! 2. [`mapper::map_scalars`] rewrites database scalars to AppSync scalars
//! 3. [`wrappers::detect_wrappers`] records mutation payload wrappers
//! 4. [`subscriptions::install_subscriptions`] adds one subscription per mutation
//! 5. [`wrappers::unwrap_payloads`] retypes wrapped mutation results
//! 6. [`printer::to_appsync_sdl`] renders the upload SDL
//!
//! The request path keeps the unmodified schema: [`args::FieldArgSpecs`] is
//! built from it so generated operations declare the types the database
//! engine expects.
//!
//! ## Modules
//!
//! - [`model`] - Schema, types, fields and type references
//! - [`introspection`] - Introspection query and result decoding
//! - [`cache`] - Schema cache artifact
//! - [`error`] - Error types

pub mod args;
pub mod cache;
pub mod error;
pub mod introspection;
pub mod mapper;
pub mod model;
pub mod printer;
pub mod prune;
pub mod subscriptions;
pub mod wrappers;

pub use args::{FieldArgSpec, FieldArgSpecs, FieldKey};
pub use cache::{CacheMode, load_schema};
pub use error::{Result, SchemaError};
pub use introspection::INTROSPECTION_QUERY;
pub use mapper::map_scalars;
pub use model::{Field, InputValue, Schema, TypeDefinition, TypeKind, TypeRef};
pub use printer::{PrintOptions, print_schema, to_appsync_sdl};
pub use prune::{PruneOptions, prune_schema};
pub use subscriptions::{install_subscriptions, synthesize_subscriptions};
pub use wrappers::{Wrapper, WrapperMap, detect_wrappers, unwrap_payloads, wrapper_for};
