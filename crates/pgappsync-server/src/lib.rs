//! # pgappsync-server
//!
//! Runtime side of pgappsync: the request handler AppSync's pipeline
//! function invokes, and the `sync` command that publishes the schema.
//!
//! - [`resolver`] - Field invocation to pg_graphql operation
//! - [`http`] - `POST /invoke` and `GET /healthz`
//! - [`sync`] - Introspect, plan, publish and reconcile
//! - [`config`] - TOML file plus `PGAPPSYNC__*` environment overrides

pub mod config;
pub mod http;
pub mod observability;
pub mod resolver;
pub mod server;
pub mod sync;

pub use config::AppConfig;
pub use http::{AppState, build_router};
pub use resolver::{AdapterError, InvocationEvent, RequestAdapter};
