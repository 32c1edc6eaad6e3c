//! PostgreSQL access for pgappsync.
//!
//! The database exposes its GraphQL API through the `pg_graphql` extension.
//! This crate owns everything between a process and that extension:
//!
//! - [`config`]: Connection settings
//! - [`credentials`]: Static passwords and RDS IAM auth tokens
//! - [`pool`]: The expiring single-connection pool
//! - [`graphql`]: Introspection and execution via `graphql.resolve`
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```ignore
//! use pgappsync_db_postgres::{ConnectionManager, PgGraphql, PostgresConfig, credential_source};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PostgresConfig::default().with_password("postgres");
//! let manager = ConnectionManager::new(config.clone(), credential_source(&config).await?);
//! let graphql = PgGraphql::new(&config.namespaces);
//!
//! let pool = manager.pool().await?;
//! let response = graphql
//!     .execute(&pool, "{ __typename }", &serde_json::json!({}), &Default::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod error;
pub mod graphql;
pub mod pool;

pub use config::PostgresConfig;
pub use credentials::{CredentialSource, RdsIamAuth, StaticPassword, credential_source};
pub use error::{PostgresError, Result};
pub use graphql::{PgGraphql, Settings, first_error};
pub use pool::{ConnectionManager, Connector, EagerConnector};
