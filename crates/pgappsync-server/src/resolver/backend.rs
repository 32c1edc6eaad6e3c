//! Where schemas come from and documents are executed.

use async_trait::async_trait;
use pgappsync_db_postgres::{
    ConnectionManager, PgGraphql, PostgresConfig, Settings, credential_source,
};
use pgappsync_schema::{CacheMode, INTROSPECTION_QUERY, Schema, load_schema};
use serde_json::Value;
use tracing::{info, instrument};

use super::error::Result;

/// One operation to run with its variables and request settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub document: String,
    pub variables: Value,
    pub settings: Settings,
}

#[async_trait]
pub trait SchemaBackend: Send + Sync {
    /// Loads the schema the backend serves.
    async fn load_schema(&self) -> Result<Schema>;

    /// Executes a request and returns the raw GraphQL response.
    async fn execute(&self, request: &ExecutionRequest) -> Result<Value>;
}

/// pg_graphql behind a credential-rotating connection pool.
pub struct PostgresBackend {
    connections: ConnectionManager,
    graphql: PgGraphql,
    cache: CacheMode,
}

impl PostgresBackend {
    pub fn new(connections: ConnectionManager, cache: CacheMode) -> Self {
        let graphql = PgGraphql::new(&connections.config().namespaces);
        Self {
            connections,
            graphql,
            cache,
        }
    }

    /// Picks the credential source for `config` and wraps it in a lazily
    /// connecting pool.
    pub async fn from_config(config: &PostgresConfig, cache: CacheMode) -> Result<Self> {
        let credentials = credential_source(config).await?;
        info!(target_db = %config.masked_url(), iam_auth = config.iam_auth, "Configured database backend");
        Ok(Self::new(
            ConnectionManager::new(config.clone(), credentials),
            cache,
        ))
    }

    #[instrument(skip(self))]
    async fn introspect(&self) -> Result<Schema> {
        let pool = self.connections.pool().await?;
        let response = self.graphql.introspect(&pool, INTROSPECTION_QUERY).await?;
        Ok(Schema::from_introspection(&response)?)
    }

    /// Releases the database connection.
    pub async fn close(&self) {
        self.connections.close().await;
    }
}

#[async_trait]
impl SchemaBackend for PostgresBackend {
    async fn load_schema(&self) -> Result<Schema> {
        load_schema(&self.cache, || self.introspect()).await
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<Value> {
        let pool = self.connections.pool().await?;
        let response = self
            .graphql
            .execute(&pool, &request.document, &request.variables, &request.settings)
            .await?;
        Ok(response)
    }
}
