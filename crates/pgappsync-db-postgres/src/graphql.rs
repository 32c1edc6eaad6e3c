//! GraphQL execution through the `pg_graphql` extension.
//!
//! Every call runs in its own transaction: the search path is set to the
//! exposed namespaces, request settings are applied with transaction-local
//! `set_config`, then `graphql.resolve` produces the response.

use indexmap::IndexMap;
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_scalar::query_scalar;
use sqlx_postgres::{PgPool, PgTransaction};
use tracing::{debug, instrument};

use crate::error::{PostgresError, Result};

/// Flattened request settings, applied as transaction-local configuration.
pub type Settings = IndexMap<String, String>;

const SET_CONFIG: &str = "select set_config($1, $2, true)";
const RESOLVE: &str = "select graphql.resolve(query := $1, variables := $2)";

/// Entry point into `graphql.resolve` for a set of namespaces.
#[derive(Debug, Clone)]
pub struct PgGraphql {
    search_path: String,
}

impl PgGraphql {
    #[must_use]
    pub fn new(namespaces: &[String]) -> Self {
        Self {
            search_path: search_path(namespaces),
        }
    }

    #[must_use]
    pub fn search_path(&self) -> &str {
        &self.search_path
    }

    /// Runs an introspection query and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns database errors, or `PostgresError::Response` when the
    /// response carries GraphQL errors.
    #[instrument(skip(self, pool, document))]
    pub async fn introspect(&self, pool: &PgPool, document: &str) -> Result<Value> {
        let response = self
            .execute(pool, document, &Value::Object(Default::default()), &Settings::new())
            .await?;
        if let Some(message) = first_error(&response) {
            return Err(PostgresError::response(message));
        }
        Ok(response)
    }

    /// Executes a GraphQL document with variables and request settings.
    ///
    /// GraphQL errors are part of the returned response, not an `Err`.
    ///
    /// # Errors
    ///
    /// Returns database errors unchanged.
    #[instrument(skip_all, fields(settings = settings.len()))]
    pub async fn execute(
        &self,
        pool: &PgPool,
        document: &str,
        variables: &Value,
        settings: &Settings,
    ) -> Result<Value> {
        let mut tx = pool.begin().await?;
        self.prepare(&mut tx, settings).await?;

        let response: Value = query_scalar(RESOLVE)
            .bind(document)
            .bind(variables)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(has_errors = first_error(&response).is_some(), "Resolved GraphQL document");
        Ok(response)
    }

    async fn prepare(&self, tx: &mut PgTransaction<'_>, settings: &Settings) -> Result<()> {
        query(SET_CONFIG)
            .bind("search_path")
            .bind(&self.search_path)
            .execute(&mut **tx)
            .await?;
        for (key, value) in settings {
            query(SET_CONFIG)
                .bind(key)
                .bind(value)
                .execute(&mut **tx)
                .await?;
        }
        Ok(())
    }
}

/// Quoted, comma separated search path for the namespaces.
#[must_use]
pub fn search_path(namespaces: &[String]) -> String {
    namespaces
        .iter()
        .map(|n| format!("\"{}\"", n.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Message of the first entry in a GraphQL response's `errors`.
#[must_use]
pub fn first_error(response: &Value) -> Option<String> {
    let errors = response.get("errors")?.as_array()?;
    let first = errors.first()?;
    Some(
        first
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| first.to_string(), str::to_string),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_path_quotes_namespaces() {
        let namespaces = vec!["app".to_string(), "odd\"name".to_string()];
        assert_eq!(search_path(&namespaces), r#""app", "odd""name""#);
        assert_eq!(PgGraphql::new(&namespaces).search_path(), r#""app", "odd""name""#);
    }

    #[test]
    fn test_first_error() {
        let response = json!({
            "data": null,
            "errors": [
                { "message": "permission denied for table post" },
                { "message": "second" }
            ]
        });
        assert_eq!(
            first_error(&response).as_deref(),
            Some("permission denied for table post")
        );
        assert_eq!(first_error(&json!({ "data": {} })), None);
        assert_eq!(first_error(&json!({ "errors": [] })), None);
    }
}
