use std::sync::Arc;
use std::time::Duration;

use pgappsync_schema::{FieldArgSpecs, Schema};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::backend::{ExecutionRequest, SchemaBackend};
use super::document::{build_document, extract_field};
use super::error::{AdapterError, Result};
use super::event::InvocationEvent;
use super::settings::request_settings;

/// Schema and argument specs, loaded once per process.
#[derive(Debug)]
pub struct LoadedSchema {
    pub schema: Schema,
    pub arg_specs: FieldArgSpecs,
}

/// Answers field invocations against a [`SchemaBackend`].
pub struct RequestAdapter {
    backend: Arc<dyn SchemaBackend>,
    loaded: OnceCell<LoadedSchema>,
    timeout: Duration,
}

impl RequestAdapter {
    pub fn new(backend: Arc<dyn SchemaBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            loaded: OnceCell::new(),
            timeout,
        }
    }

    /// Loads the schema on first use. Concurrent first calls share one load;
    /// a failed load is retried by the next call.
    pub async fn loaded(&self) -> Result<&LoadedSchema> {
        self.loaded
            .get_or_try_init(|| async {
                let schema = self.backend.load_schema().await?;
                let arg_specs = FieldArgSpecs::from_schema(&schema);
                info!(
                    types = schema.types.len(),
                    fields_with_args = arg_specs.len(),
                    "Schema loaded"
                );
                Ok::<_, AdapterError>(LoadedSchema { schema, arg_specs })
            })
            .await
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    /// Resolves one field invocation within the execution timeout.
    ///
    /// # Errors
    ///
    /// `AdapterError::Execution` carries the first GraphQL error;
    /// `AdapterError::Timeout` is returned when the budget runs out.
    pub async fn handle(&self, event: &InvocationEvent) -> Result<Value> {
        tokio::time::timeout(self.timeout, self.resolve(event))
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout))?
    }

    #[instrument(skip_all, fields(field = %event.coordinate()))]
    async fn resolve(&self, event: &InvocationEvent) -> Result<Value> {
        let loaded = self.loaded().await?;

        let request = ExecutionRequest {
            document: build_document(event, &loaded.arg_specs),
            variables: event.variables(),
            settings: request_settings(event),
        };
        debug!(document = %request.document, settings = request.settings.len(), "Executing");

        let response = self.backend.execute(&request).await?;
        extract_field(&response, &event.info.field_name, event.wrapper())
    }
}
