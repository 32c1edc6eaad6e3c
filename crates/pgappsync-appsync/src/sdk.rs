//! [`AppSyncApi`] over the AWS SDK.

use std::error::Error as StdError;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_appsync::Client;
use aws_sdk_appsync::error::{DisplayErrorContext, SdkError};
use aws_sdk_appsync::primitives::Blob;
use aws_sdk_appsync::types::{self as sdk, PipelineConfig};
use aws_types::region::Region;
use tracing::{debug, instrument};

use crate::api::{AppSyncApi, SchemaCreationStatus, SchemaStatus};
use crate::error::RemoteError;
use crate::resolvers::{ResolverConfig, ResolverKind};

/// AppSync control plane client.
#[derive(Debug, Clone)]
pub struct SdkAppSync {
    client: Client,
}

impl SdkAppSync {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Loads AWS configuration from the environment, overriding the region
    /// when one is given.
    pub async fn from_env(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;
        Self::new(Client::new(&config))
    }
}

fn other<E, R>(err: SdkError<E, R>) -> RemoteError
where
    E: StdError + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    RemoteError::Other(DisplayErrorContext(&err).to_string())
}

fn sdk_kind(kind: ResolverKind) -> sdk::ResolverKind {
    match kind {
        ResolverKind::Pipeline => sdk::ResolverKind::Pipeline,
        ResolverKind::Unit => sdk::ResolverKind::Unit,
    }
}

fn pipeline_config(config: &ResolverConfig) -> Option<PipelineConfig> {
    (!config.pipeline_functions.is_empty()).then(|| {
        PipelineConfig::builder()
            .set_functions(Some(config.pipeline_functions.clone()))
            .build()
    })
}

#[async_trait]
impl AppSyncApi for SdkAppSync {
    #[instrument(skip(self, definition))]
    async fn start_schema_creation(
        &self,
        api_id: &str,
        definition: &str,
    ) -> Result<(), RemoteError> {
        self.client
            .start_schema_creation()
            .api_id(api_id)
            .definition(Blob::new(definition.as_bytes()))
            .send()
            .await
            .map_err(other)?;
        Ok(())
    }

    async fn get_schema_creation_status(
        &self,
        api_id: &str,
    ) -> Result<SchemaCreationStatus, RemoteError> {
        let output = self
            .client
            .get_schema_creation_status()
            .api_id(api_id)
            .send()
            .await
            .map_err(other)?;

        let status = match output.status() {
            Some(sdk::SchemaStatus::Success) => SchemaStatus::Success,
            Some(sdk::SchemaStatus::Failed) => SchemaStatus::Failed,
            Some(pending) => SchemaStatus::Pending(pending.as_str().to_string()),
            None => SchemaStatus::Pending("UNKNOWN".to_string()),
        };
        Ok(SchemaCreationStatus {
            status,
            details: output.details().map(str::to_string),
        })
    }

    async fn get_resolver(
        &self,
        api_id: &str,
        type_name: &str,
        field_name: &str,
    ) -> Result<(), RemoteError> {
        let result = self
            .client
            .get_resolver()
            .api_id(api_id)
            .type_name(type_name)
            .field_name(field_name)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_not_found_exception()) =>
            {
                debug!(type_name, field_name, "Resolver does not exist");
                Err(RemoteError::NotFound(format!("{type_name}.{field_name}")))
            }
            Err(err) => Err(other(err)),
        }
    }

    async fn create_resolver(&self, config: &ResolverConfig) -> Result<(), RemoteError> {
        self.client
            .create_resolver()
            .api_id(&config.api_id)
            .type_name(&config.type_name)
            .field_name(&config.field_name)
            .kind(sdk_kind(config.kind))
            .set_data_source_name(config.data_source_name.clone())
            .request_mapping_template(&config.request_template)
            .response_mapping_template(&config.response_template)
            .set_pipeline_config(pipeline_config(config))
            .send()
            .await
            .map_err(other)?;
        Ok(())
    }

    async fn update_resolver(&self, config: &ResolverConfig) -> Result<(), RemoteError> {
        self.client
            .update_resolver()
            .api_id(&config.api_id)
            .type_name(&config.type_name)
            .field_name(&config.field_name)
            .kind(sdk_kind(config.kind))
            .set_data_source_name(config.data_source_name.clone())
            .request_mapping_template(&config.request_template)
            .response_mapping_template(&config.response_template)
            .set_pipeline_config(pipeline_config(config))
            .send()
            .await
            .map_err(other)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::{pipeline_resolver, subscription_resolver};

    #[test]
    fn test_pipeline_config_only_for_pipelines() {
        let pipeline = pipeline_resolver("api", "Query", "allPosts", "fn-1", None);
        let config = pipeline_config(&pipeline).expect("pipeline config");
        assert_eq!(config.functions(), ["fn-1".to_string()]);

        let unit = subscription_resolver("api", "Subscription", "onCreatePost");
        assert!(pipeline_config(&unit).is_none());
        assert_eq!(sdk_kind(unit.kind), sdk::ResolverKind::Unit);
    }
}
