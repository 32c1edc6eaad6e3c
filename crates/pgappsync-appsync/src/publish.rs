//! Schema upload with status polling.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::api::{AppSyncApi, SchemaStatus};
use crate::error::{AppSyncError, Result};

/// Interval between schema status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Uploads the SDL and waits until AppSync reports a terminal status.
///
/// # Errors
///
/// Returns `AppSyncError::SchemaCreationFailed` with AppSync's details when
/// processing fails, and `AppSyncError::Remote` when a call fails.
#[instrument(skip(api, definition), fields(bytes = definition.len()))]
pub async fn publish_schema(
    api: &dyn AppSyncApi,
    api_id: &str,
    definition: &str,
    poll_interval: Duration,
) -> Result<()> {
    api.start_schema_creation(api_id, definition).await?;
    info!("Started schema creation");

    loop {
        let status = api.get_schema_creation_status(api_id).await?;
        match status.status {
            SchemaStatus::Success => {
                info!("Schema creation succeeded");
                return Ok(());
            }
            SchemaStatus::Failed => {
                return Err(AppSyncError::SchemaCreationFailed {
                    details: status.details.unwrap_or_default(),
                });
            }
            SchemaStatus::Pending(state) => {
                debug!(%state, "Schema creation in progress");
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}
