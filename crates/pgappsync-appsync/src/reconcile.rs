//! Resolver reconciliation against the live API.
//!
//! Each resolver is fetched first: an existing one is updated, a missing one
//! is created. Any other failure is logged and the field is skipped, so a
//! run converges as far as it can instead of stopping at the first error.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::AppSyncApi;
use crate::error::{RemoteError, Result};
use crate::plan::SyncPlan;
use crate::publish::publish_schema;
use crate::resolvers::ResolverConfig;

/// Outcome of a reconciliation run, by `Type.field`.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
}

/// What [`upsert_resolver`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created,
    Updated,
}

/// Updates the resolver when it exists, creates it when it does not.
///
/// # Errors
///
/// Returns the remote error of any call other than a not-found lookup.
pub async fn upsert_resolver(
    api: &dyn AppSyncApi,
    config: &ResolverConfig,
) -> std::result::Result<Upsert, RemoteError> {
    match api
        .get_resolver(&config.api_id, &config.type_name, &config.field_name)
        .await
    {
        Ok(()) => {
            api.update_resolver(config).await?;
            Ok(Upsert::Updated)
        }
        Err(RemoteError::NotFound(_)) => {
            api.create_resolver(config).await?;
            Ok(Upsert::Created)
        }
        Err(other) => Err(other),
    }
}

/// Publishes the plan's schema, then upserts every resolver in plan order.
///
/// # Errors
///
/// Only schema publication errors abort the run; resolver failures are
/// recorded in [`ReconcileReport::skipped`].
pub async fn reconcile(
    api: &dyn AppSyncApi,
    plan: &SyncPlan,
    poll_interval: Duration,
) -> Result<ReconcileReport> {
    publish_schema(api, &plan.api_id, &plan.sdl, poll_interval).await?;

    let mut report = ReconcileReport::default();
    for config in &plan.resolvers {
        let coordinate = config.coordinate();
        match upsert_resolver(api, config).await {
            Ok(Upsert::Created) => {
                info!(resolver = %coordinate, "Created resolver");
                report.created.push(coordinate);
            }
            Ok(Upsert::Updated) => {
                info!(resolver = %coordinate, "Updated resolver");
                report.updated.push(coordinate);
            }
            Err(e) => {
                warn!(resolver = %coordinate, error = %e, "Skipping resolver");
                report.skipped.push(coordinate);
            }
        }
    }

    info!(
        api_id = %plan.api_id,
        created = report.created.len(),
        updated = report.updated.len(),
        skipped = report.skipped.len(),
        "Resolvers reconciled"
    );

    Ok(report)
}
