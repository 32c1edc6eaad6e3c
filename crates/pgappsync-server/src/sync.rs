//! The `sync` command: introspect, plan, publish, reconcile.

use anyhow::{Context, anyhow};
use pgappsync_appsync::{
    AppSyncApi, ReconcileReport, SdkAppSync, SyncPlan, build_sync_plan, reconcile,
};
use pgappsync_schema::Schema;
use tracing::info;

use crate::config::AppConfig;
use crate::resolver::{PostgresBackend, SchemaBackend};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Build and print the plan without calling AppSync.
    pub dry_run: bool,
    /// Print the SDL that is published.
    pub print_sdl: bool,
}

/// Runs a full sync within the configured timeout.
pub async fn run_sync(config: &AppConfig, options: SyncOptions) -> anyhow::Result<()> {
    let timeout = config.sync.timeout();
    tokio::time::timeout(timeout, sync(config, options))
        .await
        .map_err(|_| anyhow!("sync did not finish within {timeout:?}"))?
}

async fn sync(config: &AppConfig, options: SyncOptions) -> anyhow::Result<()> {
    if !options.dry_run {
        config.appsync.target().map_err(anyhow::Error::msg)?;
    }

    let schema = introspect(config).await?;
    let plan = build_sync_plan(&schema, &config.plan_options()).context("building sync plan")?;

    if options.print_sdl || options.dry_run {
        println!("{}", plan.sdl);
    }
    if options.dry_run {
        println!("{}", serde_json::to_string_pretty(&plan.resolvers)?);
        return Ok(());
    }

    let api = SdkAppSync::from_env(config.appsync.region.clone()).await;
    let report = push(&api, &plan, config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Loads the schema from the database, refreshing the cache file.
async fn introspect(config: &AppConfig) -> anyhow::Result<Schema> {
    let backend = PostgresBackend::from_config(&config.postgres, config.schema.write_mode())
        .await
        .context("configuring database backend")?;
    let schema = backend.load_schema().await;
    backend.close().await;
    let schema = schema.context("introspecting database schema")?;
    info!(types = schema.types.len(), "Introspected database schema");
    Ok(schema)
}

/// Publishes the plan and reconciles its resolvers.
async fn push(
    api: &dyn AppSyncApi,
    plan: &SyncPlan,
    config: &AppConfig,
) -> anyhow::Result<ReconcileReport> {
    let report = reconcile(api, plan, config.appsync.poll_interval())
        .await
        .with_context(|| format!("syncing AppSync API {}", plan.api_id))?;
    if !report.skipped.is_empty() {
        tracing::warn!(skipped = ?report.skipped, "Some resolvers were not reconciled");
    }
    Ok(report)
}
