//! # pgappsync-appsync
//!
//! Pushes a transformed schema to AWS AppSync and converges its resolvers.
//!
//! A sync run is split in two: [`plan::build_sync_plan`] computes the SDL and
//! every desired resolver without touching the network, then
//! [`reconcile::reconcile`] publishes the SDL, waits for AppSync to accept
//! it and upserts each resolver.
//!
//! Remote calls go through the [`api::AppSyncApi`] trait; [`sdk::SdkAppSync`]
//! implements it with the AWS SDK.

pub mod api;
pub mod error;
pub mod plan;
pub mod publish;
pub mod reconcile;
pub mod resolvers;
pub mod sdk;

pub use api::{AppSyncApi, SchemaCreationStatus, SchemaStatus};
pub use error::{AppSyncError, RemoteError, Result};
pub use plan::{PlanOptions, SyncPlan, build_sync_plan};
pub use publish::{DEFAULT_POLL_INTERVAL, publish_schema};
pub use reconcile::{ReconcileReport, Upsert, reconcile, upsert_resolver};
pub use resolvers::{ResolverConfig, ResolverKind, desired_resolvers};
pub use sdk::SdkAppSync;
