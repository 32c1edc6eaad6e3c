//! The slice of the AppSync control plane a sync run needs.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::resolvers::ResolverConfig;

/// State of the most recent schema upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Still being processed; carries the raw status name.
    Pending(String),
    Success,
    Failed,
}

impl SchemaStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaCreationStatus {
    pub status: SchemaStatus,
    pub details: Option<String>,
}

/// Remote AppSync operations used by publication and reconciliation.
///
/// `get_resolver` signals a missing resolver with [`RemoteError::NotFound`].
#[async_trait]
pub trait AppSyncApi: Send + Sync {
    async fn start_schema_creation(&self, api_id: &str, definition: &str)
    -> Result<(), RemoteError>;

    async fn get_schema_creation_status(
        &self,
        api_id: &str,
    ) -> Result<SchemaCreationStatus, RemoteError>;

    async fn get_resolver(
        &self,
        api_id: &str,
        type_name: &str,
        field_name: &str,
    ) -> Result<(), RemoteError>;

    async fn create_resolver(&self, config: &ResolverConfig) -> Result<(), RemoteError>;

    async fn update_resolver(&self, config: &ResolverConfig) -> Result<(), RemoteError>;
}
