//! Error types for AppSync publication and reconciliation.

use pgappsync_schema::SchemaError;

/// Failure of a single remote API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other service or transport failure.
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum AppSyncError {
    /// AppSync rejected the uploaded schema.
    #[error("Schema creation failed: {details}")]
    SchemaCreationFailed { details: String },

    /// A remote call needed to publish the schema failed.
    #[error("AppSync request failed: {0}")]
    Remote(#[from] RemoteError),

    /// The schema could not be transformed.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Result type alias for AppSync operations.
pub type Result<T> = std::result::Result<T, AppSyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppSyncError::SchemaCreationFailed {
            details: "syntax error at line 4".into(),
        };
        assert_eq!(err.to_string(), "Schema creation failed: syntax error at line 4");

        let err = AppSyncError::from(RemoteError::Other("throttled".into()));
        assert_eq!(err.to_string(), "AppSync request failed: throttled");
        assert!(RemoteError::NotFound("Query.allPosts".into()).is_not_found());
    }
}
