use std::time::Duration;

use pgappsync_db_postgres::PostgresError;
use pgappsync_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    /// The GraphQL engine reported errors; carries the first message.
    #[error("{message}")]
    Execution { message: String },

    #[error("invocation did not finish within {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] PostgresError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl AdapterError {
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Error type reported to AppSync.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Execution { .. } => "ExecutionError",
            Self::Timeout(_) => "TimeoutError",
            Self::Database(_) => "DatabaseError",
            Self::Schema(_) => "SchemaError",
        }
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;
