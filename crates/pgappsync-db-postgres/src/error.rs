//! Error types for database access.

/// Errors raised while connecting to PostgreSQL or running GraphQL in it.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// A database credential could not be obtained.
    #[error("Credential error: {message}")]
    Credentials { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// `graphql.resolve` returned something other than a GraphQL response.
    #[error("Unexpected GraphQL response: {message}")]
    Response { message: String },
}

impl PostgresError {
    #[must_use]
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
