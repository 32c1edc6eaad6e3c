//! Connection settings for the PostgreSQL database behind the API.

use serde::{Deserialize, Serialize};

/// Configuration for the database connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,

    /// Static password. Ignored when `iam_auth` is enabled.
    pub password: Option<String>,

    /// Authenticate with short-lived RDS IAM tokens instead of a password.
    pub iam_auth: bool,

    /// AWS region used to sign IAM tokens.
    pub region: Option<String>,

    /// Database schemas exposed through GraphQL, in search path order.
    pub namespaces: Vec<String>,

    /// Connection timeout in milliseconds.
    pub connect_timeout_ms: u64,

    /// Idle connections are closed after this many milliseconds.
    pub idle_timeout_ms: u64,

    /// How long a connection pool is used before its credential is renewed.
    /// Must stay below the 15 minute validity of an IAM token.
    pub credential_lifetime_secs: u64,

    /// Refuse unencrypted connections.
    pub require_tls: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            database: "postgres".into(),
            user: "postgres".into(),
            password: None,
            iam_auth: false,
            region: None,
            namespaces: vec!["public".into()],
            connect_timeout_ms: 5000,
            idle_timeout_ms: 1000,
            credential_lifetime_secs: 14 * 60,
            require_tls: true,
        }
    }
}

impl PostgresConfig {
    /// Connection target for logging, password masked.
    #[must_use]
    pub fn masked_url(&self) -> String {
        format!(
            "postgres://{}:****@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }

    #[must_use]
    pub fn with_namespaces(mut self, namespaces: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.namespaces = namespaces.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}
