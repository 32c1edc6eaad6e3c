//! Single-connection pool with credential expiry.
//!
//! Each process holds at most one pool of at most one connection. The pool
//! is built with a freshly issued credential and carries an explicit expiry;
//! once it passes, the next caller builds a replacement before running any
//! statement.

use std::time::Duration;

use async_trait::async_trait;
use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgConnectOptions, PgPool, PgSslMode, Postgres};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::credentials::CredentialSource;
use crate::error::Result;

/// Type alias for PostgreSQL pool options.
pub type PgPoolOptions = PoolOptions<Postgres>;

/// Pool options: no idle connections kept, one connection at most.
#[must_use]
pub fn pool_options(config: &PostgresConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .min_connections(0)
        .max_connections(1)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
        .test_before_acquire(false)
}

/// Connection options for the given password.
#[must_use]
pub fn connect_options(config: &PostgresConfig, password: &str) -> PgConnectOptions {
    let ssl_mode = if config.require_tls {
        PgSslMode::Require
    } else {
        PgSslMode::Prefer
    };
    PgConnectOptions::new_without_pgpass()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(password)
        .ssl_mode(ssl_mode)
        .application_name("pgappsync")
}

/// Opens a pool from prepared options.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, pool: PgPoolOptions, options: PgConnectOptions) -> Result<PgPool>;
}

/// Connects immediately so a bad credential fails the call that issued it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EagerConnector;

#[async_trait]
impl Connector for EagerConnector {
    async fn connect(&self, pool: PgPoolOptions, options: PgConnectOptions) -> Result<PgPool> {
        Ok(pool.connect_with(options).await?)
    }
}

/// A pool and the instant its credential stops being trusted.
#[derive(Debug)]
struct ActiveConnection {
    pool: PgPool,
    expires_at: Instant,
}

impl ActiveConnection {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Owns the process-wide pool and renews it when its credential expires.
pub struct ConnectionManager {
    config: PostgresConfig,
    credentials: Box<dyn CredentialSource>,
    connector: Box<dyn Connector>,
    state: Mutex<Option<ActiveConnection>>,
}

impl ConnectionManager {
    #[must_use]
    pub fn new(config: PostgresConfig, credentials: Box<dyn CredentialSource>) -> Self {
        Self::with_connector(config, credentials, Box::new(EagerConnector))
    }

    #[must_use]
    pub fn with_connector(
        config: PostgresConfig,
        credentials: Box<dyn CredentialSource>,
        connector: Box<dyn Connector>,
    ) -> Self {
        Self {
            config,
            credentials,
            connector,
            state: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PostgresConfig {
        &self.config
    }

    fn lifetime(&self) -> Duration {
        Duration::from_secs(self.config.credential_lifetime_secs)
    }

    /// Returns the active pool, connecting with a fresh credential when
    /// there is none or the current one has expired.
    ///
    /// The expiry check and the replacement happen under one lock, so no
    /// caller receives a pool whose credential is being replaced.
    ///
    /// # Errors
    ///
    /// Returns credential and connection errors unchanged.
    #[instrument(skip(self), fields(url = %self.config.masked_url()))]
    pub async fn pool(&self) -> Result<PgPool> {
        let mut state = self.state.lock().await;

        if let Some(active) = state.as_ref()
            && !active.is_expired(Instant::now())
        {
            return Ok(active.pool.clone());
        }

        let reason = if state.is_some() { "expired" } else { "uninitialized" };
        info!(reason, "Connecting to PostgreSQL");

        let password = self.credentials.password().await?;
        let pool = self
            .connector
            .connect(pool_options(&self.config), connect_options(&self.config, &password))
            .await?;
        let expires_at = Instant::now() + self.lifetime();

        if let Some(old) = state.replace(ActiveConnection {
            pool: pool.clone(),
            expires_at,
        }) {
            // In-flight statements keep their clone; close once they finish.
            tokio::spawn(async move { old.pool.close().await });
        }

        debug!(lifetime_secs = self.config.credential_lifetime_secs, "PostgreSQL pool active");
        Ok(pool)
    }

    /// True when a pool exists and its credential has not expired.
    pub async fn is_active(&self) -> bool {
        self.state
            .lock()
            .await
            .as_ref()
            .is_some_and(|active| !active.is_expired(Instant::now()))
    }

    /// Closes the active pool; the next [`pool`](Self::pool) call reconnects.
    pub async fn close(&self) {
        if let Some(active) = self.state.lock().await.take() {
            active.pool.close().await;
            info!("PostgreSQL pool closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PostgresError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingSource;

    struct CountingSource(Arc<AtomicUsize>);

    #[async_trait]
    impl CredentialSource for CountingSource {
        async fn password(&self) -> Result<String> {
            let issued = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("token-{issued}"))
        }
    }

    /// Builds the pool without opening a connection.
    struct LazyConnector;

    #[async_trait]
    impl Connector for LazyConnector {
        async fn connect(&self, pool: PgPoolOptions, options: PgConnectOptions) -> Result<PgPool> {
            Ok(pool.connect_lazy_with(options))
        }
    }

    #[async_trait]
    impl CredentialSource for FailingSource {
        async fn password(&self) -> Result<String> {
            Err(PostgresError::credentials("token service unavailable"))
        }
    }

    #[test]
    fn test_pool_options() {
        let options = pool_options(&PostgresConfig::default());
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 0);
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_connect_options() {
        let config = PostgresConfig {
            host: "proxy.internal".into(),
            database: "blog".into(),
            user: "app".into(),
            ..PostgresConfig::default()
        };
        let options = connect_options(&config, "token");
        assert_eq!(options.get_host(), "proxy.internal");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("blog"));
        assert_eq!(options.get_username(), "app");
        assert!(matches!(options.get_ssl_mode(), PgSslMode::Require));
    }

    #[tokio::test]
    async fn test_expiry() {
        let pool = pool_options(&PostgresConfig::default())
            .connect_lazy_with(connect_options(&PostgresConfig::default(), "unused"));
        let now = Instant::now();
        let active = ActiveConnection {
            pool,
            expires_at: now + Duration::from_secs(840),
        };
        assert!(!active.is_expired(now));
        assert!(!active.is_expired(now + Duration::from_secs(839)));
        assert!(active.is_expired(now + Duration::from_secs(840)));
    }

    #[tokio::test]
    async fn test_credential_error_leaves_manager_uninitialized() {
        let manager = ConnectionManager::new(PostgresConfig::default(), Box::new(FailingSource));
        let err = manager.pool().await.expect_err("credential failure");
        assert!(matches!(err, PostgresError::Credentials { .. }));
        assert!(!manager.is_active().await);
        manager.close().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_renewed_once_credential_expires() {
        let issued = Arc::new(AtomicUsize::new(0));
        let config = PostgresConfig {
            credential_lifetime_secs: 840,
            ..PostgresConfig::default()
        };
        let manager = ConnectionManager::with_connector(
            config,
            Box::new(CountingSource(issued.clone())),
            Box::new(LazyConnector),
        );
        assert!(!manager.is_active().await);

        manager.pool().await.expect("first pool");
        assert_eq!(issued.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(839)).await;
        manager.pool().await.expect("reused pool");
        assert_eq!(issued.load(Ordering::SeqCst), 1);
        assert!(manager.is_active().await);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!manager.is_active().await);
        manager.pool().await.expect("renewed pool");
        assert_eq!(issued.load(Ordering::SeqCst), 2);
        assert!(manager.is_active().await);

        manager.pool().await.expect("renewed pool reused");
        assert_eq!(issued.load(Ordering::SeqCst), 2);
        manager.close().await;
        assert!(!manager.is_active().await);
    }
}
