use std::{net::SocketAddr, path::PathBuf, time::Duration};

use pgappsync_appsync::{DEFAULT_POLL_INTERVAL, PlanOptions};
use pgappsync_db_postgres::PostgresConfig;
use pgappsync_schema::{CacheMode, PrintOptions, PruneOptions};
use serde::{Deserialize, Serialize};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pgappsync.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub appsync: AppSyncSettings,
    #[serde(default)]
    pub schema: SchemaSettings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Database validations
        let pg = &self.postgres;
        if pg.host.trim().is_empty() {
            return Err("postgres.host must not be empty".into());
        }
        if pg.database.trim().is_empty() {
            return Err("postgres.database must not be empty".into());
        }
        if pg.user.trim().is_empty() {
            return Err("postgres.user must not be empty".into());
        }
        if pg.port == 0 {
            return Err("postgres.port must be > 0".into());
        }
        if pg.iam_auth && pg.region.as_deref().is_none_or(str::is_empty) {
            return Err("postgres.region is required when postgres.iam_auth is enabled".into());
        }
        if !pg.iam_auth && pg.password.is_none() {
            return Err("postgres.password is required unless postgres.iam_auth is enabled".into());
        }
        if pg.namespaces.is_empty() {
            return Err("postgres.namespaces must list at least one schema".into());
        }
        if pg.connect_timeout_ms == 0 || pg.credential_lifetime_secs == 0 {
            return Err("postgres timeouts must be > 0".into());
        }

        // AppSync validations
        if self.appsync.poll_interval_ms == 0 {
            return Err("appsync.poll_interval_ms must be > 0".into());
        }

        // Server and sync validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.execution_timeout_ms == 0 || self.sync.timeout_ms == 0 {
            return Err("execution and sync timeouts must be > 0".into());
        }
        if self.server.execution_timeout_ms >= self.sync.timeout_ms {
            return Err("server.execution_timeout_ms must be lower than sync.timeout_ms".into());
        }

        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            ));
        }
        Ok(())
    }

    /// Options for building the sync plan.
    #[must_use]
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            api_id: self.appsync.api_id.clone().unwrap_or_default(),
            function_id: self.appsync.function_id.clone().unwrap_or_default(),
            prune: PruneOptions {
                relay_fields: self.schema.prune_relay_fields,
                force_nullable_inputs: self.schema.force_nullable_inputs.clone(),
            },
            print: PrintOptions {
                comment_descriptions: self.schema.comment_descriptions,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSyncSettings {
    /// GraphQL API the schema and resolvers are pushed to.
    #[serde(default)]
    pub api_id: Option<String>,
    /// Pipeline function that forwards requests to the handler.
    #[serde(default)]
    pub function_id: Option<String>,
    /// Region of the API; the AWS default chain is used when unset.
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for AppSyncSettings {
    fn default() -> Self {
        Self {
            api_id: None,
            function_id: None,
            region: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl AppSyncSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// API and function ids, required before anything is pushed.
    pub fn target(&self) -> Result<(&str, &str), String> {
        let api_id = self
            .api_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or("appsync.api_id is required")?;
        let function_id = self
            .function_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or("appsync.function_id is required")?;
        Ok((api_id, function_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSettings {
    /// Schema cache written by `sync` and read by the request handler.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
    /// AppSync rejects block descriptions; keep this on when publishing.
    #[serde(default = "default_true")]
    pub comment_descriptions: bool,
    #[serde(default = "default_true")]
    pub prune_relay_fields: bool,
    #[serde(default = "default_force_nullable_inputs")]
    pub force_nullable_inputs: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_force_nullable_inputs() -> Vec<String> {
    vec!["id".to_string()]
}

impl Default for SchemaSettings {
    fn default() -> Self {
        Self {
            cache_path: None,
            comment_descriptions: true,
            prune_relay_fields: true,
            force_nullable_inputs: default_force_nullable_inputs(),
        }
    }
}

impl SchemaSettings {
    /// Cache mode for the request path.
    pub fn read_mode(&self) -> CacheMode {
        self.cache_path.clone().map_or(CacheMode::None, CacheMode::Read)
    }

    /// Cache mode for the sync path.
    pub fn write_mode(&self) -> CacheMode {
        self.cache_path.clone().map_or(CacheMode::None, CacheMode::Write)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Wall-clock budget of one invocation.
    #[serde(default = "default_execution_timeout_ms")]
    pub execution_timeout_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_execution_timeout_ms() -> u64 {
    28_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            execution_timeout_ms: default_execution_timeout_ms(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid server address {}:{}: {e}", self.host, self.port))
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_millis(self.execution_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Wall-clock budget of a whole sync run.
    #[serde(default = "default_sync_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_sync_timeout_ms() -> u64 {
    290_000
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_sync_timeout_ms(),
        }
    }
}

impl SyncSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, DEFAULT_CONFIG_FILE};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Loads the configuration file layered under `PGAPPSYNC__*` variables.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        match path {
            Some(p) => {
                let pathbuf = PathBuf::from(p);
                if !pathbuf.exists() {
                    return Err(format!("config file not found: {p}"));
                }
                builder = builder.add_source(File::from(pathbuf));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    builder = builder.add_source(File::from(default_path));
                }
            }
        }
        // Environment variable overrides, e.g., PGAPPSYNC__POSTGRES__HOST=db.internal.
        // List keys take comma-separated values: PGAPPSYNC__POSTGRES__NAMESPACES=a,b
        builder = builder.add_source(
            Environment::with_prefix("PGAPPSYNC")
                .try_parsing(true)
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("postgres.namespaces")
                .with_list_parse_key("schema.force_nullable_inputs"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
