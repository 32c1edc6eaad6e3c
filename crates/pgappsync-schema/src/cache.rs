//! File-based schema cache shared between the sync and request paths.
//!
//! The sync path introspects the database and writes the schema as JSON; the
//! request path reads that file on cold start instead of introspecting. A
//! missing file always falls back to a full load.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, SchemaError};
use crate::model::Schema;

/// How [`load_schema`] uses the cache file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CacheMode {
    /// Always introspect; never touch the file system.
    #[default]
    None,
    /// Prefer the cached schema when the file exists.
    Read(PathBuf),
    /// Introspect and write the result to the file.
    Write(PathBuf),
}

/// Reads a cached schema. Returns `Ok(None)` when the file does not exist.
///
/// # Errors
///
/// Returns `SchemaError::Cache` when the file cannot be read or decoded.
pub async fn read_cache(path: &Path) -> Result<Option<Schema>> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(SchemaError::cache(path, e)),
    };
    let schema = serde_json::from_slice(&bytes).map_err(|e| SchemaError::cache(path, e))?;
    Ok(Some(schema))
}

/// Writes the schema as JSON, creating parent directories as needed.
///
/// # Errors
///
/// Returns `SchemaError::Cache` on any I/O or encoding failure.
pub async fn write_cache(path: &Path, schema: &Schema) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SchemaError::cache(parent, e))?;
    }
    let json = serde_json::to_vec(schema).map_err(|e| SchemaError::cache(path, e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| SchemaError::cache(path, e))?;
    info!(path = %path.display(), types = schema.types.len(), "Wrote schema cache");
    Ok(())
}

/// Loads the schema, consulting the cache according to `mode`.
///
/// `introspect` is only called when no cached schema is used.
///
/// # Errors
///
/// Propagates errors from `introspect` and cache failures converted into `E`.
pub async fn load_schema<F, Fut, E>(mode: &CacheMode, introspect: F) -> std::result::Result<Schema, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<Schema, E>>,
    E: From<SchemaError>,
{
    if let CacheMode::Read(path) = mode {
        if let Some(schema) = read_cache(path).await? {
            info!(path = %path.display(), types = schema.types.len(), "Loaded schema from cache");
            return Ok(schema);
        }
        debug!(path = %path.display(), "No schema cache, introspecting");
    }

    let schema = introspect().await?;

    if let CacheMode::Write(path) = mode {
        write_cache(path, &schema).await?;
    }
    Ok(schema)
}
