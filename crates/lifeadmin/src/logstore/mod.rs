//! Append-only storage for per-stage audit entries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{HttpConfig, LogStoreConfig};
use crate::db::{self, Database, DatabaseError};
use crate::error::ConfigError;
use crate::integrations::IntegrationError;
use crate::pipeline::StageName;
use crate::retry::RetryPolicy;

pub mod memory;
pub mod sqlite;
pub mod supabase;

pub use memory::MemoryLogStore;
pub use sqlite::SqliteLogStore;
pub use supabase::SupabaseLogStore;

/// One audit record per stage execution. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub run_id: Uuid,
    pub stage: StageName,
    pub input_data: Option<Map<String, Value>>,
    pub output_data: Option<Map<String, Value>>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum LogStoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Remote log store error: {0}")]
    Remote(#[from] IntegrationError),

    #[error("Log store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogStoreError>;
}

/// Builds the configured log store.
pub fn open_log_store(
    config: &LogStoreConfig,
    http_config: &HttpConfig,
    retry: RetryPolicy,
) -> Result<Arc<dyn LogStore>, crate::error::LifeAdminError> {
    match config {
        LogStoreConfig::Sqlite { path } => {
            let path = resolve_database_path(path.as_deref())?;
            let database = Database::open(&path)?;
            Ok(Arc::new(SqliteLogStore::new(database)))
        }
        LogStoreConfig::Supabase { url, key, table } => {
            let url = url.resolve().map_err(|e| ConfigError::Secret {
                name: "logStore.url".to_string(),
                source: e,
            })?;
            let key = key.resolve().map_err(|e| ConfigError::Secret {
                name: "logStore.key".to_string(),
                source: e,
            })?;
            let store = SupabaseLogStore::new(
                url,
                key,
                table,
                Duration::from_secs(http_config.timeout_secs),
                retry,
            )?;
            Ok(Arc::new(store))
        }
        LogStoreConfig::Memory => Ok(Arc::new(MemoryLogStore::new())),
    }
}

pub fn resolve_database_path(configured: Option<&str>) -> Result<PathBuf, ConfigError> {
    match configured {
        Some(path) => Ok(PathBuf::from(path)),
        None => db::default_database_path().ok_or_else(|| ConfigError::Validation {
            message: "Cannot determine home directory for the log database; set logStore.path"
                .to_string(),
        }),
    }
}
