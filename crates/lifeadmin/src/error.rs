use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifeAdminError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline setup error: {0}")]
    Setup(#[from] SetupError),

    #[error("Integration error: {0}")]
    Integration(#[from] crate::integrations::IntegrationError),

    #[error("Log store error: {0}")]
    LogStore(#[from] crate::logstore::LogStoreError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },

    #[error("Secret for '{name}' could not be resolved: {source}")]
    Secret {
        name: String,
        #[source]
        source: crate::secrets::SecretError,
    },
}

/// Failure to start a pipeline run. Raised before any stage executes and
/// never recorded on the pipeline state.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Input file '{path}' does not exist")]
    NotFound { path: PathBuf },

    #[error("Input reference '{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    #[error("Failed to open input file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Worker channel closed unexpectedly")]
    ChannelClosed,

    #[error("Directory scan failed for '{path}': {source}")]
    ScanFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, LifeAdminError>;
