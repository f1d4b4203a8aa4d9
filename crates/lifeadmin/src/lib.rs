//! LifeAdmin turns an uploaded bill, invoice, receipt or subscription notice
//! into a follow-up action. Each upload runs through OCR, classification and
//! a routing decision, then creates a task, sends a reminder email or pushes
//! a notification. Every stage leaves an audit entry in the log store.

pub mod compose;
pub mod config;
pub mod db;
pub mod error;
pub mod integrations;
pub mod logstore;
pub mod pipeline;
pub mod retry;
pub mod sanitize;
pub mod secrets;
pub mod task;
pub mod telemetry;
pub mod worker;

pub use config::{load_config, load_config_or_default, Config};
pub use error::{ConfigError, LifeAdminError, Result, SetupError, WorkerError};
pub use logstore::{LogEntry, LogStore, LogStoreError};
pub use pipeline::{
    ActionKind, ActionReceipt, Collaborators, Pipeline, PipelineConfig, PipelineState, StageName,
};
pub use retry::RetryPolicy;
pub use secrets::{resolve_secret, SecretError, SecretRef};
pub use task::{ParsedTask, TaskType};
