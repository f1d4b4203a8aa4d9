//! Collaborator contracts and their HTTP implementations.
//!
//! The pipeline only depends on the traits in this module. Each concrete
//! client wraps one third-party API and applies the shared
//! [`RetryPolicy`](crate::retry::RetryPolicy).

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::task::ParsedTask;

pub mod error;
pub mod groq;
pub mod http;
pub mod ocr_space;
pub mod onesignal;
pub mod sendgrid;
pub mod todoist;

pub use error::IntegrationError;
pub use groq::GroqClassifier;
pub use ocr_space::OcrSpaceClient;
pub use onesignal::OneSignalClient;
pub use sendgrid::SendGridClient;
pub use todoist::TodoistClient;

/// Text pulled from an uploaded file by the OCR service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrExtraction {
    pub parsed_text: String,
    pub exit_code: Option<i64>,
    /// Full provider response, kept for auditing.
    pub response: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    /// 1 (low) through 4 (urgent).
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReceipt {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub status: u16,
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub heading: String,
    pub message: String,
    /// External user id of the recipient.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    pub id: Option<String>,
    pub recipients: Option<u64>,
}

#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<OcrExtraction, IntegrationError>;
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classifies OCR text. The returned task's `email` may be empty when
    /// the document carries no address.
    async fn classify(&self, text: &str) -> Result<ParsedTask, IntegrationError>;
}

#[async_trait]
pub trait TaskCreator: Send + Sync {
    async fn create(&self, task: &NewTask) -> Result<TaskReceipt, IntegrationError>;
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailReceipt, IntegrationError>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(&self, push: &PushNotification) -> Result<PushReceipt, IntegrationError>;
}
