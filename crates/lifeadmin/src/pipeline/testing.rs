//! Recording collaborators for unit tests.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::integrations::{
    Classifier, EmailReceipt, EmailSender, IntegrationError, NewTask, OcrExtraction,
    OcrProvider, OutgoingEmail, PushNotification, PushReceipt, PushSender, TaskCreator,
    TaskReceipt,
};
use crate::logstore::{LogEntry, LogStore, LogStoreError};
use crate::task::ParsedTask;

fn unavailable(service: &str) -> IntegrationError {
    IntegrationError::Status {
        service: service.to_string(),
        status: 503,
        body: "unavailable".to_string(),
    }
}

pub struct FakeOcr {
    text: Option<String>,
}

impl FakeOcr {
    pub fn returning(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { text: None }
    }
}

#[async_trait]
impl OcrProvider for FakeOcr {
    async fn extract(&self, _path: &Path) -> Result<OcrExtraction, IntegrationError> {
        match &self.text {
            Some(text) => Ok(OcrExtraction {
                parsed_text: text.clone(),
                exit_code: Some(1),
                response: Value::Null,
            }),
            None => Err(unavailable("ocr.space")),
        }
    }
}

pub struct FakeClassifier {
    task: Option<ParsedTask>,
    seen: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn returning(task: ParsedTask) -> Self {
        Self {
            task: Some(task),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            task: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, text: &str) -> Result<ParsedTask, IntegrationError> {
        self.seen.lock().unwrap().push(text.to_string());
        self.task.clone().ok_or_else(|| unavailable("groq"))
    }
}

#[derive(Default)]
pub struct FakeTasks {
    created: Mutex<Vec<NewTask>>,
}

impl FakeTasks {
    pub fn created(&self) -> Vec<NewTask> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskCreator for FakeTasks {
    async fn create(&self, task: &NewTask) -> Result<TaskReceipt, IntegrationError> {
        let mut created = self.created.lock().unwrap();
        created.push(task.clone());
        Ok(TaskReceipt {
            id: format!("task-{}", created.len()),
            url: None,
        })
    }
}

#[derive(Default)]
pub struct FakeEmail {
    fail: bool,
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl FakeEmail {
    pub fn failing() -> Self {
        Self {
            fail: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for FakeEmail {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailReceipt, IntegrationError> {
        if self.fail {
            return Err(unavailable("sendgrid"));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(EmailReceipt {
            status: 202,
            message_id: Some("msg-1".to_string()),
        })
    }
}

#[derive(Default)]
pub struct FakePush {
    sent: Mutex<Vec<PushNotification>>,
}

impl FakePush {
    pub fn sent(&self) -> Vec<PushNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for FakePush {
    async fn send(&self, push: &PushNotification) -> Result<PushReceipt, IntegrationError> {
        self.sent.lock().unwrap().push(push.clone());
        Ok(PushReceipt {
            id: Some("push-1".to_string()),
            recipients: Some(1),
        })
    }
}

/// Rejects every append.
pub struct BrokenLogStore;

#[async_trait]
impl LogStore for BrokenLogStore {
    async fn append(&self, _entry: &LogEntry) -> Result<(), LogStoreError> {
        Err(LogStoreError::Unavailable("disk full".to_string()))
    }
}
