//! Collaborators that record every call and can be switched to fail.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use lifeadmin::integrations::{
    Classifier, EmailReceipt, EmailSender, IntegrationError, NewTask, OcrExtraction,
    OcrProvider, OutgoingEmail, PushNotification, PushReceipt, PushSender, TaskCreator,
    TaskReceipt,
};
use lifeadmin::logstore::{LogEntry, LogStore, LogStoreError};
use lifeadmin::task::ParsedTask;

fn network_error(service: &str) -> IntegrationError {
    IntegrationError::Status {
        service: service.to_string(),
        status: 503,
        body: "Service Unavailable".to_string(),
    }
}

pub struct RecordingOcr {
    text: Mutex<String>,
    fail: AtomicBool,
    calls: Mutex<Vec<PathBuf>>,
}

impl RecordingOcr {
    pub fn new(text: &str) -> Self {
        Self {
            text: Mutex::new(text.to_string()),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_text(&self, text: &str) {
        *self.text.lock().unwrap() = text.to_string();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl OcrProvider for RecordingOcr {
    async fn extract(&self, path: &Path) -> Result<OcrExtraction, IntegrationError> {
        self.calls.lock().unwrap().push(path.to_path_buf());
        if self.fail.load(Ordering::SeqCst) {
            return Err(network_error("ocr.space"));
        }
        Ok(OcrExtraction {
            parsed_text: self.text.lock().unwrap().clone(),
            exit_code: Some(1),
            response: Value::Null,
        })
    }
}

pub struct RecordingClassifier {
    task: Mutex<ParsedTask>,
    fail: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl RecordingClassifier {
    pub fn new(task: ParsedTask) -> Self {
        Self {
            task: Mutex::new(task),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_task(&self, task: ParsedTask) {
        *self.task.lock().unwrap() = task;
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for RecordingClassifier {
    async fn classify(&self, text: &str) -> Result<ParsedTask, IntegrationError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(network_error("groq"));
        }
        let mut task = self.task.lock().unwrap().clone();
        task.raw_text = text.to_string();
        Ok(task)
    }
}

#[derive(Default)]
pub struct RecordingTasks {
    fail: AtomicBool,
    calls: Mutex<Vec<NewTask>>,
}

impl RecordingTasks {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<NewTask> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TaskCreator for RecordingTasks {
    async fn create(&self, task: &NewTask) -> Result<TaskReceipt, IntegrationError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(task.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(network_error("todoist"));
        }
        Ok(TaskReceipt {
            id: format!("{}", 7000 + calls.len()),
            url: None,
        })
    }
}

#[derive(Default)]
pub struct RecordingEmail {
    fail: AtomicBool,
    calls: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingEmail {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<OutgoingEmail> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmail {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailReceipt, IntegrationError> {
        self.calls.lock().unwrap().push(email.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(network_error("sendgrid"));
        }
        Ok(EmailReceipt {
            status: 202,
            message_id: Some("sg-1".to_string()),
        })
    }
}

#[derive(Default)]
pub struct RecordingPush {
    calls: Mutex<Vec<PushNotification>>,
}

impl RecordingPush {
    pub fn calls(&self) -> Vec<PushNotification> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingPush {
    async fn send(&self, push: &PushNotification) -> Result<PushReceipt, IntegrationError> {
        self.calls.lock().unwrap().push(push.clone());
        Ok(PushReceipt {
            id: Some("os-1".to_string()),
            recipients: Some(1),
        })
    }
}

/// Log store whose every append fails.
#[derive(Default)]
pub struct FailingLogStore {
    attempts: Mutex<usize>,
}

impl FailingLogStore {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl LogStore for FailingLogStore {
    async fn append(&self, _entry: &LogEntry) -> Result<(), LogStoreError> {
        *self.attempts.lock().unwrap() += 1;
        Err(LogStoreError::Unavailable("connection refused".to_string()))
    }
}
