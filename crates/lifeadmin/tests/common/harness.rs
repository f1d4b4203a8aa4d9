//! Test harness for isolated pipeline runs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use lifeadmin::logstore::{LogEntry, LogStore, MemoryLogStore};
use lifeadmin::pipeline::{Collaborators, Pipeline, PipelineConfig, StageName};
use lifeadmin::task::ParsedTask;

use super::builders;
use super::fakes::{
    RecordingClassifier, RecordingEmail, RecordingOcr, RecordingPush, RecordingTasks,
};

pub const INVOICE_TEXT: &str = "ACME CORPORATION\nInvoice INV-2025-001\nTotal due: $1,620.00\nDue date: 2025-01-10";

pub struct TestHarness {
    temp_dir: TempDir,
    pub upload_dir: PathBuf,
    pub store: Arc<MemoryLogStore>,
    pub ocr: Arc<RecordingOcr>,
    pub classifier: Arc<RecordingClassifier>,
    pub tasks: Arc<RecordingTasks>,
    pub email: Arc<RecordingEmail>,
    pub push: Arc<RecordingPush>,
    pub config: PipelineConfig,
}

impl TestHarness {
    /// Invoice OCR text classified as an invoice, default configuration.
    pub fn new() -> Self {
        Self::with_task(builders::invoice())
    }

    pub fn with_task(task: ParsedTask) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let upload_dir = temp_dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).expect("Failed to create upload directory");

        let config = PipelineConfig {
            default_email: "fallback@example.com".to_string(),
            ..PipelineConfig::default()
        };

        Self {
            temp_dir,
            upload_dir,
            store: Arc::new(MemoryLogStore::new()),
            ocr: Arc::new(RecordingOcr::new(INVOICE_TEXT)),
            classifier: Arc::new(RecordingClassifier::new(task)),
            tasks: Arc::new(RecordingTasks::default()),
            email: Arc::new(RecordingEmail::default()),
            push: Arc::new(RecordingPush::default()),
            config,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with_store(self.store.clone())
    }

    pub fn pipeline_with_store(&self, log_store: Arc<dyn LogStore>) -> Pipeline {
        let collaborators = Collaborators {
            ocr: self.ocr.clone(),
            classifier: self.classifier.clone(),
            tasks: self.tasks.clone(),
            email: self.email.clone(),
            push: self.push.clone(),
            log_store,
        };
        Pipeline::new(Arc::new(self.config.clone()), collaborators)
    }

    /// Writes a fake upload and returns its path.
    pub fn upload(&self, name: &str) -> PathBuf {
        let path = self.upload_dir.join(name);
        std::fs::write(&path, b"\x89PNG fake image bytes").expect("Failed to write upload");
        path
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.store.entries()
    }

    pub fn logged_stages(&self) -> Vec<StageName> {
        self.store.entries().iter().map(|e| e.stage).collect()
    }

    /// Number of calls made to the three action collaborators.
    pub fn action_calls(&self) -> usize {
        self.tasks.calls().len() + self.email.calls().len() + self.push.calls().len()
    }

    pub fn temp_path(&self) -> &std::path::Path {
        self.temp_dir.path()
    }
}
