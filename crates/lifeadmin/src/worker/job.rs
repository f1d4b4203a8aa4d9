use std::path::{Path, PathBuf};

use crate::pipeline::PipelineState;

/// One uploaded file waiting for a pipeline run.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub source_path: PathBuf,
    /// MIME type guessed from the extension, if known.
    pub mime_type: Option<String>,
}

impl Job {
    pub fn new(source_path: PathBuf) -> Self {
        let mime_type = detect_mime_type(&source_path);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source_path,
            mime_type,
        }
    }
}

fn detect_mime_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.to_string())
}

#[derive(Debug)]
pub struct JobResult {
    pub job_id: String,
    pub source_path: PathBuf,
    /// Final state of the run. `None` when the run could not start.
    pub state: Option<PipelineState>,
    /// Setup failure that prevented the run.
    pub error: Option<String>,
}

impl JobResult {
    pub fn completed(job: &Job, state: PipelineState) -> Self {
        Self {
            job_id: job.id.clone(),
            source_path: job.source_path.clone(),
            state: Some(state),
            error: None,
        }
    }

    pub fn rejected(job: &Job, error: String) -> Self {
        Self {
            job_id: job.id.clone(),
            source_path: job.source_path.clone(),
            state: None,
            error: Some(error),
        }
    }

    /// True when the run started and no stage recorded a failure.
    pub fn is_clean(&self) -> bool {
        self.state
            .as_ref()
            .map(|state| !state.has_failures())
            .unwrap_or(false)
    }
}
