use std::path::Path;
use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use crate::config::Config;
use crate::error::{LifeAdminError, SetupError};
use crate::integrations::{
    Classifier, EmailSender, GroqClassifier, OcrProvider, OcrSpaceClient, OneSignalClient,
    PushSender, SendGridClient, TaskCreator, TodoistClient,
};
use crate::logstore::{self, LogStore};
use crate::sanitize;

use super::config::PipelineConfig;
use super::executor::StageExecutor;
use super::progress::{NoopProgress, ProgressReporter};
use super::router;
use super::stages::{
    DecisionStage, EmailStage, InputStage, OcrStage, ParseStage, PushStage, Stage, TaskStage,
};
use super::state::{ActionKind, PipelineState};

/// External services a pipeline talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub ocr: Arc<dyn OcrProvider>,
    pub classifier: Arc<dyn Classifier>,
    pub tasks: Arc<dyn TaskCreator>,
    pub email: Arc<dyn EmailSender>,
    pub push: Arc<dyn PushSender>,
    pub log_store: Arc<dyn LogStore>,
}

impl Collaborators {
    /// Builds the HTTP clients and the configured log store. Missing API
    /// keys do not fail here; the affected stage fails when it runs.
    pub fn from_config(config: &Config) -> Result<Self, LifeAdminError> {
        let retry = config.retry;
        let http = &config.http;
        Ok(Self {
            ocr: Arc::new(OcrSpaceClient::from_config(&config.ocr, http, retry)?),
            classifier: Arc::new(GroqClassifier::from_config(&config.llm, http, retry)?),
            tasks: Arc::new(TodoistClient::from_config(&config.todoist, http, retry)?),
            email: Arc::new(SendGridClient::from_config(&config.sendgrid, http, retry)?),
            push: Arc::new(OneSignalClient::from_config(&config.onesignal, http, retry)?),
            log_store: logstore::open_log_store(&config.log_store, http, retry)?,
        })
    }
}

/// The document workflow: input, ocr, parse, decision, at most one routed
/// action (plus an optional follow-up email), then the terminal log entry.
///
/// A pipeline holds no per-run state and can serve concurrent runs.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
    input: InputStage,
    ocr: OcrStage,
    parse: ParseStage,
    decision: DecisionStage,
    task: TaskStage,
    email: EmailStage,
    push: PushStage,
    log_store: Arc<dyn LogStore>,
}

impl Pipeline {
    pub fn new(config: Arc<PipelineConfig>, collaborators: Collaborators) -> Self {
        let Collaborators {
            ocr,
            classifier,
            tasks,
            email,
            push,
            log_store,
        } = collaborators;

        Self {
            input: InputStage,
            ocr: OcrStage::new(ocr),
            parse: ParseStage::new(classifier, &config.default_email),
            decision: DecisionStage,
            task: TaskStage::new(tasks, config.todoist_priority),
            email: EmailStage::new(email, &config.default_email, config.timezone.as_deref()),
            push: PushStage::new(push, &config.push_target),
            log_store,
            config,
        }
    }

    /// Production constructor: resolves secrets and builds every client.
    pub fn from_config(config: &Config) -> Result<Self, LifeAdminError> {
        let pipeline_config = PipelineConfig::from_config(config)?;
        let collaborators = Collaborators::from_config(config)?;
        Ok(Self::new(Arc::new(pipeline_config), collaborators))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn log_store(&self) -> &Arc<dyn LogStore> {
        &self.log_store
    }

    pub async fn run(&self, file: &Path) -> Result<PipelineState, SetupError> {
        self.run_with_progress(file, &NoopProgress).await
    }

    /// Runs one document end to end. Only a missing or unreadable input is
    /// an error; every stage failure is contained in the returned state.
    pub async fn run_with_progress(
        &self,
        file: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<PipelineState, SetupError> {
        check_input(file).await?;

        let state = PipelineState::new(file);
        let span = info_span!("pipeline",
            run_id = %state.run_id,
            filename = %sanitize::redact_path(file),
            path_hash = %sanitize::hash_path(file),
        );
        Ok(self.execute(state, progress).instrument(span).await)
    }

    async fn execute(
        &self,
        mut state: PipelineState,
        progress: &dyn ProgressReporter,
    ) -> PipelineState {
        let mut executor = StageExecutor::new(self.log_store.as_ref(), progress);

        executor.run_stage(&mut state, &self.input).await;
        executor.run_stage(&mut state, &self.ocr).await;
        executor.run_stage(&mut state, &self.parse).await;
        executor.run_stage(&mut state, &self.decision).await;

        if let Some(action) = state.next_action.and_then(|a| self.action_stage(a)) {
            executor.run_stage(&mut state, action).await;

            if let Some(follow_up) = router::follow_up(&state, &self.config.routing) {
                if let Some(stage) = self.action_stage(follow_up) {
                    executor.run_stage(&mut state, stage).await;
                }
            }
        }

        executor.finish(&mut state).await;

        if executor.log_failures() > 0 {
            warn!(
                failed = executor.log_failures(),
                written = executor.entries_written(),
                "Some stage log entries could not be written"
            );
        }
        info!(
            action = ?state.next_action,
            failed_stages = ?state.failed_stages(),
            "Pipeline run finished"
        );
        state
    }

    fn action_stage(&self, action: ActionKind) -> Option<&dyn Stage> {
        match action {
            ActionKind::Task => Some(&self.task),
            ActionKind::Email => Some(&self.email),
            ActionKind::Push => Some(&self.push),
            ActionKind::None => None,
        }
    }
}

/// Verifies the input exists, is a regular file and can be opened.
pub async fn check_input(file: &Path) -> Result<(), SetupError> {
    let metadata = tokio::fs::metadata(file).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SetupError::NotFound {
                path: file.to_path_buf(),
            }
        } else {
            SetupError::Unreadable {
                path: file.to_path_buf(),
                source: e,
            }
        }
    })?;

    if !metadata.is_file() {
        return Err(SetupError::NotAFile {
            path: file.to_path_buf(),
        });
    }

    tokio::fs::File::open(file)
        .await
        .map_err(|e| SetupError::Unreadable {
            path: file.to_path_buf(),
            source: e,
        })?;
    Ok(())
}
