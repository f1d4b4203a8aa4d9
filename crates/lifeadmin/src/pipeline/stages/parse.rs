use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::Stage;
use crate::integrations::Classifier;
use crate::pipeline::error::StageError;
use crate::pipeline::state::{PipelineState, StageName, StateField};

pub struct ParseStage {
    classifier: Arc<dyn Classifier>,
    default_email: String,
}

impl ParseStage {
    pub fn new(classifier: Arc<dyn Classifier>, default_email: &str) -> Self {
        Self {
            classifier,
            default_email: default_email.to_string(),
        }
    }
}

#[async_trait]
impl Stage for ParseStage {
    fn name(&self) -> StageName {
        StageName::Parse
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::OcrText]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::ParsedTask]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        state.parsed_task = None;
        let text = state
            .ocr_text
            .as_ref()
            .map(|ocr| ocr.as_text())
            .ok_or(StageError::MissingDependency {
                stage: StageName::Parse,
                field: StateField::OcrText,
            })?;

        let mut task = self.classifier.classify(&text).await?;
        if task.email.trim().is_empty() {
            task.email = self.default_email.clone();
        }

        info!(
            task_type = %task.task_type,
            has_due_date = task.due_date.is_some(),
            "Document classified"
        );
        state.parsed_task = Some(task);
        Ok(())
    }
}
