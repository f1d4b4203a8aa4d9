use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::Stage;
use crate::integrations::OcrProvider;
use crate::pipeline::error::StageError;
use crate::pipeline::state::{OcrText, PipelineState, StageName, StateField};

pub struct OcrStage {
    provider: Arc<dyn OcrProvider>,
}

impl OcrStage {
    pub fn new(provider: Arc<dyn OcrProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Stage for OcrStage {
    fn name(&self) -> StageName {
        StageName::Ocr
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ImageReference]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::OcrText]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        state.ocr_text = None;
        let extraction = self.provider.extract(&state.image_reference).await?;
        debug!(
            exit_code = extraction.exit_code,
            chars = extraction.parsed_text.len(),
            "OCR text extracted"
        );
        state.ocr_text = Some(OcrText::decode(&extraction.parsed_text));
        Ok(())
    }
}
