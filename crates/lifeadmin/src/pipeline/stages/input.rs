use async_trait::async_trait;
use tracing::debug;

use super::Stage;
use crate::pipeline::error::StageError;
use crate::pipeline::state::{PipelineState, StageName, StateField};
use crate::sanitize;

/// Records the uploaded file reference. The file itself was already
/// checked before the run started.
pub struct InputStage;

#[async_trait]
impl Stage for InputStage {
    fn name(&self) -> StageName {
        StageName::Input
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ImageReference]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::RunId, StateField::ImageReference]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        debug!(
            file = %sanitize::redact_path(&state.image_reference),
            "Accepted input"
        );
        Ok(())
    }
}
