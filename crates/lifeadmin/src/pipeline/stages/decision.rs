use async_trait::async_trait;
use tracing::debug;

use super::Stage;
use crate::pipeline::error::StageError;
use crate::pipeline::router;
use crate::pipeline::state::{PipelineState, StageName, StateField};

/// Applies the router. Always succeeds; a missing parsed task is recorded
/// as an annotation on `state.error`.
pub struct DecisionStage;

#[async_trait]
impl Stage for DecisionStage {
    fn name(&self) -> StageName {
        StageName::Decision
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ParsedTask]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::NextAction]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        let decision = router::route(state);
        debug!(action = ?decision.action, "Routed document");
        state.next_action = Some(decision.action);
        if let Some(annotation) = decision.annotation {
            state.error = Some(annotation);
        }
        Ok(())
    }
}
