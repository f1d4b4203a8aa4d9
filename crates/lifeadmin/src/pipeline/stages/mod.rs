//! The individual steps of a run. Each stage declares which state fields
//! it reads and writes so the executor can snapshot them for the log.

use async_trait::async_trait;

use super::error::StageError;
use super::state::{PipelineState, StageName, StateField};

mod actions;
mod decision;
mod input;
mod ocr;
mod parse;

pub use actions::{EmailStage, PushStage, TaskStage};
pub use decision::DecisionStage;
pub use input::InputStage;
pub use ocr::OcrStage;
pub use parse::ParseStage;

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> StageName;

    fn reads(&self) -> &'static [StateField];

    fn writes(&self) -> &'static [StateField];

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError>;
}
