//! The per-document workflow and its state record.

pub mod config;
pub mod error;
pub mod executor;
pub mod progress;
pub mod router;
pub mod runner;
pub mod stages;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PipelineConfig;
pub use error::StageError;
pub use executor::StageExecutor;
pub use progress::{BroadcastProgress, NoopProgress, ProgressReporter, StageEvent, StageStatus};
pub use router::{follow_up, route, route_task, RouteDecision};
pub use runner::{check_input, Collaborators, Pipeline};
pub use stages::Stage;
pub use state::{
    ActionKind, ActionReceipt, OcrText, PipelineState, StageFailure, StageName, StateField,
};
