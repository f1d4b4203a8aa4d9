use thiserror::Error;

use super::state::{StageName, StateField};
use crate::integrations::IntegrationError;

/// Failure of a single stage. Contained by the executor: recorded on the
/// state and in the stage log, never returned from a run.
#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Collaborator(#[from] IntegrationError),

    #[error("{stage} stage requires {} but it is missing", .field.key())]
    MissingDependency { stage: StageName, field: StateField },
}
