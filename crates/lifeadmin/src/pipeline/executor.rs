//! Runs one stage at a time against the shared state and writes exactly
//! one log entry per executed stage.

use chrono::{DateTime, Utc};
use tracing::{info_span, warn, Instrument};

use super::progress::{ProgressReporter, StageEvent, StageStatus};
use super::stages::Stage;
use super::state::{PipelineState, StageFailure, StageName};
use crate::logstore::{LogEntry, LogStore};

pub struct StageExecutor<'a> {
    store: &'a dyn LogStore,
    progress: &'a dyn ProgressReporter,
    last_timestamp: Option<DateTime<Utc>>,
    entries_written: usize,
    log_failures: usize,
}

impl<'a> StageExecutor<'a> {
    pub fn new(store: &'a dyn LogStore, progress: &'a dyn ProgressReporter) -> Self {
        Self {
            store,
            progress,
            last_timestamp: None,
            entries_written: 0,
            log_failures: 0,
        }
    }

    /// Executes `stage` and logs it. Stage failures are recorded on the
    /// state, never propagated. Returns whether the stage finished without
    /// an error or annotation.
    pub async fn run_stage(&mut self, state: &mut PipelineState, stage: &dyn Stage) -> bool {
        let name = stage.name();
        state.stage = Some(name);
        state.input_snapshot = Some(state.snapshot(stage.reads()));
        state.output_snapshot = None;
        state.error = None;
        self.report(state, name, StageStatus::Started);

        let result = stage
            .process(state)
            .instrument(info_span!("stage", stage = %name))
            .await;

        match result {
            Ok(()) => {
                if let Some(annotation) = &state.error {
                    state.failures.push(StageFailure {
                        stage: name,
                        message: annotation.clone(),
                    });
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(stage = %name, error = %message, "Stage failed");
                state.error = Some(message.clone());
                state.failures.push(StageFailure {
                    stage: name,
                    message,
                });
            }
        }

        state.output_snapshot = Some(state.snapshot(stage.writes()));
        self.append(state, name).await;

        let succeeded = state.error.is_none();
        let status = if succeeded {
            StageStatus::Succeeded
        } else {
            StageStatus::Failed
        };
        self.report(state, name, status);
        succeeded
    }

    /// Writes the terminal `log` entry. It repeats the snapshots of the last
    /// executed stage together with the current error, then marks the state
    /// as logged.
    pub async fn finish(&mut self, state: &mut PipelineState) {
        state.stage = Some(StageName::Log);
        self.report(state, StageName::Log, StageStatus::Started);
        self.append(state, StageName::Log).await;
        state.logged = true;
        self.report(state, StageName::Log, StageStatus::Succeeded);
    }

    pub fn entries_written(&self) -> usize {
        self.entries_written
    }

    /// Appends that the store rejected during this run.
    pub fn log_failures(&self) -> usize {
        self.log_failures
    }

    async fn append(&mut self, state: &PipelineState, stage: StageName) {
        let entry = LogEntry {
            run_id: state.run_id,
            stage,
            input_data: state.input_snapshot.clone(),
            output_data: state.output_snapshot.clone(),
            error: state.error.clone(),
            timestamp: self.next_timestamp(),
        };

        match self.store.append(&entry).await {
            Ok(()) => self.entries_written += 1,
            Err(e) => {
                self.log_failures += 1;
                warn!(stage = %stage, error = %e, "Failed to write stage log entry");
            }
        }
    }

    /// Wall-clock time, clamped so entries of one run never go backwards.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }

    fn report(&self, state: &PipelineState, stage: StageName, status: StageStatus) {
        let error = match status {
            StageStatus::Failed => state.error.clone(),
            _ => None,
        };
        self.progress.report(StageEvent {
            run_id: state.run_id,
            stage,
            status,
            error,
        });
    }
}
