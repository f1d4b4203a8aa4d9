//! The three outward actions. Each one turns the parsed task into a
//! payload, calls its collaborator once (the client handles retries) and
//! stores the receipt.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::Stage;
use crate::compose;
use crate::integrations::{EmailSender, PushSender, TaskCreator};
use crate::pipeline::error::StageError;
use crate::pipeline::state::{ActionReceipt, PipelineState, StageName, StateField};
use crate::task::ParsedTask;

fn require_task(state: &PipelineState, stage: StageName) -> Result<&ParsedTask, StageError> {
    state
        .parsed_task
        .as_ref()
        .ok_or(StageError::MissingDependency {
            stage,
            field: StateField::ParsedTask,
        })
}

pub struct TaskStage {
    creator: Arc<dyn TaskCreator>,
    priority: u8,
}

impl TaskStage {
    pub fn new(creator: Arc<dyn TaskCreator>, priority: u8) -> Self {
        Self { creator, priority }
    }
}

#[async_trait]
impl Stage for TaskStage {
    fn name(&self) -> StageName {
        StageName::Task
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ParsedTask]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::ActionResult]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        let new_task = compose::new_task(require_task(state, StageName::Task)?, self.priority);
        let receipt = self.creator.create(&new_task).await?;
        info!(task_id = %receipt.id, "Task created");
        state.action_result = Some(ActionReceipt::Task(receipt));
        Ok(())
    }
}

pub struct EmailStage {
    sender: Arc<dyn EmailSender>,
    default_email: String,
    timezone: Option<String>,
}

impl EmailStage {
    pub fn new(sender: Arc<dyn EmailSender>, default_email: &str, timezone: Option<&str>) -> Self {
        Self {
            sender,
            default_email: default_email.to_string(),
            timezone: timezone.map(str::to_string),
        }
    }
}

#[async_trait]
impl Stage for EmailStage {
    fn name(&self) -> StageName {
        StageName::Email
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ParsedTask, StateField::ActionResult]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::ActionResult]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        let task = require_task(state, StageName::Email)?;
        let to = if task.email.trim().is_empty() {
            self.default_email.as_str()
        } else {
            task.email.as_str()
        };
        let email = compose::reminder_email(
            task,
            to,
            state.action_result.as_ref(),
            self.timezone.as_deref(),
        );

        let receipt = self.sender.send(&email).await?;
        info!(status = receipt.status, "Reminder email sent");
        state.action_result = Some(ActionReceipt::Email(receipt));
        Ok(())
    }
}

pub struct PushStage {
    sender: Arc<dyn PushSender>,
    target: String,
}

impl PushStage {
    pub fn new(sender: Arc<dyn PushSender>, target: &str) -> Self {
        Self {
            sender,
            target: target.to_string(),
        }
    }
}

#[async_trait]
impl Stage for PushStage {
    fn name(&self) -> StageName {
        StageName::Push
    }

    fn reads(&self) -> &'static [StateField] {
        &[StateField::ParsedTask]
    }

    fn writes(&self) -> &'static [StateField] {
        &[StateField::ActionResult]
    }

    async fn process(&self, state: &mut PipelineState) -> Result<(), StageError> {
        let push = compose::push_notification(require_task(state, StageName::Push)?, &self.target);
        let receipt = self.sender.send(&push).await?;
        info!(recipients = receipt.recipients, "Push notification sent");
        state.action_result = Some(ActionReceipt::Push(receipt));
        Ok(())
    }
}
