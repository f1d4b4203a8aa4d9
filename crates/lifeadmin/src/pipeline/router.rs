//! Maps a classified document to the action the pipeline takes next.

use super::state::{ActionKind, ActionReceipt, PipelineState};
use crate::config::RoutingConfig;
use crate::task::{ParsedTask, TaskType};

pub const MISSING_TASK_ANNOTATION: &str = "parsed task missing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub action: ActionKind,
    /// Set when the router had to fail closed.
    pub annotation: Option<String>,
}

/// Total over every state: without a parsed task the answer is `NONE`
/// plus an annotation, never a panic.
pub fn route(state: &PipelineState) -> RouteDecision {
    match &state.parsed_task {
        Some(task) => RouteDecision {
            action: route_task(task),
            annotation: None,
        },
        None => RouteDecision {
            action: ActionKind::None,
            annotation: Some(MISSING_TASK_ANNOTATION.to_string()),
        },
    }
}

pub fn route_task(task: &ParsedTask) -> ActionKind {
    match task.task_type {
        TaskType::Invoice | TaskType::Bill => ActionKind::Task,
        TaskType::Subscription if task.reminder_days_before.is_some() => ActionKind::Email,
        TaskType::Subscription => ActionKind::Task,
        // Already paid; nothing to do regardless of the other fields.
        TaskType::Receipt => ActionKind::None,
        TaskType::Other => ActionKind::None,
    }
}

/// A second action to run after the routed one, when policy allows.
///
/// With `email_after_task` on, a successfully created task whose document
/// has a reminder lead time is followed by the reminder email.
pub fn follow_up(state: &PipelineState, policy: &RoutingConfig) -> Option<ActionKind> {
    if !policy.email_after_task || state.error.is_some() {
        return None;
    }
    let created_task = matches!(state.action_result, Some(ActionReceipt::Task(_)));
    let has_reminder = state
        .parsed_task
        .as_ref()
        .is_some_and(|t| t.reminder_days_before.is_some());

    (state.next_action == Some(ActionKind::Task) && created_task && has_reminder)
        .then_some(ActionKind::Email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::TaskReceipt;
    use chrono::NaiveDate;
    use std::path::Path;

    fn task(task_type: TaskType) -> ParsedTask {
        ParsedTask::new(task_type, "me@example.com", "raw")
    }

    fn state_with(task: Option<ParsedTask>) -> PipelineState {
        let mut state = PipelineState::new(Path::new("doc.png"));
        state.parsed_task = task;
        state
    }

    #[test]
    fn test_invoice_and_bill_create_tasks() {
        assert_eq!(route_task(&task(TaskType::Invoice)), ActionKind::Task);
        assert_eq!(route_task(&task(TaskType::Bill)), ActionKind::Task);
    }

    #[test]
    fn test_subscription_routes_on_reminder() {
        let mut sub = task(TaskType::Subscription);
        assert_eq!(route_task(&sub), ActionKind::Task);
        sub.reminder_days_before = Some(5);
        assert_eq!(route_task(&sub), ActionKind::Email);
    }

    #[test]
    fn test_receipt_is_always_none() {
        let amounts = [None, Some("$71.24".to_string())];
        let dates = [None, NaiveDate::from_ymd_opt(2025, 1, 10)];
        let reminders = [None, Some(0), Some(3), Some(30)];
        let providers = [None, Some("TechMart".to_string())];

        for amount in &amounts {
            for due in &dates {
                for reminder in &reminders {
                    for provider in &providers {
                        let mut receipt = task(TaskType::Receipt);
                        receipt.amount = amount.clone();
                        receipt.due_date = *due;
                        receipt.reminder_days_before = *reminder;
                        receipt.provider = provider.clone();
                        assert_eq!(route_task(&receipt), ActionKind::None);
                    }
                }
            }
        }
    }

    #[test]
    fn test_other_is_none() {
        let mut other = task(TaskType::Other);
        other.reminder_days_before = Some(3);
        assert_eq!(route_task(&other), ActionKind::None);
    }

    #[test]
    fn test_missing_task_fails_closed() {
        let decision = route(&state_with(None));
        assert_eq!(decision.action, ActionKind::None);
        assert_eq!(decision.annotation.as_deref(), Some(MISSING_TASK_ANNOTATION));
    }

    #[test]
    fn test_route_present_task_has_no_annotation() {
        let decision = route(&state_with(Some(task(TaskType::Invoice))));
        assert_eq!(decision.action, ActionKind::Task);
        assert_eq!(decision.annotation, None);
    }

    #[test]
    fn test_never_routes_to_push() {
        for task_type in [
            TaskType::Invoice,
            TaskType::Receipt,
            TaskType::Bill,
            TaskType::Subscription,
            TaskType::Other,
        ] {
            for reminder in [None, Some(3)] {
                let mut t = task(task_type);
                t.reminder_days_before = reminder;
                assert_ne!(route_task(&t), ActionKind::Push);
            }
        }
    }

    fn after_task(reminder: Option<u32>) -> PipelineState {
        let mut t = task(TaskType::Invoice);
        t.reminder_days_before = reminder;
        let mut state = state_with(Some(t));
        state.next_action = Some(ActionKind::Task);
        state.action_result = Some(ActionReceipt::Task(TaskReceipt {
            id: "1".to_string(),
            url: None,
        }));
        state
    }

    #[test]
    fn test_follow_up_disabled_by_default() {
        assert_eq!(follow_up(&after_task(Some(3)), &RoutingConfig::default()), None);
    }

    #[test]
    fn test_follow_up_when_enabled() {
        let policy = RoutingConfig {
            email_after_task: true,
        };
        assert_eq!(follow_up(&after_task(Some(3)), &policy), Some(ActionKind::Email));
        assert_eq!(follow_up(&after_task(None), &policy), None);

        let mut failed = after_task(Some(3));
        failed.error = Some("Todoist API Error".to_string());
        assert_eq!(follow_up(&failed, &policy), None);
    }
}
