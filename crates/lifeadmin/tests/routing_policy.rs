//! Decision routing and the optional task-then-email follow-up.

mod common;

use common::{bill, invoice, receipt, subscription, TestHarness};
use lifeadmin::pipeline::{route_task, ActionKind, ActionReceipt, StageName};
use lifeadmin::task::{ParsedTask, TaskType};

fn with_follow_up(task: ParsedTask) -> TestHarness {
    let mut h = TestHarness::with_task(task);
    h.config.routing.email_after_task = true;
    h
}

#[test]
fn test_router_never_pushes() {
    let types = [
        TaskType::Invoice,
        TaskType::Receipt,
        TaskType::Bill,
        TaskType::Subscription,
        TaskType::Other,
    ];
    for task_type in types {
        for reminder in [None, Some(0), Some(3)] {
            for email in ["", "someone@example.com"] {
                let mut task = ParsedTask::new(task_type, email, "text");
                task.reminder_days_before = reminder;
                assert_ne!(route_task(&task), ActionKind::Push, "{:?}", task);
            }
        }
    }
}

#[tokio::test]
async fn test_follow_up_disabled_by_default() {
    let h = TestHarness::with_task(invoice());
    h.pipeline().run(&h.upload("invoice.png")).await.unwrap();
    assert_eq!(h.tasks.calls().len(), 1);
    assert!(h.email.calls().is_empty());
}

#[tokio::test]
async fn test_follow_up_email_after_task() {
    let h = with_follow_up(invoice());

    let state = h.pipeline().run(&h.upload("invoice.png")).await.unwrap();

    assert_eq!(state.next_action, Some(ActionKind::Task));
    assert!(matches!(state.action_result, Some(ActionReceipt::Email(_))));
    let sent = h.email.calls();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("Todoist task"));
    assert!(sent[0].body.contains("7001"));
    assert_eq!(
        h.logged_stages()[4..],
        [StageName::Task, StageName::Email, StageName::Log]
    );
}

#[tokio::test]
async fn test_no_follow_up_without_reminder() {
    let h = with_follow_up(bill());
    h.pipeline().run(&h.upload("bill.png")).await.unwrap();
    assert_eq!(h.tasks.calls().len(), 1);
    assert!(h.email.calls().is_empty());
}

#[tokio::test]
async fn test_no_follow_up_after_failed_task() {
    let h = with_follow_up(invoice());
    h.tasks.set_failing(true);

    let state = h.pipeline().run(&h.upload("invoice.png")).await.unwrap();

    assert!(h.email.calls().is_empty());
    assert_eq!(state.failed_stages(), vec![StageName::Task]);
}

#[tokio::test]
async fn test_follow_up_does_not_apply_to_email_or_none() {
    let h = with_follow_up(subscription(Some(5)));
    h.pipeline().run(&h.upload("netflix.png")).await.unwrap();
    assert_eq!(h.email.calls().len(), 1);
    assert!(h.tasks.calls().is_empty());

    let h = with_follow_up(receipt());
    h.pipeline().run(&h.upload("receipt.png")).await.unwrap();
    assert_eq!(h.action_calls(), 0);
}
