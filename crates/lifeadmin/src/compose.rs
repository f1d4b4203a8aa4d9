//! Turns a classified task into the payloads sent by the action stages.
//!
//! Every field used here is optional on [`ParsedTask`], so each builder
//! degrades to generic wording instead of failing.

use std::fmt::Write;

use crate::integrations::{NewTask, OutgoingEmail, PushNotification};
use crate::pipeline::ActionReceipt;
use crate::task::{ParsedTask, TaskType};

pub const SIGNATURE: &str = "LifeAdmin AI";

pub fn task_title(task: &ParsedTask) -> String {
    let provider = clean(task.provider_label());
    let mut title = match task.task_type {
        TaskType::Invoice => format!("Pay {} invoice", provider),
        TaskType::Bill => format!("Pay {} bill", provider),
        TaskType::Subscription => format!("Review {} subscription", provider),
        TaskType::Receipt => format!("File {} receipt", provider),
        TaskType::Other => format!("Follow up on document from {}", provider),
    };
    if let Some(amount) = &task.amount {
        let _ = write!(title, " ({})", clean(amount));
    }
    title
}

/// Summary lines for the task body, or `None` when nothing is known.
pub fn task_description(task: &ParsedTask) -> Option<String> {
    let lines = detail_lines(task);
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

pub fn new_task(task: &ParsedTask, priority: u8) -> NewTask {
    NewTask {
        title: task_title(task),
        due_date: task.due_date,
        description: task_description(task),
        priority,
    }
}

/// Plain-text reminder email. The subject always names LifeAdmin AI and the
/// body always opens with "Dear User,".
pub fn reminder_email(
    task: &ParsedTask,
    to: &str,
    previous: Option<&ActionReceipt>,
    timezone: Option<&str>,
) -> OutgoingEmail {
    let provider = clean(task.provider_label());
    let kind = task.task_type.as_str();

    let subject = match task.due_date {
        Some(due) => format!("Upcoming {} {} due {} by {}", provider, kind, due, SIGNATURE),
        None => format!("Your {} {} details by {}", provider, kind, SIGNATURE),
    };

    let mut body = String::from("Dear User,\n\n");
    let _ = writeln!(
        body,
        "We analyzed your {} from {} and extracted the details below.\n",
        kind, provider
    );
    for line in detail_lines(task) {
        let _ = writeln!(body, "{}", line);
    }
    if let Some(tz) = timezone {
        let _ = writeln!(body, "Dates refer to the {} time zone.", clean(tz));
    }

    match previous {
        Some(ActionReceipt::Task(receipt)) => {
            let _ = writeln!(
                body,
                "\nWe also created a Todoist task for this (id {}).",
                clean(&receipt.id)
            );
        }
        _ if task.reminder_date().is_some() => {
            body.push_str("\nWe will remind you again before the due date.\n");
        }
        _ => {}
    }

    let _ = write!(
        body,
        "\nPlease let us know if you need further assistance.\n\nBest regards,\n{}",
        SIGNATURE
    );

    OutgoingEmail {
        to: to.to_string(),
        subject,
        body,
    }
}

pub fn push_notification(task: &ParsedTask, target: &str) -> PushNotification {
    let provider = clean(task.provider_label());
    let heading = format!("New {} from {}", task.task_type.as_str(), provider);
    let message = match (task.due_date, &task.amount) {
        (Some(due), Some(amount)) => format!("{} due on {}", clean(amount), due),
        (Some(due), None) => format!("Due on {}", due),
        (None, Some(amount)) => format!("Amount: {}", clean(amount)),
        (None, None) => "Tap to review the document".to_string(),
    };
    PushNotification {
        heading,
        message,
        target: target.to_string(),
    }
}

fn detail_lines(task: &ParsedTask) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(provider) = &task.provider {
        lines.push(format!("Provider: {}", clean(provider)));
    }
    if let Some(amount) = &task.amount {
        lines.push(format!("Amount: {}", clean(amount)));
    }
    if let Some(due) = task.due_date {
        lines.push(format!("Due date: {}", due));
    }
    if let (Some(date), Some(days)) = (task.reminder_date(), task.reminder_days_before) {
        lines.push(format!(
            "Reminder date: {} ({} days before the due date)",
            date, days
        ));
    }
    lines
}

/// Strips characters that mail clients render as markdown.
fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}
