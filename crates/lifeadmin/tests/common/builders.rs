//! Parsed tasks for the document types the router distinguishes.

#![allow(dead_code)]

use chrono::NaiveDate;

use lifeadmin::task::{ParsedTask, TaskType};

pub const USER_EMAIL: &str = "jane@example.com";

pub fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

pub fn invoice() -> ParsedTask {
    let mut task = ParsedTask::new(TaskType::Invoice, USER_EMAIL, "");
    task.provider = Some("Acme Corporation".to_string());
    task.amount = Some("$1,620.00".to_string());
    task.due_date = date(2025, 1, 10);
    task.reminder_days_before = Some(3);
    task
}

pub fn bill() -> ParsedTask {
    let mut task = ParsedTask::new(TaskType::Bill, USER_EMAIL, "");
    task.provider = Some("City Water".to_string());
    task.due_date = date(2025, 2, 1);
    task
}

pub fn receipt() -> ParsedTask {
    let mut task = ParsedTask::new(TaskType::Receipt, USER_EMAIL, "");
    task.provider = Some("Corner Store".to_string());
    task.amount = Some("12.40".to_string());
    task
}

pub fn subscription(reminder_days_before: Option<u32>) -> ParsedTask {
    let mut task = ParsedTask::new(TaskType::Subscription, USER_EMAIL, "");
    task.provider = Some("Netflix".to_string());
    task.amount = Some("15.49".to_string());
    task.due_date = date(2025, 3, 15);
    task.reminder_days_before = reminder_days_before;
    task
}
