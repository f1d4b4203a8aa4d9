//! The classified task record produced from OCR text.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reminder lead time applied when a dated, non-subscription document
/// carries no explicit reminder.
pub const DEFAULT_REMINDER_DAYS: u32 = 3;

/// Keys the classifier output must contain (values may be null).
pub const REQUIRED_KEYS: &[&str] = &["task_type", "due_date", "provider"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Invoice,
    Receipt,
    Bill,
    Subscription,
    Other,
}

impl TaskType {
    /// Maps a model-provided label to a task type. Anything outside the
    /// closed set becomes `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "invoice" => Self::Invoice,
            "receipt" => Self::Receipt,
            "bill" => Self::Bill,
            "subscription" => Self::Subscription,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::Bill => "bill",
            Self::Subscription => "subscription",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub task_type: TaskType,
    pub amount: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub provider: Option<String>,
    pub reminder_days_before: Option<u32>,
    pub email: String,
    pub raw_text: String,
}

/// Why a model reply could not become a [`ParsedTask`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskShapeError {
    #[error("classifier output is not a JSON object")]
    NotAnObject,

    #[error("classifier output is missing required keys: {0:?}")]
    MissingKeys(Vec<String>),
}

impl ParsedTask {
    /// A bare task of the given type, used when building tasks by hand.
    pub fn new(task_type: TaskType, email: &str, raw_text: &str) -> Self {
        Self {
            task_type,
            amount: None,
            due_date: None,
            provider: None,
            reminder_days_before: None,
            email: email.to_string(),
            raw_text: raw_text.to_string(),
        }
    }

    /// Normalizes the JSON object returned by the classification model.
    ///
    /// Unknown task types fall back to `other`, numeric amounts are kept as
    /// text, unparseable dates become `None`, and the reminder default is
    /// applied when the model left it out.
    pub fn from_model_output(
        value: &Value,
        raw_text: &str,
        default_email: &str,
    ) -> Result<Self, TaskShapeError> {
        let obj = value.as_object().ok_or(TaskShapeError::NotAnObject)?;

        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|k| !obj.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(TaskShapeError::MissingKeys(missing));
        }

        let task_type = obj
            .get("task_type")
            .and_then(Value::as_str)
            .map(TaskType::from_label)
            .unwrap_or(TaskType::Other);
        let due_date = obj
            .get("due_date")
            .and_then(Value::as_str)
            .and_then(parse_date);
        let explicit_reminder = obj.get("reminder_days_before").and_then(as_days);
        let email = text_field(obj, "email")
            .filter(|e| looks_like_email(e))
            .unwrap_or_else(|| default_email.to_string());

        Ok(Self {
            task_type,
            amount: text_field(obj, "amount"),
            due_date,
            provider: text_field(obj, "provider"),
            reminder_days_before: explicit_reminder
                .or_else(|| default_reminder(task_type, due_date)),
            email,
            raw_text: raw_text.to_string(),
        })
    }

    /// The day the reminder should fire, when both a due date and a lead
    /// time are known.
    pub fn reminder_date(&self) -> Option<NaiveDate> {
        let due = self.due_date?;
        let days = self.reminder_days_before?;
        due.checked_sub_days(chrono::Days::new(u64::from(days)))
    }

    /// Provider name or a generic label for messages.
    pub fn provider_label(&self) -> &str {
        self.provider.as_deref().unwrap_or("your provider")
    }
}

fn default_reminder(task_type: TaskType, due_date: Option<NaiveDate>) -> Option<u32> {
    match (task_type, due_date) {
        (TaskType::Subscription, _) | (_, None) => None,
        (_, Some(_)) => Some(DEFAULT_REMINDER_DAYS),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            // Models sometimes return a full timestamp.
            chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn as_days(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn looks_like_email(s: &str) -> bool {
    let s = s.trim();
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !s.contains(' '),
        None => false,
    }
}
