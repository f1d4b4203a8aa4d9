use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::integrations::{EmailReceipt, PushReceipt, TaskReceipt};
use crate::task::ParsedTask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageName {
    Input,
    Ocr,
    Parse,
    Decision,
    Task,
    Email,
    Push,
    Log,
}

impl StageName {
    pub const ALL: [StageName; 8] = [
        Self::Input,
        Self::Ocr,
        Self::Parse,
        Self::Decision,
        Self::Task,
        Self::Email,
        Self::Push,
        Self::Log,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Ocr => "ocr",
            Self::Parse => "parse",
            Self::Decision => "decision",
            Self::Task => "task",
            Self::Email => "email",
            Self::Push => "push",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage '{}'", s))
    }
}

/// What the decision stage chose to do with the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionKind {
    Task,
    Email,
    Push,
    None,
}

/// OCR output as stored on the state: either plain text or, when the
/// provider text itself is a JSON document, the parsed structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OcrText {
    Raw(String),
    Structured(Value),
}

impl OcrText {
    /// Never fails: anything that is not a JSON object or array stays raw.
    pub fn decode(text: &str) -> Self {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => Self::Structured(value),
            _ => Self::Raw(text.to_string()),
        }
    }

    /// Plain text for classification. Structured OCR payloads contribute
    /// their first page's `ParsedText` when present.
    pub fn as_text(&self) -> String {
        match self {
            Self::Raw(text) => text.clone(),
            Self::Structured(value) => value
                .pointer("/ParsedResults/0/ParsedText")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActionReceipt {
    Task(TaskReceipt),
    Email(EmailReceipt),
    Push(PushReceipt),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: StageName,
    pub message: String,
}

/// Fields that stages declare as inputs and outputs for snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateField {
    RunId,
    ImageReference,
    OcrText,
    ParsedTask,
    NextAction,
    ActionResult,
}

impl StateField {
    pub fn key(&self) -> &'static str {
        match self {
            Self::RunId => "run_id",
            Self::ImageReference => "image_reference",
            Self::OcrText => "ocr_text",
            Self::ParsedTask => "parsed_task",
            Self::NextAction => "next_action",
            Self::ActionResult => "action_result",
        }
    }
}

/// The record threaded through every stage of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub run_id: Uuid,
    pub stage: Option<StageName>,
    pub input_snapshot: Option<Map<String, Value>>,
    pub output_snapshot: Option<Map<String, Value>>,
    pub error: Option<String>,
    #[serde(default)]
    pub failures: Vec<StageFailure>,
    pub image_reference: PathBuf,
    pub ocr_text: Option<OcrText>,
    pub parsed_task: Option<ParsedTask>,
    pub next_action: Option<ActionKind>,
    pub action_result: Option<ActionReceipt>,
    #[serde(default)]
    pub logged: bool,
}

impl PipelineState {
    pub fn new(image_reference: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stage: None,
            input_snapshot: None,
            output_snapshot: None,
            error: None,
            failures: Vec::new(),
            image_reference: image_reference.to_path_buf(),
            ocr_text: None,
            parsed_task: None,
            next_action: None,
            action_result: None,
            logged: false,
        }
    }

    /// True when any stage failed or annotated an error during the run.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_stages(&self) -> Vec<StageName> {
        self.failures.iter().map(|f| f.stage).collect()
    }

    /// Captures the given fields. The same state and field list always
    /// produce an equal mapping.
    pub fn snapshot(&self, fields: &[StateField]) -> Map<String, Value> {
        fields
            .iter()
            .map(|field| (field.key().to_string(), self.field_value(*field)))
            .collect()
    }

    fn field_value(&self, field: StateField) -> Value {
        let value = match field {
            StateField::RunId => serde_json::to_value(self.run_id),
            StateField::ImageReference => serde_json::to_value(&self.image_reference),
            StateField::OcrText => serde_json::to_value(&self.ocr_text),
            StateField::ParsedTask => serde_json::to_value(&self.parsed_task),
            StateField::NextAction => serde_json::to_value(self.next_action),
            StateField::ActionResult => serde_json::to_value(&self.action_result),
        };
        value.unwrap_or(Value::Null)
    }

    /// The whole state as a JSON mapping.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn from_map(map: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(map))
    }
}
