//! Document classification through Groq's OpenAI-compatible chat API.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::http::{self, transport};
use super::{Classifier, IntegrationError};
use crate::config::{HttpConfig, LlmConfig};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use crate::sanitize;
use crate::task::ParsedTask;

const SERVICE: &str = "groq";

static RE_CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());

pub const SYSTEM_PROMPT: &str = r#"You are LifeAdmin AI, a document understanding and automation assistant.
Extract task information from noisy OCR text and compute missing values.

Respond with a single JSON object with exactly these keys:
task_type, amount, due_date, provider, reminder_days_before, email

Rules:
1. task_type is always a non-null string, one of "invoice", "receipt", "bill", "subscription", "other". Use "other" when unsure.
   - invoice: a formal payment request with a total and a due date
   - receipt: proof of a payment that was already made
   - bill: a utility or recurring service charge with a due date
   - subscription: a recurring membership, plan or renewal
2. due_date uses YYYY-MM-DD.
   - If the text states "Due date:", "Due:" or "Deadline:", use that date.
   - If it says "due within X days" and an issue date is present, due_date = issue date + X days.
   - Never guess a date. Use null when no rule applies.
3. amount is the total or amount due, not a line item.
4. provider is the company that issued the document.
5. reminder_days_before:
   - 3 when the document has a due date and is not a subscription,
   - the document's own value when it states one,
   - null for subscriptions without an explicit reminder, and when there is no due date.
6. email is a contact address for the recipient if one is printed, otherwise null.
7. Any other field may be null. Output only the JSON object, no commentary."#;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

pub struct GroqClassifier {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    temperature: f32,
    retry: RetryPolicy,
}

impl GroqClassifier {
    pub fn from_config(
        config: &LlmConfig,
        http_config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "llm.apiKey".to_string(),
                source: e,
            })?;
        let client = http::build_client(Duration::from_secs(http_config.timeout_secs)).map_err(
            |e| ConfigError::Validation {
                message: e.to_string(),
            },
        )?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            retry,
        })
    }

    async fn complete_once(
        &self,
        api_key: &SecretString,
        request: &ChatRequest<'_>,
    ) -> Result<Value, IntegrationError> {
        let response = self
            .client
            .post(http::endpoint(&self.base_url, "chat/completions"))
            .bearer_auth(api_key.expose_secret())
            .json(request)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = http::check_status(SERVICE, response).await?;
        http::read_json(SERVICE, response).await
    }
}

#[async_trait]
impl Classifier for GroqClassifier {
    async fn classify(&self, text: &str) -> Result<ParsedTask, IntegrationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::not_configured(SERVICE, "no API key"))?;

        let prompt = user_prompt(text);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
        };
        let request = &request;

        let completion = self
            .retry
            .run(SERVICE, || async move { self.complete_once(api_key, request).await })
            .await?;

        let content = completion
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| IntegrationError::missing_field(SERVICE, "choices[0].message.content"))?;

        debug!(chars = content.len(), "Received classification");
        parse_reply(content, text)
    }
}

pub fn user_prompt(text: &str) -> String {
    format!(
        "Extract structured information from the following OCR text and return JSON only.\n\nOCR TEXT:\n{}\n",
        text
    )
}

/// Turns the model's reply into a task. Code fences and leading prose
/// around the JSON object are tolerated.
pub fn parse_reply(content: &str, raw_text: &str) -> Result<ParsedTask, IntegrationError> {
    let json = extract_json(content);
    let value: Value = serde_json::from_str(json).map_err(|e| {
        IntegrationError::invalid_response(
            SERVICE,
            format!(
                "model output is not JSON: {} (output: {})",
                e,
                sanitize::truncate_body(content)
            ),
        )
    })?;

    ParsedTask::from_model_output(&value, raw_text, "")
        .map_err(|e| IntegrationError::invalid_response(SERVICE, e.to_string()))
}

fn extract_json(content: &str) -> &str {
    if let Some(inner) = RE_CODE_FENCE.captures(content).and_then(|c| c.get(1)) {
        return inner.as_str();
    }
    match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content.trim(),
    }
}
