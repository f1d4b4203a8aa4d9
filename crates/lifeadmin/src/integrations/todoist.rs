use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;

use super::http::{self, transport};
use super::{IntegrationError, NewTask, TaskCreator, TaskReceipt};
use crate::config::{HttpConfig, TodoistConfig};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

const SERVICE: &str = "todoist";

/// Request body for `POST /rest/v2/tasks`.
#[derive(Debug, Serialize)]
pub struct CreateTaskBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

impl<'a> From<&'a NewTask> for CreateTaskBody<'a> {
    fn from(task: &'a NewTask) -> Self {
        Self {
            content: &task.title,
            due_date: task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            priority: task.priority,
            description: task.description.as_deref().filter(|d| !d.is_empty()),
        }
    }
}

pub struct TodoistClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    retry: RetryPolicy,
}

impl TodoistClient {
    pub fn from_config(
        config: &TodoistConfig,
        http_config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "todoist.apiKey".to_string(),
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
            retry,
        })
    }

    async fn create_once(
        &self,
        api_key: &SecretString,
        body: &CreateTaskBody<'_>,
    ) -> Result<Value, IntegrationError> {
        let response = self
            .client
            .post(http::endpoint(&self.base_url, "rest/v2/tasks"))
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = http::check_status(SERVICE, response).await?;
        http::read_json(SERVICE, response).await
    }
}

#[async_trait]
impl TaskCreator for TodoistClient {
    async fn create(&self, task: &NewTask) -> Result<TaskReceipt, IntegrationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::not_configured(SERVICE, "no API key"))?;

        let body = CreateTaskBody::from(task);
        let body = &body;
        let created = self
            .retry
            .run(SERVICE, || async move { self.create_once(api_key, body).await })
            .await?;

        parse_receipt(&created)
    }
}

pub fn parse_receipt(created: &Value) -> Result<TaskReceipt, IntegrationError> {
    let id = match created.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(IntegrationError::missing_field(SERVICE, "id")),
    };
    Ok(TaskReceipt {
        id,
        url: created.get("url").and_then(Value::as_str).map(str::to_string),
    })
}
