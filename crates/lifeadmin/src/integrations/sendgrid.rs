use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use super::http::{self, transport};
use super::{EmailReceipt, EmailSender, IntegrationError, OutgoingEmail};
use crate::config::{HttpConfig, SendGridConfig};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

const SERVICE: &str = "sendgrid";

pub struct SendGridClient {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
    sender: String,
    retry: RetryPolicy,
}

impl SendGridClient {
    pub fn from_config(
        config: &SendGridConfig,
        http_config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "sendgrid.apiKey".to_string(),
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
            sender: config.sender.clone(),
            retry,
        })
    }

    async fn send_once(
        &self,
        api_key: &SecretString,
        body: &Value,
    ) -> Result<EmailReceipt, IntegrationError> {
        let response = self
            .client
            .post(http::endpoint(&self.base_url, "v3/mail/send"))
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = http::check_status(SERVICE, response).await?;

        // 202 Accepted with an empty body; the id only travels in a header.
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(EmailReceipt {
            status: response.status().as_u16(),
            message_id,
        })
    }
}

#[async_trait]
impl EmailSender for SendGridClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<EmailReceipt, IntegrationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::not_configured(SERVICE, "no API key"))?;
        if email.to.trim().is_empty() {
            return Err(IntegrationError::not_configured(SERVICE, "no recipient address"));
        }

        let body = mail_body(&self.sender, email);
        let body = &body;
        self.retry
            .run(SERVICE, || async move { self.send_once(api_key, body).await })
            .await
    }
}

/// Builds the v3 `mail/send` payload for a plain-text message.
pub fn mail_body(sender: &str, email: &OutgoingEmail) -> Value {
    json!({
        "personalizations": [{ "to": [{ "email": email.to }] }],
        "from": { "email": sender },
        "subject": email.subject,
        "content": [{ "type": "text/plain", "value": email.body }]
    })
}
