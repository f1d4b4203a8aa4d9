use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use super::http::{self, transport};
use super::{IntegrationError, PushNotification, PushReceipt, PushSender};
use crate::config::{HttpConfig, OneSignalConfig};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

const SERVICE: &str = "onesignal";

pub struct OneSignalClient {
    client: Client,
    app_id: Option<SecretString>,
    api_key: Option<SecretString>,
    base_url: String,
    retry: RetryPolicy,
}

impl OneSignalClient {
    pub fn from_config(
        config: &OneSignalConfig,
        http_config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let app_id = config
            .app_id
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "onesignal.appId".to_string(),
                source: e,
            })?;
        let api_key = config
            .api_key
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "onesignal.apiKey".to_string(),
                source: e,
            })?;
        let client = http::build_client(Duration::from_secs(http_config.timeout_secs)).map_err(
            |e| ConfigError::Validation {
                message: e.to_string(),
            },
        )?;
        Ok(Self {
            client,
            app_id,
            api_key,
            base_url: config.base_url.clone(),
            retry,
        })
    }

    async fn send_once(&self, api_key: &SecretString, body: &Value) -> Result<Value, IntegrationError> {
        let response = self
            .client
            .post(http::endpoint(&self.base_url, "notifications"))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", api_key.expose_secret()),
            )
            .json(body)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = http::check_status(SERVICE, response).await?;
        http::read_json(SERVICE, response).await
    }
}

#[async_trait]
impl PushSender for OneSignalClient {
    async fn send(&self, push: &PushNotification) -> Result<PushReceipt, IntegrationError> {
        let (Some(app_id), Some(api_key)) = (self.app_id.as_ref(), self.api_key.as_ref()) else {
            return Err(IntegrationError::not_configured(
                SERVICE,
                "app id and API key are both required",
            ));
        };

        let body = notification_body(app_id.expose_secret(), push);
        let body = &body;
        let response = self
            .retry
            .run(SERVICE, || async move { self.send_once(api_key, body).await })
            .await?;

        parse_receipt(&response)
    }
}

pub fn notification_body(app_id: &str, push: &PushNotification) -> Value {
    json!({
        "app_id": app_id,
        "include_external_user_ids": [push.target],
        "headings": { "en": push.heading },
        "contents": { "en": push.message }
    })
}

/// OneSignal reports some failures (e.g. no subscribed recipients) inside a
/// successful response.
pub fn parse_receipt(response: &Value) -> Result<PushReceipt, IntegrationError> {
    let id = response
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    if id.is_none() {
        if let Some(errors) = response.get("errors") {
            return Err(IntegrationError::invalid_response(SERVICE, errors.to_string()));
        }
    }
    Ok(PushReceipt {
        id,
        recipients: response.get("recipients").and_then(Value::as_u64),
    })
}
