//! OCR.space client.
//!
//! Files are uploaded as a `base64Image` data URI so the request is a plain
//! form post. The provider answers `200` even for failed recognitions and
//! signals problems through `IsErroredOnProcessing`, so the body is always
//! inspected.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use super::http::{self, transport};
use super::{IntegrationError, OcrExtraction, OcrProvider};
use crate::config::{HttpConfig, OcrConfig};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;
use crate::sanitize;

const SERVICE: &str = "ocr.space";

pub struct OcrSpaceClient {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
    language: String,
    retry: RetryPolicy,
}

impl OcrSpaceClient {
    pub fn from_config(
        config: &OcrConfig,
        http_config: &HttpConfig,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "ocr.apiKey".to_string(),
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
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            retry,
        })
    }

    async fn post_once(&self, form: &[(&str, &str)]) -> Result<Value, IntegrationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        let response = http::check_status(SERVICE, response).await?;
        http::read_json(SERVICE, response).await
    }
}

#[async_trait]
impl OcrProvider for OcrSpaceClient {
    async fn extract(&self, path: &Path) -> Result<OcrExtraction, IntegrationError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| IntegrationError::not_configured(SERVICE, "no API key"))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IntegrationError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        let image = data_uri(path, &bytes);

        debug!(
            file = %sanitize::redact_path(path),
            bytes = bytes.len(),
            "Uploading file for OCR"
        );

        let form = [
            ("apikey", api_key.expose_secret()),
            ("language", self.language.as_str()),
            ("isOverlayRequired", "false"),
            ("base64Image", image.as_str()),
        ];
        let form = &form[..];
        let response = self
            .retry
            .run(SERVICE, || async move { self.post_once(form).await })
            .await?;

        parse_response(response)
    }
}

/// Encodes file contents as a `data:<mime>;base64,...` URI.
pub fn data_uri(path: &Path, bytes: &[u8]) -> String {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    format!("data:{};base64,{}", mime.essence_str(), STANDARD.encode(bytes))
}

/// Validates an OCR.space response body and pulls out the first page's text.
pub fn parse_response(response: Value) -> Result<OcrExtraction, IntegrationError> {
    if response
        .get("IsErroredOnProcessing")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        return Err(IntegrationError::invalid_response(
            SERVICE,
            error_message(&response),
        ));
    }

    let parsed_text = response
        .pointer("/ParsedResults/0/ParsedText")
        .and_then(Value::as_str)
        .ok_or_else(|| IntegrationError::missing_field(SERVICE, "ParsedResults[0].ParsedText"))?
        .to_string();
    let exit_code = response.get("OCRExitCode").and_then(Value::as_i64);

    Ok(OcrExtraction {
        parsed_text,
        exit_code,
        response,
    })
}

fn error_message(response: &Value) -> String {
    match response.get("ErrorMessage") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("; "),
        _ => "processing failed".to_string(),
    }
}
