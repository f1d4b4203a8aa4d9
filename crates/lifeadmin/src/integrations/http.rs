//! Shared HTTP plumbing for the collaborator clients.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::IntegrationError;
use crate::sanitize;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub fn build_client(timeout: Duration) -> Result<Client, IntegrationError> {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .timeout(timeout)
        .user_agent(concat!("lifeadmin/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| transport("http", e))
}

pub fn transport(service: &str, source: reqwest::Error) -> IntegrationError {
    IntegrationError::Http {
        service: service.to_string(),
        source,
    }
}

/// Passes 2xx responses through and turns anything else into
/// [`IntegrationError::Status`] with a truncated body.
pub async fn check_status(service: &str, response: Response) -> Result<Response, IntegrationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IntegrationError::Status {
        service: service.to_string(),
        status: status.as_u16(),
        body: sanitize::truncate_body(&body),
    })
}

pub async fn read_json<T: DeserializeOwned>(
    service: &str,
    response: Response,
) -> Result<T, IntegrationError> {
    let text = response.text().await.map_err(|e| transport(service, e))?;
    serde_json::from_str(&text).map_err(|e| {
        IntegrationError::invalid_response(
            service,
            format!("{} (body: {})", e, sanitize::truncate_body(&text)),
        )
    })
}

/// Joins a configured base URL and a path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
