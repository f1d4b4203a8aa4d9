use std::path::PathBuf;
use thiserror::Error;

/// Failure of an external collaborator call.
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("{service} request failed: {source}")]
    Http {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} response is missing '{field}'")]
    MissingField { service: String, field: String },

    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse { service: String, message: String },

    #[error("Failed to read upload '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} is not configured: {reason}")]
    NotConfigured { service: String, reason: String },
}

impl IntegrationError {
    /// Transport failures, server errors and rate limiting are worth
    /// another attempt. Everything else fails the same way twice.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn missing_field(service: &str, field: &str) -> Self {
        Self::MissingField {
            service: service.to_string(),
            field: field.to_string(),
        }
    }

    pub fn invalid_response(service: &str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service: service.to_string(),
            message: message.into(),
        }
    }

    pub fn not_configured(service: &str, reason: impl Into<String>) -> Self {
        Self::NotConfigured {
            service: service.to_string(),
            reason: reason.into(),
        }
    }
}
