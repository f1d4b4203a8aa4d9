use std::path::{Path, PathBuf};

use crate::config::schema::{Config, LogStoreConfig};
use crate::error::ConfigError;
use crate::secrets::SecretRef;
use crate::task::looks_like_email;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Returns the canonical config path: `~/.lifeadmin/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".lifeadmin").join("config.json"))
}

/// Loads a JSON or YAML (by extension) config file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        load_config_from_yaml_str(&content)
    } else {
        load_config_from_str(&content)
    }
}

/// Loads the given file, or the default path when it exists, or falls back
/// to an env-only configuration.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }
    match default_config_path() {
        Some(default) if default.is_file() => {
            log::debug!("Loading config from {}", default.display());
            load_config(default)
        }
        _ => {
            log::debug!("No config file found, using environment defaults");
            Ok(Config::default())
        }
    }
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;
    load_config_from_value(json_value)
}

pub fn load_config_from_yaml_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_yaml::from_str(content)?;
    load_config_from_value(json_value)
}

fn load_config_from_value(json_value: serde_json::Value) -> Result<Config, ConfigError> {
    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker_count == 0 {
        return Err(ConfigError::Validation {
            message: "workerCount must be at least 1".to_string(),
        });
    }

    if !(1..=10).contains(&config.retry.max_attempts) {
        return Err(ConfigError::Validation {
            message: format!(
                "retry.maxAttempts must be between 1 and 10, got {}",
                config.retry.max_attempts
            ),
        });
    }

    if config.retry.multiplier == 0 {
        return Err(ConfigError::Validation {
            message: "retry.multiplier must be at least 1".to_string(),
        });
    }

    if !(1..=4).contains(&config.todoist.priority) {
        return Err(ConfigError::Validation {
            message: format!(
                "todoist.priority must be between 1 and 4, got {}",
                config.todoist.priority
            ),
        });
    }

    if config.http.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "http.timeoutSecs must be at least 1".to_string(),
        });
    }

    if !looks_like_email(&config.sendgrid.sender) {
        return Err(ConfigError::Validation {
            message: format!("sendgrid.sender is not an email address: {}", config.sendgrid.sender),
        });
    }

    for (name, secret) in secret_refs(config) {
        if !secret.is_configured() {
            return Err(ConfigError::Validation {
                message: format!("{} must set one of value, file or envVar", name),
            });
        }
    }

    // Only literal values can be checked here; env and file sources are
    // checked when resolved.
    if let Some(email) = config.defaults.email.value.as_deref() {
        if !looks_like_email(email) {
            return Err(ConfigError::Validation {
                message: format!("defaults.email is not an email address: {}", email),
            });
        }
    }

    Ok(())
}

fn secret_refs(config: &Config) -> Vec<(&'static str, &SecretRef)> {
    let mut refs = vec![
        ("ocr.apiKey", &config.ocr.api_key),
        ("llm.apiKey", &config.llm.api_key),
        ("todoist.apiKey", &config.todoist.api_key),
        ("sendgrid.apiKey", &config.sendgrid.api_key),
        ("onesignal.appId", &config.onesignal.app_id),
        ("onesignal.apiKey", &config.onesignal.api_key),
        ("defaults.email", &config.defaults.email),
        ("defaults.timezone", &config.defaults.timezone),
    ];
    if let LogStoreConfig::Supabase { url, key, .. } = &config.log_store {
        refs.push(("logStore.url", url));
        refs.push(("logStore.key", key));
    }
    refs
}
