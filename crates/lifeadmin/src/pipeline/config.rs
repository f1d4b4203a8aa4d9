use secrecy::ExposeSecret;

use crate::config::{Config, RoutingConfig};
use crate::error::ConfigError;

/// Settings the stages need at run time, with secrets already resolved.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Recipient used when the document carries no address. May be empty
    /// when none is configured; the email stage then fails for that run.
    pub default_email: String,
    pub timezone: Option<String>,
    pub push_target: String,
    pub todoist_priority: u8,
    pub routing: RoutingConfig,
}

impl PipelineConfig {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let default_email = config
            .defaults
            .email
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "defaults.email".to_string(),
                source: e,
            })?;
        let timezone = config
            .defaults
            .timezone
            .resolve_optional()
            .map_err(|e| ConfigError::Secret {
                name: "defaults.timezone".to_string(),
                source: e,
            })?;

        Ok(Self {
            default_email: default_email
                .map(|s| s.expose_secret().to_string())
                .unwrap_or_default(),
            timezone: timezone
                .map(|s| s.expose_secret().to_string())
                .filter(|tz| !tz.is_empty()),
            push_target: config.defaults.push_target.clone(),
            todoist_priority: config.todoist.priority,
            routing: config.routing,
        })
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_email: String::new(),
            timezone: None,
            push_target: "user_1".to_string(),
            todoist_priority: 1,
            routing: RoutingConfig::default(),
        }
    }
}
