use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;
use crate::secrets::SecretRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub todoist: TodoistConfig,
    #[serde(default)]
    pub sendgrid: SendGridConfig,
    #[serde(default)]
    pub onesignal: OneSignalConfig,
    #[serde(default)]
    pub log_store: LogStoreConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_worker_count() -> usize {
    num_cpus::get()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            worker_count: default_worker_count(),
            ocr: OcrConfig::default(),
            llm: LlmConfig::default(),
            todoist: TodoistConfig::default(),
            sendgrid: SendGridConfig::default(),
            onesignal: OneSignalConfig::default(),
            log_store: LogStoreConfig::default(),
            defaults: DefaultsConfig::default(),
            retry: RetryPolicy::default(),
            http: HttpConfig::default(),
            routing: RoutingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrConfig {
    #[serde(default = "default_ocr_key")]
    pub api_key: SecretRef,
    #[serde(default = "default_ocr_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_ocr_key() -> SecretRef {
    SecretRef::from_env("OCR_SPACE_API_KEY")
}

fn default_ocr_endpoint() -> String {
    "https://api.ocr.space/parse/image".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            api_key: default_ocr_key(),
            endpoint: default_ocr_endpoint(),
            language: default_language(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    #[serde(default = "default_llm_key")]
    pub api_key: SecretRef,
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_key() -> SecretRef {
    SecretRef::from_env("GROQ_API_KEY")
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: default_llm_key(),
            base_url: default_llm_base_url(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoistConfig {
    #[serde(default = "default_todoist_key")]
    pub api_key: SecretRef,
    #[serde(default = "default_todoist_base_url")]
    pub base_url: String,
    /// 1 (low) through 4 (urgent).
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_todoist_key() -> SecretRef {
    SecretRef::from_env("TODOIST_API_KEY")
}

fn default_todoist_base_url() -> String {
    "https://api.todoist.com".to_string()
}

fn default_priority() -> u8 {
    1
}

impl Default for TodoistConfig {
    fn default() -> Self {
        Self {
            api_key: default_todoist_key(),
            base_url: default_todoist_base_url(),
            priority: default_priority(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendGridConfig {
    #[serde(default = "default_sendgrid_key")]
    pub api_key: SecretRef,
    #[serde(default = "default_sendgrid_base_url")]
    pub base_url: String,
    #[serde(default = "default_sender")]
    pub sender: String,
}

fn default_sendgrid_key() -> SecretRef {
    SecretRef::from_env("SENDGRID_API_KEY")
}

fn default_sendgrid_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_sender() -> String {
    "no-reply@lifeadmin.ai".to_string()
}

impl Default for SendGridConfig {
    fn default() -> Self {
        Self {
            api_key: default_sendgrid_key(),
            base_url: default_sendgrid_base_url(),
            sender: default_sender(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneSignalConfig {
    #[serde(default = "default_onesignal_app_id")]
    pub app_id: SecretRef,
    #[serde(default = "default_onesignal_key")]
    pub api_key: SecretRef,
    #[serde(default = "default_onesignal_base_url")]
    pub base_url: String,
}

fn default_onesignal_app_id() -> SecretRef {
    SecretRef::from_env("ONESIGNAL_APP_ID")
}

fn default_onesignal_key() -> SecretRef {
    SecretRef::from_env("ONESIGNAL_API_KEY")
}

fn default_onesignal_base_url() -> String {
    "https://api.onesignal.com".to_string()
}

impl Default for OneSignalConfig {
    fn default() -> Self {
        Self {
            app_id: default_onesignal_app_id(),
            api_key: default_onesignal_key(),
            base_url: default_onesignal_base_url(),
        }
    }
}

/// Where stage log entries are appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LogStoreConfig {
    Sqlite {
        /// Defaults to `~/.lifeadmin/data/lifeadmin.db`.
        #[serde(default)]
        path: Option<String>,
    },
    Supabase {
        #[serde(default = "default_supabase_url")]
        url: SecretRef,
        #[serde(default = "default_supabase_key")]
        key: SecretRef,
        #[serde(default = "default_supabase_table")]
        table: String,
    },
    Memory,
}

fn default_supabase_url() -> SecretRef {
    SecretRef::from_env("SUPABASE_URL")
}

fn default_supabase_key() -> SecretRef {
    SecretRef::from_env("SUPABASE_KEY")
}

fn default_supabase_table() -> String {
    "logs".to_string()
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self::Sqlite { path: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultsConfig {
    /// Recipient used when a document carries no address of its own.
    #[serde(default = "default_email")]
    pub email: SecretRef,
    #[serde(default = "default_timezone")]
    pub timezone: SecretRef,
    /// OneSignal external user id for push notifications.
    #[serde(default = "default_push_target")]
    pub push_target: String,
}

fn default_email() -> SecretRef {
    SecretRef::from_env("DEFAULT_USER_EMAIL")
}

fn default_timezone() -> SecretRef {
    SecretRef::from_env("DEFAULT_USER_TIMEZONE")
}

fn default_push_target() -> String {
    "user_1".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            email: default_email(),
            timezone: default_timezone(),
            push_target: default_push_target(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingConfig {
    /// Also send the reminder email after a task was created, when the
    /// document has a reminder lead time.
    #[serde(default)]
    pub email_after_task: bool,
}
