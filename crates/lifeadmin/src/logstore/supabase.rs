//! PostgREST insert into a Supabase table.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{LogEntry, LogStore, LogStoreError};
use crate::integrations::http::{self, transport};
use crate::integrations::IntegrationError;
use crate::pipeline::StageName;
use crate::retry::RetryPolicy;

const SERVICE: &str = "supabase";

/// A row of the `logs` table. The table has no run column, so the run id
/// travels inside `input_data`.
#[derive(Debug, Serialize)]
pub struct LogRow<'a> {
    pub stage: StageName,
    pub input_data: Map<String, Value>,
    pub output_data: Option<&'a Map<String, Value>>,
    pub error: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
}

impl<'a> LogRow<'a> {
    pub fn from_entry(entry: &'a LogEntry) -> Self {
        let mut input_data = entry.input_data.clone().unwrap_or_default();
        input_data.insert("run_id".to_string(), Value::String(entry.run_id.to_string()));
        Self {
            stage: entry.stage,
            input_data,
            output_data: entry.output_data.as_ref(),
            error: entry.error.as_deref(),
            timestamp: entry.timestamp,
        }
    }
}

pub struct SupabaseLogStore {
    client: Client,
    url: String,
    key: SecretString,
    retry: RetryPolicy,
}

impl SupabaseLogStore {
    pub fn new(
        project_url: SecretString,
        key: SecretString,
        table: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, IntegrationError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            url: table_url(project_url.expose_secret(), table),
            key,
            retry,
        })
    }

    async fn insert_once(&self, row: &LogRow<'_>) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(&self.url)
            .header("apikey", self.key.expose_secret())
            .bearer_auth(self.key.expose_secret())
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| transport(SERVICE, e))?;
        http::check_status(SERVICE, response).await?;
        Ok(())
    }
}

#[async_trait]
impl LogStore for SupabaseLogStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogStoreError> {
        let row = LogRow::from_entry(entry);
        let row = &row;
        self.retry
            .run(SERVICE, || async move { self.insert_once(row).await })
            .await?;
        Ok(())
    }
}

pub fn table_url(project_url: &str, table: &str) -> String {
    http::endpoint(project_url, &format!("rest/v1/{}", table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    fn entry() -> LogEntry {
        let mut input = Map::new();
        input.insert("image_reference".to_string(), json!("bill.png"));
        LogEntry {
            run_id: Uuid::new_v4(),
            stage: StageName::Ocr,
            input_data: Some(input),
            output_data: None,
            error: Some("OCR failed".to_string()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_row_has_only_table_columns() {
        let entry = entry();
        let row = serde_json::to_value(LogRow::from_entry(&entry)).unwrap();
        let mut keys: Vec<_> = row.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["error", "input_data", "output_data", "stage", "timestamp"]
        );
        assert_eq!(row["stage"], json!("ocr"));
        assert_eq!(row["error"], json!("OCR failed"));
    }

    #[test]
    fn test_row_carries_run_id_in_input() {
        let entry = entry();
        let row = serde_json::to_value(LogRow::from_entry(&entry)).unwrap();
        assert_eq!(row["input_data"]["run_id"], json!(entry.run_id.to_string()));
        assert_eq!(row["input_data"]["image_reference"], json!("bill.png"));
    }

    #[test]
    fn test_table_url() {
        assert_eq!(
            table_url("https://abc.supabase.co/", "logs"),
            "https://abc.supabase.co/rest/v1/logs"
        );
    }

    #[test]
    fn test_new_builds_url() {
        let store = SupabaseLogStore::new(
            SecretString::from("https://abc.supabase.co"),
            SecretString::from("key"),
            "logs",
            Duration::from_secs(15),
            RetryPolicy::none(),
        )
        .unwrap();
        assert_eq!(store.url, "https://abc.supabase.co/rest/v1/logs");
    }
}
