use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{LogEntry, LogStore, LogStoreError};

/// In-process log store for dry runs and tests.
#[derive(Default)]
pub struct MemoryLogStore {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn entries_for_run(&self, run_id: Uuid) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.run_id == run_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogStoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| LogStoreError::Unavailable("lock poisoned".to_string()))?;
        entries.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::StageName;
    use chrono::Utc;

    fn entry(run_id: Uuid, stage: StageName) -> LogEntry {
        LogEntry {
            run_id,
            stage,
            input_data: None,
            output_data: None,
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_append_and_filter_by_run() {
        let store = MemoryLogStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        store.append(&entry(a, StageName::Input)).await.unwrap();
        store.append(&entry(b, StageName::Input)).await.unwrap();
        store.append(&entry(a, StageName::Ocr)).await.unwrap();

        assert_eq!(store.len(), 3);
        let stages: Vec<_> = store.entries_for_run(a).iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![StageName::Input, StageName::Ocr]);
    }

    #[test]
    fn test_new_store_is_empty() {
        assert!(MemoryLogStore::new().is_empty());
    }
}
