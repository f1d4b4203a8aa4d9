use async_trait::async_trait;
use uuid::Uuid;

use super::{LogEntry, LogStore, LogStoreError};
use crate::db::{log_repo, Database, DatabaseError};

/// Log store backed by the local SQLite database. Inserts run on the
/// blocking pool so the connection mutex never stalls the async runtime.
#[derive(Clone)]
pub struct SqliteLogStore {
    db: Database,
}

impl SqliteLogStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn entries_for_run(&self, run_id: &Uuid) -> Result<Vec<LogEntry>, DatabaseError> {
        log_repo::list_by_run(&self.db, run_id)
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn append(&self, entry: &LogEntry) -> Result<(), LogStoreError> {
        let db = self.db.clone();
        let entry = entry.clone();
        tokio::task::spawn_blocking(move || log_repo::insert(&db, &entry))
            .await
            .map_err(|e| LogStoreError::Unavailable(e.to_string()))??;
        Ok(())
    }
}
