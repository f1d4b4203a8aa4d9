//! Queries for the `stage_logs` table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Row};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{Database, DatabaseError};
use crate::logstore::LogEntry;

const TABLE: &str = "stage_logs";

/// Per-run aggregate for listing recent runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub run_id: String,
    pub entries: u64,
    pub errors: u64,
    pub first_at: String,
    pub last_at: String,
}

pub fn insert(db: &Database, entry: &LogEntry) -> Result<i64, DatabaseError> {
    let input = encode_map(entry.input_data.as_ref())?;
    let output = encode_map(entry.output_data.as_ref())?;
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO stage_logs (run_id, stage, input_data, output_data, error, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.run_id.to_string(),
                entry.stage.as_str(),
                input,
                output,
                entry.error,
                entry.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Entries of one run in insertion order.
pub fn list_by_run(db: &Database, run_id: &Uuid) -> Result<Vec<LogEntry>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT run_id, stage, input_data, output_data, error, timestamp
             FROM stage_logs WHERE run_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![run_id.to_string()], RawRow::from_row)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.decode()?);
        }
        Ok(entries)
    })
}

pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM stage_logs", [], |r| r.get(0))?;
        Ok(count as u64)
    })
}

/// Most recent runs first.
pub fn list_recent_runs(db: &Database, limit: u32) -> Result<Vec<RunSummary>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT run_id, COUNT(*), SUM(CASE WHEN error IS NULL THEN 0 ELSE 1 END),
                    MIN(timestamp), MAX(timestamp)
             FROM stage_logs
             GROUP BY run_id
             ORDER BY MAX(id) DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(RunSummary {
                run_id: row.get(0)?,
                entries: row.get::<_, i64>(1)? as u64,
                errors: row.get::<_, i64>(2)? as u64,
                first_at: row.get(3)?,
                last_at: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    })
}

struct RawRow {
    run_id: String,
    stage: String,
    input_data: Option<String>,
    output_data: Option<String>,
    error: Option<String>,
    timestamp: String,
}

impl RawRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            run_id: row.get("run_id")?,
            stage: row.get("stage")?,
            input_data: row.get("input_data")?,
            output_data: row.get("output_data")?,
            error: row.get("error")?,
            timestamp: row.get("timestamp")?,
        })
    }

    fn decode(self) -> Result<LogEntry, DatabaseError> {
        let run_id = Uuid::parse_str(&self.run_id).map_err(corrupt)?;
        let stage = self.stage.parse().map_err(corrupt)?;
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(corrupt)?
            .with_timezone(&Utc);
        Ok(LogEntry {
            run_id,
            stage,
            input_data: decode_map(self.input_data)?,
            output_data: decode_map(self.output_data)?,
            error: self.error,
            timestamp,
        })
    }
}

fn corrupt(e: impl ToString) -> DatabaseError {
    DatabaseError::CorruptRow {
        table: TABLE,
        reason: e.to_string(),
    }
}

fn encode_map(map: Option<&Map<String, Value>>) -> Result<Option<String>, DatabaseError> {
    map.map(serde_json::to_string).transpose().map_err(corrupt)
}

fn decode_map(text: Option<String>) -> Result<Option<Map<String, Value>>, DatabaseError> {
    text.map(|t| serde_json::from_str(&t)).transpose().map_err(corrupt)
}
