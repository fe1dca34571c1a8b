use crate::db::db::{Db, SharedConnection};
use anyhow::Result;
use chrono::NaiveDateTime;
use rusqlite::params;
use serde_json::Value;
use std::path::Path;

const INSERT_DUPLICATE: &str = "INSERT INTO duplicate_logs (payload) VALUES (?1)";
const COUNT_DUPLICATES: &str = "SELECT COUNT(*) FROM duplicate_logs";
const SELECT_RECENT: &str = "SELECT id, payload, created_at FROM duplicate_logs ORDER BY id DESC LIMIT ?1";

/// A retransmission the ingestion gate absorbed without storing.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateLog {
    pub id: i64,
    pub payload: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone)]
pub struct DuplicateLogs {
    conn: SharedConnection,
}

impl DuplicateLogs {
    pub fn new() -> Result<Self> {
        Ok(Self::with_connection(Db::new()?.into_shared()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_connection(Db::open(path)?.into_shared()))
    }

    pub fn with_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn record(&self, payload: &Value) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(INSERT_DUPLICATE, params![payload.to_string()])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self.conn.lock().query_row(COUNT_DUPLICATES, [], |row| row.get(0))?)
    }

    /// Newest first.
    pub fn fetch_recent(&self, limit: usize) -> Result<Vec<DuplicateLog>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(SELECT_RECENT)?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, NaiveDateTime>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut duplicates = Vec::with_capacity(rows.len());
        for (id, payload, created_at) in rows {
            duplicates.push(DuplicateLog {
                id,
                payload: serde_json::from_str(&payload)?,
                created_at,
            });
        }
        Ok(duplicates)
    }
}
