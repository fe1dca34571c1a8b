use crate::db::db::{Db, SharedConnection};
use crate::db::duplicates::DuplicateLogs;
use crate::libs::ingest::LogSink;
use crate::libs::log_record::{LogRecord, NewLogRecord};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use serde_json::Value as JsonValue;
use std::path::Path;

const COLUMNS: &str = "id, machine_id, line_number, operator_id, date, start_time, end_time, mode, stitch_count, \
    needle_runtime, needle_stoptime, tx_log_id, str_log_id, device_id, reserve, created_at";

const INSERT_LOG: &str = "INSERT INTO machine_logs (machine_id, line_number, operator_id, date, start_time, end_time, mode,
    stitch_count, needle_runtime, needle_stoptime, tx_log_id, str_log_id, device_id, reserve)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)";

const INSERT_LOG_UNLESS_EXISTS: &str = "INSERT INTO machine_logs (machine_id, line_number, operator_id, date, start_time, end_time, mode,
    stitch_count, needle_runtime, needle_stoptime, tx_log_id, str_log_id, device_id, reserve)
    SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14
    WHERE NOT EXISTS (
        SELECT 1 FROM machine_logs
        WHERE str_log_id = ?12 AND machine_id = ?1 AND date = ?4 AND start_time = ?5 AND end_time = ?6
    )";

macro_rules! insert_params {
    ($record:expr) => {
        params![
            $record.machine_id,
            $record.line_number,
            $record.operator_id,
            $record.date,
            $record.start_time,
            $record.end_time,
            $record.mode,
            $record.stitch_count,
            $record.needle_runtime,
            $record.needle_stoptime,
            $record.tx_log_id,
            $record.str_log_id,
            $record.device_id,
            $record.reserve
        ]
    };
}

const COUNT_MACHINES: &str = "SELECT COUNT(DISTINCT machine_id) FROM machine_logs";
const COUNT_LINES: &str = "SELECT COUNT(DISTINCT line_number) FROM machine_logs";
const COUNT_LOGS: &str = "SELECT COUNT(*) FROM machine_logs";

/// Field predicates for a bulk fetch. `None` leaves a field unconstrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub machine_id: Option<i64>,
    pub line_number: Option<i64>,
    pub operator_id: Option<String>,
    pub mode: Option<i32>,
}

impl LogFilter {
    pub fn between(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self {
            from,
            to,
            ..Self::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(from) = self.from {
            conditions.push("date >= ?");
            values.push(Value::Text(from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to {
            conditions.push("date <= ?");
            values.push(Value::Text(to.format("%Y-%m-%d").to_string()));
        }
        if let Some(machine_id) = self.machine_id {
            conditions.push("machine_id = ?");
            values.push(Value::Integer(machine_id));
        }
        if let Some(line_number) = self.line_number {
            conditions.push("line_number = ?");
            values.push(Value::Integer(line_number));
        }
        if let Some(operator_id) = &self.operator_id {
            conditions.push("operator_id = ?");
            values.push(Value::Text(operator_id.clone()));
        }
        if let Some(mode) = self.mode {
            conditions.push("mode = ?");
            values.push(Value::Integer(mode as i64));
        }

        if conditions.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), values)
        }
    }
}

/// Append-only store of machine state intervals.
#[derive(Clone)]
pub struct MachineLogs {
    conn: SharedConnection,
}

impl MachineLogs {
    pub fn new() -> Result<Self> {
        Ok(Self::with_connection(Db::new()?.into_shared()))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_connection(Db::open(path)?.into_shared()))
    }

    pub fn with_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub fn insert(&self, record: &NewLogRecord) -> Result<i64> {
        let conn = self.conn.lock();
        conn.execute(INSERT_LOG, insert_params!(record))?;
        Ok(conn.last_insert_rowid())
    }

    /// Inserts unless a row with the same `(str_log_id, machine_id, date,
    /// start_time, end_time)` exists. The check and the insert run as one
    /// statement inside an immediate transaction, so concurrent writers on
    /// other connections cannot both pass the check.
    pub fn insert_unless_exists(&self, record: &NewLogRecord) -> Result<Option<i64>> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = tx.execute(INSERT_LOG_UNLESS_EXISTS, insert_params!(record))?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok((inserted > 0).then_some(id))
    }

    /// One bulk fetch ordered by date, start time and id.
    pub fn fetch(&self, filter: &LogFilter) -> Result<Vec<LogRecord>> {
        let (where_clause, values) = filter.where_clause();
        let sql = format!(
            "SELECT {} FROM machine_logs{} ORDER BY date, start_time, id",
            COLUMNS, where_clause
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(values.iter()), map_log_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    pub fn fetch_by_id(&self, id: i64) -> Result<Option<LogRecord>> {
        let sql = format!("SELECT {} FROM machine_logs WHERE id = ?1", COLUMNS);
        let record = self.conn.lock().query_row(&sql, params![id], map_log_record).optional()?;
        Ok(record)
    }

    pub fn count(&self) -> Result<i64> {
        count(&self.conn.lock(), COUNT_LOGS)
    }

    pub fn distinct_machine_count(&self) -> Result<i64> {
        count(&self.conn.lock(), COUNT_MACHINES)
    }

    pub fn distinct_line_count(&self) -> Result<i64> {
        count(&self.conn.lock(), COUNT_LINES)
    }
}

impl LogSink for MachineLogs {
    fn append(&self, record: &NewLogRecord) -> Result<i64> {
        self.insert(record)
    }

    fn append_unless_exists(&self, record: &NewLogRecord) -> Result<Option<i64>> {
        self.insert_unless_exists(record)
    }

    fn record_duplicate(&self, payload: &JsonValue) -> Result<()> {
        DuplicateLogs::with_connection(self.conn.clone()).record(payload)?;
        Ok(())
    }
}

fn count(conn: &Connection, sql: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [], |row| row.get(0))?)
}

fn map_log_record(row: &Row<'_>) -> rusqlite::Result<LogRecord> {
    Ok(LogRecord {
        id: row.get(0)?,
        machine_id: row.get(1)?,
        line_number: row.get(2)?,
        operator_id: row.get(3)?,
        date: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        mode: row.get(7)?,
        stitch_count: row.get(8)?,
        needle_runtime: row.get(9)?,
        needle_stoptime: row.get(10)?,
        tx_log_id: row.get(11)?,
        str_log_id: row.get(12)?,
        device_id: row.get(13)?,
        reserve: row.get(14)?,
        created_at: row.get(15)?,
    })
}
