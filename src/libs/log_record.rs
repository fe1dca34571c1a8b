use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Date formats accepted from devices, colon-separated first.
pub const LOG_DATE_FORMATS: [&str; 2] = ["%Y:%m:%d", "%Y-%m-%d"];

/// Operator id reported when nobody is logged in at the machine.
pub const NO_OPERATOR: &str = "0";

/// One stored machine-state interval. Immutable once persisted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub id: i64,
    pub machine_id: i64,
    pub line_number: i64,
    pub operator_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mode: i32,
    pub stitch_count: i64,
    pub needle_runtime: f64,
    pub needle_stoptime: f64,
    pub tx_log_id: i64,
    pub str_log_id: i64,
    pub device_id: i64,
    pub reserve: Option<String>,
    pub created_at: NaiveDateTime,
}

impl LogRecord {
    /// The `reserve` field read as a sewing-speed sample.
    ///
    /// Only a positive integer counts; anything else is not a sample.
    pub fn speed_sample(&self) -> Option<f64> {
        parse_speed(self.reserve.as_deref())
    }

    pub fn has_operator(&self) -> bool {
        self.operator_id != NO_OPERATOR
    }
}

/// A validated record that has not been stored yet.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewLogRecord {
    pub machine_id: i64,
    pub line_number: i64,
    pub operator_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mode: i32,
    pub stitch_count: i64,
    pub needle_runtime: f64,
    pub needle_stoptime: f64,
    pub tx_log_id: i64,
    pub str_log_id: i64,
    pub device_id: i64,
    pub reserve: Option<String>,
}

impl NewLogRecord {
    /// Minimal record with every counter zeroed.
    pub fn new(machine_id: i64, date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime, mode: i32) -> Self {
        Self {
            machine_id,
            line_number: 0,
            operator_id: NO_OPERATOR.to_string(),
            date,
            start_time,
            end_time,
            mode,
            stitch_count: 0,
            needle_runtime: 0.0,
            needle_stoptime: 0.0,
            tx_log_id: 0,
            str_log_id: 0,
            device_id: 0,
            reserve: None,
        }
    }

    pub fn into_record(self, id: i64, created_at: NaiveDateTime) -> LogRecord {
        LogRecord {
            id,
            machine_id: self.machine_id,
            line_number: self.line_number,
            operator_id: self.operator_id,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            mode: self.mode,
            stitch_count: self.stitch_count,
            needle_runtime: self.needle_runtime,
            needle_stoptime: self.needle_stoptime,
            tx_log_id: self.tx_log_id,
            str_log_id: self.str_log_id,
            device_id: self.device_id,
            reserve: self.reserve,
            created_at,
        }
    }
}

pub fn parse_speed(reserve: Option<&str>) -> Option<f64> {
    reserve
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|speed| *speed > 0)
        .map(|speed| speed as f64)
}

/// Parses `YYYY:MM:DD` or `YYYY-MM-DD`.
pub fn parse_log_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    LOG_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Parses `H:MM` or `H:MM:SS`, single-digit hours included.
pub fn parse_log_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}
