//! Ingestion gate: validates one device payload and applies the duplicate
//! policy before anything reaches storage.
//!
//! ## Duplicate policy
//!
//! Devices that retransmit an event after a transport failure add a marker
//! offset (1000 by default) to `Str_LOGID`. For such a payload the gate:
//!
//! 1. subtracts the offset, so the stored value is the original id;
//! 2. appends the record only if no row already holds the same
//!    `(str_log_id, machine_id, date, start_time, end_time)`.
//!
//! The check and the insert are one atomic step on the sink, so two
//! concurrent retries of one event leave a single row. A payload without the
//! marker is appended as-is. `Tx_LOGID` is always stored unchanged.
//!
//! Absorbing a duplicate is a success, not an error: the device gets a
//! `200` acknowledgement and nothing new is persisted. A failed audit write
//! is logged and does not change that answer.

use crate::libs::config::IngestConfig;
use crate::libs::error::ValidationErrors;
use crate::libs::log_record::{parse_log_date, parse_log_time, NewLogRecord, NO_OPERATOR};
use crate::libs::modes::ModeTaxonomy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const OPERATOR_ID_MAX_LEN: usize = 30;

const REQUIRED: &str = "This field is required.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const NOT_A_NUMBER: &str = "A valid number is required.";
const NOT_A_STRING: &str = "Not a valid string.";
const NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// One device transmission as it arrives on the wire.
///
/// Fields are kept as raw JSON so type errors can be reported per field
/// instead of failing the whole document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LogPayload {
    #[serde(rename = "MACHINE_ID", default, skip_serializing_if = "Option::is_none")]
    pub machine_id: Option<Value>,
    #[serde(rename = "LINE_NUMB", default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<Value>,
    #[serde(rename = "OPERATOR_ID", default, skip_serializing_if = "Option::is_none")]
    pub operator_id: Option<Value>,
    #[serde(rename = "DATE", default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(rename = "START_TIME", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    #[serde(rename = "END_TIME", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Value>,
    #[serde(rename = "MODE", default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(rename = "STITCH_COUNT", default, skip_serializing_if = "Option::is_none")]
    pub stitch_count: Option<Value>,
    #[serde(rename = "NEEDLE_RUNTIME", default, skip_serializing_if = "Option::is_none")]
    pub needle_runtime: Option<Value>,
    #[serde(rename = "NEEDLE_STOPTIME", default, skip_serializing_if = "Option::is_none")]
    pub needle_stoptime: Option<Value>,
    #[serde(rename = "Tx_LOGID", default, skip_serializing_if = "Option::is_none")]
    pub tx_log_id: Option<Value>,
    #[serde(rename = "Str_LOGID", default, skip_serializing_if = "Option::is_none")]
    pub str_log_id: Option<Value>,
    #[serde(rename = "DEVICE_ID", default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<Value>,
    #[serde(rename = "RESERVE", default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Value>,
}

impl LogPayload {
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Where accepted records go.
pub trait LogSink {
    /// Appends unconditionally and returns the new row id.
    fn append(&self, record: &NewLogRecord) -> Result<i64>;

    /// Appends unless a row with the same dedup tuple exists, atomically.
    /// Returns `None` when the record was a duplicate.
    fn append_unless_exists(&self, record: &NewLogRecord) -> Result<Option<i64>>;

    /// Keeps an absorbed duplicate for auditing.
    fn record_duplicate(&self, payload: &Value) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Created { id: i64 },
    Duplicate,
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Response document returned to the device.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum IngestResponse {
    Ack { code: u16, message: String },
    Rejected { message: String, errors: ValidationErrors },
    Failed { code: u16, message: String },
}

impl IngestResponse {
    pub fn from_outcome(outcome: IngestOutcome) -> Self {
        match outcome {
            IngestOutcome::Created { .. } => IngestResponse::Ack {
                code: 201,
                message: "Log saved successfully".to_string(),
            },
            IngestOutcome::Duplicate => IngestResponse::Ack {
                code: 200,
                message: "STR Log ID already exists, data not saved".to_string(),
            },
        }
    }

    pub fn rejected(errors: ValidationErrors) -> Self {
        IngestResponse::Rejected {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn failed(error: &anyhow::Error) -> Self {
        IngestResponse::Failed {
            code: 500,
            message: format!("Log could not be saved: {:#}", error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, IngestResponse::Ack { .. })
    }
}

pub struct IngestGate<'c> {
    taxonomy: &'c ModeTaxonomy,
    config: &'c IngestConfig,
}

impl<'c> IngestGate<'c> {
    pub fn new(taxonomy: &'c ModeTaxonomy, config: &'c IngestConfig) -> Self {
        Self { taxonomy, config }
    }

    pub fn submit<S: LogSink + ?Sized>(&self, payload: &LogPayload, sink: &S) -> Result<IngestOutcome, IngestError> {
        let mut record = validate(payload, self.taxonomy).map_err(IngestError::Validation)?;

        let offset = self.config.str_log_offset;
        if offset <= 0 || record.str_log_id <= offset {
            let id = sink.append(&record)?;
            debug!(id, machine_id = record.machine_id, "Log appended");
            return Ok(IngestOutcome::Created { id });
        }

        record.str_log_id -= offset;
        match sink.append_unless_exists(&record)? {
            Some(id) => {
                debug!(id, machine_id = record.machine_id, str_log_id = record.str_log_id, "Retransmitted log appended");
                Ok(IngestOutcome::Created { id })
            }
            None => {
                debug!(
                    machine_id = record.machine_id,
                    str_log_id = record.str_log_id,
                    date = %record.date,
                    "Duplicate transmission absorbed"
                );
                if self.config.record_duplicates {
                    if let Err(e) = sink.record_duplicate(&payload.to_json()) {
                        warn!(error = %e, machine_id = record.machine_id, "Could not keep duplicate for auditing");
                    }
                }
                Ok(IngestOutcome::Duplicate)
            }
        }
    }

    /// Submits and renders the outcome as the device-facing document.
    /// Storage failures are still returned as errors.
    pub fn respond<S: LogSink + ?Sized>(&self, payload: &LogPayload, sink: &S) -> Result<IngestResponse> {
        match self.submit(payload, sink) {
            Ok(outcome) => Ok(IngestResponse::from_outcome(outcome)),
            Err(IngestError::Validation(errors)) => Ok(IngestResponse::rejected(errors)),
            Err(IngestError::Store(e)) => Err(e),
        }
    }

    /// Answers every payload in order. A storage failure answers that payload
    /// with a `500` document and the rest are still submitted.
    pub fn respond_all<S: LogSink + ?Sized>(&self, payloads: &[LogPayload], sink: &S) -> Vec<IngestResponse> {
        payloads
            .iter()
            .map(|payload| {
                self.respond(payload, sink).unwrap_or_else(|e| {
                    warn!(error = %e, "Log could not be saved");
                    IngestResponse::failed(&e)
                })
            })
            .collect()
    }
}

/// Checks every field and builds the record to store.
///
/// All problems are collected, so one rejection lists every bad field.
pub fn validate(payload: &LogPayload, taxonomy: &ModeTaxonomy) -> Result<NewLogRecord, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let machine_id = required(&mut errors, "MACHINE_ID", &payload.machine_id).and_then(|v| integer(&mut errors, "MACHINE_ID", v));
    let date = required(&mut errors, "DATE", &payload.date).and_then(|v| match v.as_str().and_then(parse_log_date) {
        Some(date) => Some(date),
        None => {
            errors.add("DATE", "Date must be in YYYY:MM:DD or YYYY-MM-DD format");
            None
        }
    });
    let start_time = required(&mut errors, "START_TIME", &payload.start_time).and_then(|v| time(&mut errors, "START_TIME", v));
    let end_time = required(&mut errors, "END_TIME", &payload.end_time).and_then(|v| time(&mut errors, "END_TIME", v));
    let mode = required(&mut errors, "MODE", &payload.mode)
        .and_then(|v| integer(&mut errors, "MODE", v))
        .and_then(|code| match i32::try_from(code).ok().filter(|c| taxonomy.is_known(*c)) {
            Some(code) => Some(code),
            None => {
                errors.add("MODE", format!("Invalid mode: {}. Valid modes are {:?}", code, taxonomy.codes()));
                None
            }
        });

    let line_number = counter(&mut errors, "LINE_NUMB", &payload.line_number);
    let stitch_count = counter(&mut errors, "STITCH_COUNT", &payload.stitch_count);
    let needle_runtime = seconds(&mut errors, "NEEDLE_RUNTIME", &payload.needle_runtime);
    let needle_stoptime = seconds(&mut errors, "NEEDLE_STOPTIME", &payload.needle_stoptime);
    let tx_log_id = counter(&mut errors, "Tx_LOGID", &payload.tx_log_id);
    let str_log_id = counter(&mut errors, "Str_LOGID", &payload.str_log_id);
    let device_id = counter(&mut errors, "DEVICE_ID", &payload.device_id);
    let operator_id = operator(&mut errors, &payload.operator_id);
    let reserve = reserve(&mut errors, &payload.reserve);

    match (machine_id, date, start_time, end_time, mode) {
        (Some(machine_id), Some(date), Some(start_time), Some(end_time), Some(mode)) if errors.is_empty() => Ok(NewLogRecord {
            machine_id,
            line_number,
            operator_id,
            date,
            start_time,
            end_time,
            mode,
            stitch_count,
            needle_runtime,
            needle_stoptime,
            tx_log_id,
            str_log_id,
            device_id,
            reserve,
        }),
        _ => Err(errors),
    }
}

fn present(value: &Option<Value>) -> Option<&Value> {
    value.as_ref().filter(|v| !v.is_null())
}

fn required<'v>(errors: &mut ValidationErrors, field: &str, value: &'v Option<Value>) -> Option<&'v Value> {
    let value = present(value);
    if value.is_none() {
        errors.add(field, REQUIRED);
    }
    value
}

fn integer(errors: &mut ValidationErrors, field: &str, value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, NOT_AN_INTEGER);
    }
    parsed
}

/// Optional non-negative integer, 0 when absent.
fn counter(errors: &mut ValidationErrors, field: &str, value: &Option<Value>) -> i64 {
    let Some(value) = present(value) else {
        return 0;
    };
    match integer(errors, field, value) {
        Some(n) if n < 0 => {
            errors.add(field, NEGATIVE);
            0
        }
        Some(n) => n,
        None => 0,
    }
}

/// Optional non-negative number of seconds, 0 when absent.
fn seconds(errors: &mut ValidationErrors, field: &str, value: &Option<Value>) -> f64 {
    let Some(value) = present(value) else {
        return 0.0;
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    };
    match parsed {
        Some(n) if n < 0.0 => {
            errors.add(field, NEGATIVE);
            0.0
        }
        Some(n) => n,
        None => {
            errors.add(field, NOT_A_NUMBER);
            0.0
        }
    }
}

fn time(errors: &mut ValidationErrors, field: &str, value: &Value) -> Option<chrono::NaiveTime> {
    let parsed = value.as_str().and_then(parse_log_time);
    if parsed.is_none() {
        errors.add(field, "Time must be in HH:MM or HH:MM:SS format");
    }
    parsed
}

fn operator(errors: &mut ValidationErrors, value: &Option<Value>) -> String {
    let operator = match present(value) {
        None => return NO_OPERATOR.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => {
            errors.add("OPERATOR_ID", NOT_A_STRING);
            return NO_OPERATOR.to_string();
        }
    };
    if operator.chars().count() > OPERATOR_ID_MAX_LEN {
        errors.add(
            "OPERATOR_ID",
            format!("Ensure this field has no more than {} characters.", OPERATOR_ID_MAX_LEN),
        );
    }
    if operator.is_empty() {
        return NO_OPERATOR.to_string();
    }
    operator
}

fn reserve(errors: &mut ValidationErrors, value: &Option<Value>) -> Option<String> {
    match present(value) {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(_) => {
            errors.add("RESERVE", NOT_A_STRING);
            None
        }
    }
}
