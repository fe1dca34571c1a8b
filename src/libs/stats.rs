//! Fleet statistics and log listings built on raw records.
//!
//! Unlike the productivity report these figures use the device counters as
//! stored. Operation metrics only take records that fit the shift window
//! whole.

use crate::libs::log_record::LogRecord;
use crate::libs::modes::{ModeTaxonomy, NonProductiveKind};
use crate::libs::shift::{to_seconds, ShiftConfig};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A stored record with its mode label and operator name resolved.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    #[serde(flatten)]
    pub record: LogRecord,
    pub mode_description: String,
    pub operator_name: Option<String>,
}

pub fn describe_logs(records: Vec<LogRecord>, taxonomy: &ModeTaxonomy, operator_names: &HashMap<String, String>) -> Vec<LogEntry> {
    records
        .into_iter()
        .map(|record| LogEntry {
            mode_description: taxonomy.label_of(record.mode),
            operator_name: operator_names.get(&record.operator_id).cloned(),
            record,
        })
        .collect()
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FleetCounts {
    pub machines: i64,
    pub lines: i64,
    pub logs: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineEfficiency {
    pub line_number: i64,
    pub machines: usize,
    pub needle_runtime: f64,
    pub needle_stoptime: f64,
    /// `runtime / (runtime + stoptime) * 100`, 0 without any needle time.
    pub efficiency: f64,
}

/// Needle efficiency per production line over the raw counters.
pub fn line_efficiency(records: &[LogRecord]) -> Vec<LineEfficiency> {
    let mut lines: BTreeMap<i64, (BTreeSet<i64>, f64, f64)> = BTreeMap::new();
    for record in records {
        let (machines, runtime, stoptime) = lines.entry(record.line_number).or_default();
        machines.insert(record.machine_id);
        *runtime += record.needle_runtime;
        *stoptime += record.needle_stoptime;
    }

    lines
        .into_iter()
        .map(|(line_number, (machines, runtime, stoptime))| {
            let total = runtime + stoptime;
            LineEfficiency {
                line_number,
                machines: machines.len(),
                needle_runtime: runtime,
                needle_stoptime: stoptime,
                efficiency: if total > 0.0 { runtime / total * 100.0 } else { 0.0 },
            }
        })
        .collect()
}

/// Stitch counts and needle runtime split between sewing and rework.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationCounts {
    pub sewing_stitch_count: i64,
    pub sewing_needle_runtime: f64,
    pub rework_stitch_count: i64,
    pub rework_needle_runtime: f64,
}

impl OperationCounts {
    fn add(&mut self, record: &LogRecord, productive: i32, rework: Option<i32>) {
        if record.mode == productive {
            self.sewing_stitch_count += record.stitch_count;
            self.sewing_needle_runtime += record.needle_runtime;
        } else if Some(record.mode) == rework {
            self.rework_stitch_count += record.stitch_count;
            self.rework_needle_runtime += record.needle_runtime;
        }
    }

    pub fn total_stitch_count(&self) -> i64 {
        self.sewing_stitch_count + self.rework_stitch_count
    }

    pub fn total_needle_runtime(&self) -> f64 {
        self.sewing_needle_runtime + self.rework_needle_runtime
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct OperationDay {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: OperationCounts,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetrics {
    pub machine_id: i64,
    #[serde(flatten)]
    pub counts: OperationCounts,
    pub total_stitch_count: i64,
    pub total_needle_runtime: f64,
    pub table_data: Vec<OperationDay>,
}

/// True when the record lies wholly inside the shift window and not wholly
/// inside one of its breaks.
pub fn within_shift(record: &LogRecord, shift: &ShiftConfig) -> bool {
    let start = to_seconds(record.start_time);
    let end = to_seconds(record.end_time);
    shift.shift_window().contains(start, end) && !shift.break_windows().iter().any(|brk| brk.contains(start, end))
}

/// Stitch counts and needle runtime per machine and per day, split between
/// the productive mode and the taxonomy's rework mode.
///
/// Only records wholly inside the shift window, outside the breaks and made
/// by a registered operator count; a record straddling the shift boundary is
/// left out entirely. A taxonomy without a rework mode reports zero rework.
pub fn operation_metrics(
    records: &[LogRecord],
    shift: &ShiftConfig,
    taxonomy: &ModeTaxonomy,
    operator_names: &HashMap<String, String>,
) -> Vec<OperationMetrics> {
    let productive = taxonomy.productive_code();
    let rework = taxonomy.code_of(NonProductiveKind::Rework);

    let mut machines: BTreeMap<i64, (OperationCounts, BTreeMap<NaiveDate, OperationCounts>)> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|record| operator_names.contains_key(&record.operator_id))
        .filter(|record| within_shift(record, shift))
    {
        let (totals, days) = machines.entry(record.machine_id).or_default();
        totals.add(record, productive, rework);
        days.entry(record.date).or_default().add(record, productive, rework);
    }

    machines
        .into_iter()
        .map(|(machine_id, (counts, days))| OperationMetrics {
            machine_id,
            total_stitch_count: counts.total_stitch_count(),
            total_needle_runtime: counts.total_needle_runtime(),
            counts,
            table_data: days
                .into_iter()
                .map(|(date, counts)| OperationDay { date, counts })
                .collect(),
        })
        .collect()
}
