//! Report assembler: shapes aggregator output into the productivity report
//! document.
//!
//! A report is computed from a single fetch of the matching records. Every
//! group gets its totals plus a `tableData` row per date; when all values of
//! a dimension are requested a combined summary is appended. Hours and
//! percentages are rounded to two decimals only here, at the output edge.

use crate::db::logs::{LogFilter, MachineLogs};
use crate::db::operators::Operators;
use crate::libs::aggregator::{Aggregator, Dimension, GroupKey, Totals};
use crate::libs::error::ReportError;
use crate::libs::interval::normalize_all;
use crate::libs::log_record::LogRecord;
use crate::libs::modes::{ModeCategory, ModeTaxonomy, NonProductiveKind};
use crate::libs::shift::ShiftConfig;
use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const IDLE_LABEL: &str = "Idle";

/// Which groups of a dimension to report on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    All,
    Value(String),
}

impl Selector {
    /// `"all"` (any case) selects every group.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Selector::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Selector::All,
            Some(v) => Selector::Value(v.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub dimension: Dimension,
    pub selector: Selector,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRequest {
    pub fn new(dimension: Dimension, selector: Selector) -> Self {
        Self {
            dimension,
            selector,
            from: None,
            to: None,
        }
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    /// Builds the store filter. Operator names are resolved by the caller.
    pub fn filter(&self) -> Result<LogFilter, ReportError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ReportError::InvertedRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        let mut filter = LogFilter::between(self.from, self.to);
        if let Selector::Value(value) = &self.selector {
            match self.dimension {
                Dimension::Machine => filter.machine_id = Some(parse_id("machine", value)?),
                Dimension::Line => filter.line_number = Some(parse_id("line", value)?),
                Dimension::Operator => {}
                Dimension::All => {
                    return Err(ReportError::InvalidSelector {
                        dimension: "all",
                        value: value.clone(),
                    })
                }
            }
        }
        Ok(filter)
    }

    pub fn wants_summary(&self) -> bool {
        self.dimension != Dimension::All && self.selector == Selector::All
    }
}

fn parse_id(dimension: &'static str, value: &str) -> Result<i64, ReportError> {
    value.trim().parse::<i64>().map_err(|_| ReportError::InvalidSelector {
        dimension,
        value: value.to_string(),
    })
}

/// Parses a `YYYY-MM-DD` query date.
pub fn parse_query_date(field: &'static str, value: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ReportError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Date range for record lookups, where the bounds come as a pair.
///
/// Neither bound means the whole history. Only one of them is an error.
pub fn lookup_range(from: Option<&str>, to: Option<&str>) -> Result<Option<(NaiveDate, NaiveDate)>, ReportError> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => {
            let from_date = parse_query_date("from_date", from)?;
            let to_date = parse_query_date("to_date", to)?;
            if from_date > to_date {
                return Err(ReportError::InvertedRange {
                    from: from_date.to_string(),
                    to: to_date.to_string(),
                });
            }
            Ok(Some((from_date, to_date)))
        }
        _ => Err(ReportError::BothDatesRequired),
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TimeShare {
    pub hours: f64,
    pub percentage: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NonProductiveTime {
    pub hours: f64,
    pub percentage: f64,
    /// Hours per non-productive mode label. `Idle` includes untracked time.
    pub breakdown: BTreeMap<String, f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_available_hours: f64,
    /// Hours logged under any mode inside the shift.
    pub total_hours: f64,
    pub total_productive_time: TimeShare,
    pub total_non_productive_time: NonProductiveTime,
    pub total_stitch_count: i64,
    pub average_sewing_speed: f64,
    /// Productive needle runtime in hours.
    pub total_needle_runtime: f64,
    pub needle_runtime_percentage: f64,
    pub total_working_days: usize,
}

impl Metrics {
    pub fn from_totals(totals: &Totals, taxonomy: &ModeTaxonomy) -> Self {
        let idle_label = taxonomy
            .idle_code()
            .map(|code| taxonomy.label_of(code))
            .unwrap_or_else(|| IDLE_LABEL.to_string());

        let mut breakdown: BTreeMap<String, f64> = BTreeMap::new();
        breakdown.insert(idle_label.clone(), 0.0);
        for (code, hours) in &totals.mode_hours {
            if let ModeCategory::NonProductive(kind) = taxonomy.category_of(*code) {
                let label = if kind == NonProductiveKind::Idle {
                    idle_label.clone()
                } else {
                    taxonomy.label_of(*code)
                };
                *breakdown.entry(label).or_insert(0.0) += hours;
            }
        }
        *breakdown.entry(idle_label).or_insert(0.0) += totals.untracked_idle_hours;
        for hours in breakdown.values_mut() {
            *hours = round2(*hours);
        }

        Metrics {
            total_available_hours: round2(totals.available_hours),
            total_hours: round2(totals.logged_hours()),
            total_productive_time: TimeShare {
                hours: round2(totals.productive_hours),
                percentage: round2(totals.productive_percentage),
            },
            total_non_productive_time: NonProductiveTime {
                hours: round2(totals.nonproductive_hours),
                percentage: round2(totals.npt_percentage),
                breakdown,
            },
            total_stitch_count: totals.stitch_count,
            average_sewing_speed: round2(totals.sewing_speed),
            total_needle_runtime: round2(totals.needle_runtime_hours),
            needle_runtime_percentage: round2(totals.needle_runtime_percentage),
            total_working_days: totals.working_days,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TableRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupReport {
    pub group: String,
    pub key: GroupKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(flatten)]
    pub metrics: Metrics,
    pub table_data: Vec<TableRow>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total_groups: usize,
    #[serde(flatten)]
    pub metrics: Metrics,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityReport {
    pub dimension: Dimension,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub taxonomy: String,
    pub generated_at: NaiveDateTime,
    pub groups: Vec<GroupReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryReport>,
}

impl ProductivityReport {
    pub fn empty(request: &ReportRequest, taxonomy: &ModeTaxonomy, now: NaiveDateTime) -> Self {
        ProductivityReport {
            dimension: request.dimension,
            from_date: request.from,
            to_date: request.to,
            taxonomy: taxonomy.name.clone(),
            generated_at: now,
            groups: Vec::new(),
            summary: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Fetches the matching records once and builds the report.
///
/// An operator name with no matching card yields an empty report.
pub fn load_report(
    logs: &MachineLogs,
    operators: &Operators,
    request: &ReportRequest,
    shift: &ShiftConfig,
    taxonomy: &ModeTaxonomy,
    now: NaiveDateTime,
) -> Result<ProductivityReport> {
    let mut filter = request.filter()?;

    if let (Dimension::Operator, Selector::Value(name)) = (request.dimension, &request.selector) {
        match operators.find_by_name(name)? {
            Some(operator) => filter.operator_id = Some(operator.rfid_card_no),
            None => {
                debug!(name = %name, "Unknown operator, empty report");
                return Ok(ProductivityReport::empty(request, taxonomy, now));
            }
        }
    }

    let records = logs.fetch(&filter)?;
    let names = operators.name_map()?;
    let aggregator = Aggregator::new(taxonomy, shift, now);

    Ok(build_report(&records, request, &names, &aggregator, now))
}

/// Builds a report from already fetched records.
pub fn build_report(
    records: &[LogRecord],
    request: &ReportRequest,
    operator_names: &HashMap<String, String>,
    aggregator: &Aggregator<'_>,
    now: NaiveDateTime,
) -> ProductivityReport {
    let taxonomy = aggregator.taxonomy();
    let idle_code = taxonomy.idle_code();

    // Idle time with nobody at the machine says nothing about an operator.
    let unattended_idle =
        |record: &LogRecord| request.dimension == Dimension::Operator && !record.has_operator() && Some(record.mode) == idle_code;

    let intervals = normalize_all(records.iter().filter(|record: &&LogRecord| !unattended_idle(*record)), aggregator.shift());
    let groups = aggregator.group_by(&intervals, request.dimension);
    debug!(dimension = %request.dimension, groups = groups.len(), "Report groups");

    let group_reports: Vec<GroupReport> = groups
        .iter()
        .map(|group| {
            let operator_name = match &group.key {
                GroupKey::Operator(rfid) => operator_names.get(rfid).cloned(),
                _ => None,
            };
            let label = operator_name.clone().unwrap_or_else(|| group.key.to_string());
            GroupReport {
                group: label,
                key: group.key.clone(),
                operator_name,
                metrics: Metrics::from_totals(&group.totals, taxonomy),
                table_data: aggregator
                    .daily(&group.intervals)
                    .iter()
                    .map(|(date, totals)| TableRow {
                        date: *date,
                        metrics: Metrics::from_totals(totals, taxonomy),
                    })
                    .collect(),
            }
        })
        .collect();

    let summary = if request.wants_summary() && !groups.is_empty() {
        Some(SummaryReport {
            total_groups: groups.len(),
            metrics: Metrics::from_totals(&aggregator.summarize(&groups), taxonomy),
        })
    } else {
        None
    };

    ProductivityReport {
        dimension: request.dimension,
        from_date: request.from,
        to_date: request.to,
        taxonomy: taxonomy.name.clone(),
        generated_at: now,
        groups: group_reports,
        summary,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
