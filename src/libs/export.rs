//! Writes a [`ProductivityReport`] to disk as JSON, CSV or Excel.
//!
//! JSON is the report document as-is. CSV and Excel flatten it into two
//! parts: one summary row per group (plus the cross-group summary when the
//! report has one), then one row per group and day.

use crate::libs::messages::Message;
use crate::libs::report::{Metrics, ProductivityReport};
use crate::msg_success;
use anyhow::Result;
use chrono::Local;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Excel => "xlsx",
        }
    }
}

const METRIC_COLUMNS: [&str; 12] = [
    "Available Hours",
    "Logged Hours",
    "Productive Hours",
    "Productive %",
    "Non-Productive Hours",
    "Non-Productive %",
    "Stitch Count",
    "Avg Sewing Speed",
    "Needle Runtime Hours",
    "Needle Runtime %",
    "Working Days",
    "Breakdown",
];

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Without an explicit path the file lands in the working directory as
    /// `stitchlog_report_<timestamp>.<ext>`.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let output_path = output_path.unwrap_or_else(|| {
            PathBuf::from(format!(
                "stitchlog_report_{}.{}",
                Local::now().format("%Y%m%d_%H%M%S"),
                format.extension()
            ))
        });

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn export(&self, report: &ProductivityReport) -> Result<()> {
        match self.format {
            ExportFormat::Csv => self.export_csv(report)?,
            ExportFormat::Json => self.export_json(report)?,
            ExportFormat::Excel => self.export_excel(report)?,
        }

        msg_success!(Message::ExportCompleted(self.output_path.display().to_string()));
        Ok(())
    }

    fn export_json(&self, report: &ProductivityReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }

    fn export_csv(&self, report: &ProductivityReport) -> Result<()> {
        let mut wtr = csv::Writer::from_path(&self.output_path)?;
        let width = METRIC_COLUMNS.len() + 2;
        let blank = vec![String::new(); width];

        let mut title = blank.clone();
        title[0] = "SUMMARY".to_string();
        wtr.write_record(&title)?;
        wtr.write_record(header("Group", "Key"))?;
        for (group, key, metrics) in summary_rows(report) {
            wtr.write_record(metric_record(group, key, metrics))?;
        }

        wtr.write_record(&blank)?;
        let mut title = blank.clone();
        title[0] = "DAILY".to_string();
        wtr.write_record(&title)?;
        wtr.write_record(header("Group", "Date"))?;
        for group in &report.groups {
            for row in &group.table_data {
                wtr.write_record(metric_record(group.group.clone(), row.date.to_string(), &row.metrics))?;
            }
        }

        wtr.flush()?;
        Ok(())
    }

    fn export_excel(&self, report: &ProductivityReport) -> Result<()> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold().set_background_color(rust_xlsxwriter::Color::Gray);

        let summary = workbook.add_worksheet();
        summary.set_name("Summary")?;
        write_header(summary, &header("Group", "Key"), &header_format)?;
        for (index, (group, key, metrics)) in summary_rows(report).into_iter().enumerate() {
            write_metric_row(summary, index as u32 + 1, &group, &key, metrics)?;
        }
        summary.autofit();

        let daily = workbook.add_worksheet();
        daily.set_name("Daily")?;
        write_header(daily, &header("Group", "Date"), &header_format)?;
        let mut row = 1;
        for group in &report.groups {
            for table_row in &group.table_data {
                write_metric_row(daily, row, &group.group, &table_row.date.to_string(), &table_row.metrics)?;
                row += 1;
            }
        }
        daily.autofit();

        workbook.save(&self.output_path)?;
        Ok(())
    }
}

fn header(first: &str, second: &str) -> Vec<String> {
    let mut columns = vec![first.to_string(), second.to_string()];
    columns.extend(METRIC_COLUMNS.iter().map(|c| c.to_string()));
    columns
}

/// One `(group, key, metrics)` per group, then the summary if present.
fn summary_rows(report: &ProductivityReport) -> Vec<(String, String, &Metrics)> {
    let mut rows: Vec<(String, String, &Metrics)> = report
        .groups
        .iter()
        .map(|group| (group.group.clone(), group.key.to_string(), &group.metrics))
        .collect();

    if let Some(summary) = &report.summary {
        rows.push((
            format!("All {} groups", summary.total_groups),
            report.dimension.to_string(),
            &summary.metrics,
        ));
    }
    rows
}

fn breakdown_text(metrics: &Metrics) -> String {
    metrics
        .total_non_productive_time
        .breakdown
        .iter()
        .map(|(label, hours)| format!("{}: {:.2}", label, hours))
        .collect::<Vec<_>>()
        .join("; ")
}

fn metric_record(group: String, key: String, metrics: &Metrics) -> Vec<String> {
    vec![
        group,
        key,
        format!("{:.2}", metrics.total_available_hours),
        format!("{:.2}", metrics.total_hours),
        format!("{:.2}", metrics.total_productive_time.hours),
        format!("{:.2}", metrics.total_productive_time.percentage),
        format!("{:.2}", metrics.total_non_productive_time.hours),
        format!("{:.2}", metrics.total_non_productive_time.percentage),
        metrics.total_stitch_count.to_string(),
        format!("{:.2}", metrics.average_sewing_speed),
        format!("{:.2}", metrics.total_needle_runtime),
        format!("{:.2}", metrics.needle_runtime_percentage),
        metrics.total_working_days.to_string(),
        breakdown_text(metrics),
    ]
}

fn write_header(worksheet: &mut Worksheet, columns: &[String], format: &Format) -> Result<()> {
    for (col, title) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, title, format)?;
    }
    Ok(())
}

fn write_metric_row(worksheet: &mut Worksheet, row: u32, group: &str, key: &str, metrics: &Metrics) -> Result<()> {
    worksheet.write_string(row, 0, group)?;
    worksheet.write_string(row, 1, key)?;

    let numbers = [
        metrics.total_available_hours,
        metrics.total_hours,
        metrics.total_productive_time.hours,
        metrics.total_productive_time.percentage,
        metrics.total_non_productive_time.hours,
        metrics.total_non_productive_time.percentage,
        metrics.total_stitch_count as f64,
        metrics.average_sewing_speed,
        metrics.total_needle_runtime,
        metrics.needle_runtime_percentage,
        metrics.total_working_days as f64,
    ];
    for (offset, value) in numbers.iter().enumerate() {
        worksheet.write_number(row, offset as u16 + 2, *value)?;
    }
    worksheet.write_string(row, numbers.len() as u16 + 2, &breakdown_text(metrics))?;

    Ok(())
}
