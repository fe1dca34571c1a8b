use crate::db::duplicates::DuplicateLog;
use crate::db::operators::Operator;
use crate::libs::formatter::{format_hours, format_percentage};
use crate::libs::messages::Message;
use crate::libs::modes::{ModeCategory, ModeTaxonomy};
use crate::libs::report::{Metrics, ProductivityReport};
use crate::libs::stats::{FleetCounts, LineEfficiency, LogEntry, OperationCounts, OperationMetrics};
use crate::{msg_info, msg_print};
use anyhow::Result;
use prettytable::{row, Table};

/// Console tables for every listing the CLI prints.
pub struct View {}

impl View {
    pub fn report(report: &ProductivityReport) -> Result<()> {
        if report.is_empty() {
            msg_info!(Message::ReportEmpty);
            return Ok(());
        }

        if let (Some(from), Some(to)) = (report.from_date, report.to_date) {
            msg_print!(Message::ReportPeriod(from.to_string(), to.to_string()));
        }

        for group in &report.groups {
            msg_print!(Message::ReportHeader(group.group.clone()), true);

            let mut table = Self::metrics_table("DATE");
            for row in &group.table_data {
                Self::add_metrics_row(&mut table, &row.date.to_string(), &row.metrics);
            }
            Self::add_metrics_row(&mut table, "TOTAL", &group.metrics);
            table.printstd();

            Self::breakdown(&group.metrics)?;
        }

        if let Some(summary) = &report.summary {
            msg_print!(Message::ReportSummaryHeader(summary.total_groups), true);
            let mut table = Self::metrics_table("");
            Self::add_metrics_row(&mut table, "ALL GROUPS", &summary.metrics);
            table.printstd();
            Self::breakdown(&summary.metrics)?;
        }

        Ok(())
    }

    fn metrics_table(first_column: &str) -> Table {
        let mut table = Table::new();
        table.add_row(row![
            first_column,
            "AVAILABLE",
            "LOGGED",
            "PRODUCTIVE",
            "PT %",
            "NON-PRODUCTIVE",
            "NPT %",
            "STITCHES",
            "SPEED",
            "NEEDLE",
            "NEEDLE %",
            "DAYS"
        ]);
        table
    }

    fn add_metrics_row(table: &mut Table, label: &str, metrics: &Metrics) {
        table.add_row(row![
            label,
            format_hours(metrics.total_available_hours),
            format_hours(metrics.total_hours),
            format_hours(metrics.total_productive_time.hours),
            format_percentage(metrics.total_productive_time.percentage),
            format_hours(metrics.total_non_productive_time.hours),
            format_percentage(metrics.total_non_productive_time.percentage),
            metrics.total_stitch_count,
            format!("{:.2}", metrics.average_sewing_speed),
            format_hours(metrics.total_needle_runtime),
            format_percentage(metrics.needle_runtime_percentage),
            metrics.total_working_days
        ]);
    }

    fn breakdown(metrics: &Metrics) -> Result<()> {
        let breakdown = &metrics.total_non_productive_time.breakdown;
        if breakdown.is_empty() {
            return Ok(());
        }

        let mut table = Table::new();
        table.add_row(row!["NON-PRODUCTIVE MODE", "HOURS"]);
        for (label, hours) in breakdown {
            table.add_row(row![label, format!("{:.2} ({})", hours, format_hours(*hours))]);
        }
        table.printstd();

        Ok(())
    }

    pub fn logs(entries: &[LogEntry]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row![
            "ID", "MACHINE", "LINE", "OPERATOR", "DATE", "START", "END", "MODE", "STITCHES", "RUNTIME", "STOPTIME", "SPEED"
        ]);
        for entry in entries {
            let record = &entry.record;
            let operator = match &entry.operator_name {
                Some(name) => format!("{} ({})", name, record.operator_id),
                None => record.operator_id.clone(),
            };
            table.add_row(row![
                record.id,
                record.machine_id,
                record.line_number,
                operator,
                record.date,
                record.start_time,
                record.end_time,
                format!("{} {}", record.mode, entry.mode_description),
                record.stitch_count,
                record.needle_runtime,
                record.needle_stoptime,
                record.reserve.as_deref().unwrap_or("-")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn fleet(counts: &FleetCounts) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["MACHINES", "LINES", "LOG RECORDS"]);
        table.add_row(row![counts.machines, counts.lines, counts.logs]);
        table.printstd();

        Ok(())
    }

    pub fn line_efficiency(lines: &[LineEfficiency]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["LINE", "MACHINES", "NEEDLE RUNTIME", "NEEDLE STOPTIME", "EFFICIENCY"]);
        for line in lines {
            table.add_row(row![
                line.line_number,
                line.machines,
                format!("{:.0}", line.needle_runtime),
                format!("{:.0}", line.needle_stoptime),
                format_percentage(line.efficiency)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn operations(metrics: &[OperationMetrics]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row![
            "MACHINE",
            "DATE",
            "SEWING STITCHES",
            "SEWING RUNTIME",
            "REWORK STITCHES",
            "REWORK RUNTIME"
        ]);
        for machine in metrics {
            for day in &machine.table_data {
                Self::add_operation_row(&mut table, machine.machine_id.to_string(), day.date.to_string(), &day.counts);
            }
            Self::add_operation_row(&mut table, machine.machine_id.to_string(), "TOTAL".to_string(), &machine.counts);
        }
        table.printstd();

        Ok(())
    }

    fn add_operation_row(table: &mut Table, machine: String, label: String, counts: &OperationCounts) {
        table.add_row(row![
            machine,
            label,
            counts.sewing_stitch_count,
            format!("{:.0}", counts.sewing_needle_runtime),
            counts.rework_stitch_count,
            format!("{:.0}", counts.rework_needle_runtime)
        ]);
    }

    pub fn duplicates(duplicates: &[DuplicateLog]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "RECEIVED", "PAYLOAD"]);
        for duplicate in duplicates {
            table.add_row(row![duplicate.id, duplicate.created_at, duplicate.payload]);
        }
        table.printstd();

        Ok(())
    }

    pub fn operators(operators: &[Operator]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "RFID CARD", "NAME", "REMARKS"]);
        for operator in operators {
            table.add_row(row![
                operator.id,
                operator.rfid_card_no,
                operator.operator_name,
                operator.remarks.as_deref().unwrap_or("")
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn taxonomy(taxonomy: &ModeTaxonomy) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["CODE", "LABEL", "CATEGORY"]);
        for mode in &taxonomy.modes {
            let category = match mode.category {
                ModeCategory::Productive => "Productive".to_string(),
                ModeCategory::NonProductive(kind) => format!("Non-productive ({:?})", kind),
            };
            table.add_row(row![mode.code, mode.label, category]);
        }
        table.printstd();

        Ok(())
    }

    pub fn migrations(history: &[(u32, String, String)]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["VERSION", "NAME", "APPLIED AT"]);
        for (version, name, applied_at) in history {
            table.add_row(row![version, name, applied_at]);
        }
        table.printstd();

        Ok(())
    }
}
