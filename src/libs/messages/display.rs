//! Text for every [`Message`] variant.
//!
//! Keeping the wording in one match means a new variant cannot be printed
//! before someone decides what it says.

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let text = match self {
            // === CONFIGURATION ===
            Message::ConfigModuleShift => "Shift window and breaks".to_string(),
            Message::ConfigModuleTaxonomy => "Default mode taxonomy".to_string(),
            Message::ConfigModuleIngest => "Ingestion deduplication".to_string(),
            Message::PromptSelectModules => "Select the settings to configure".to_string(),
            Message::PromptDefaultTaxonomy => "Default taxonomy".to_string(),
            Message::PromptStrLogOffset => "Str_LOGID retransmission offset (0 disables dedup)".to_string(),
            Message::PromptRecordDuplicates => "Keep an audit trail of absorbed duplicates?".to_string(),
            Message::PromptShiftStart => "Shift start (HH:MM[:SS])".to_string(),
            Message::PromptShiftEnd => "Shift end (HH:MM[:SS])".to_string(),
            Message::PromptBreakCount => "Number of breaks".to_string(),
            Message::PromptBreakStart(n) => format!("Break {} start", n),
            Message::PromptBreakEnd(n) => format!("Break {} end", n),
            Message::InvalidTimeInput(value) => format!("'{}' is not a valid time, expected HH:MM or HH:MM:SS", value),
            Message::ConfigSaved(path) => format!("Configuration saved to {}", path),
            Message::ConfigDeleted => "Configuration deleted, defaults apply again".to_string(),
            Message::ConfigNotFound => "No configuration file found, nothing to delete".to_string(),

            // === INGEST ===
            Message::IngestBatchSummary {
                created,
                duplicates,
                rejected,
                failed,
            } => format!(
                "Ingested batch: {} saved, {} duplicates absorbed, {} rejected, {} failed",
                created, duplicates, rejected, failed
            ),
            Message::IngestFailed(reason) => reason.clone(),
            Message::InvalidPayloadJson(error) => format!("Payload is not valid JSON: {}", error),
            Message::PayloadNotObject => "Payload must be a JSON object or an array of objects".to_string(),

            // === REPORTS ===
            Message::ReportHeader(group) => format!("Productivity report: {}", group),
            Message::ReportSummaryHeader(groups) => format!("Summary across {} groups", groups),
            Message::ReportPeriod(from, to) => format!("Period: {} .. {}", from, to),
            Message::ReportEmpty => "No log records match this report".to_string(),
            Message::ExportCompleted(path) => format!("Report exported to {}", path),

            // === LOG LISTING ===
            Message::LogsHeader(count) => format!("{} log records", count),
            Message::NoLogsFound => "No log records found".to_string(),

            // === STATS ===
            Message::FleetCountsHeader => "Fleet".to_string(),
            Message::LineEfficiencyHeader => "Needle efficiency per line".to_string(),
            Message::OperationMetricsHeader => "Sewing and rework per machine".to_string(),
            Message::DuplicatesHeader(total) => format!("Absorbed duplicate submissions: {}", total),
            Message::NoDuplicates => "No duplicate submissions recorded".to_string(),

            // === TAXONOMIES ===
            Message::TaxonomyHeader(name) => format!("Taxonomy '{}'", name),
            Message::TaxonomyNames(names) => format!("Available taxonomies: {}", names),

            // === OPERATORS ===
            Message::OperatorAdded(name) => format!("Operator '{}' added", name),
            Message::OperatorExists(rfid) => format!("RFID card {} is already registered", rfid),
            Message::OperatorsHeader => "Operators".to_string(),
            Message::NoOperators => "No operators registered".to_string(),
            Message::OperatorsImported { added, skipped } => {
                format!("Imported {} operators, skipped {} already registered", added, skipped)
            }
            Message::FileNotFound(path) => format!("File not found: {}", path),

            // === MIGRATIONS ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("✓ Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("✗ Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed successfully".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::DatabaseNeedsUpdate => "Database schema needs to be updated".to_string(),
            Message::MigrationHistory => "Migration history:".to_string(),
            Message::NoMigrationsApplied => "No migrations applied yet".to_string(),
        };

        write!(f, "{}", text)
    }
}
