/// Every user-facing line stitchlog prints.
///
/// Variants carry the values interpolated into their text; the text itself
/// lives in the `Display` implementation next door.
#[derive(Debug, Clone)]
pub enum Message {
    // === CONFIGURATION ===
    ConfigModuleShift,
    ConfigModuleTaxonomy,
    ConfigModuleIngest,
    PromptSelectModules,
    PromptDefaultTaxonomy,
    PromptStrLogOffset,
    PromptRecordDuplicates,
    PromptShiftStart,
    PromptShiftEnd,
    PromptBreakCount,
    PromptBreakStart(usize), // break number, 1-based
    PromptBreakEnd(usize),
    InvalidTimeInput(String),
    ConfigSaved(String), // path
    ConfigDeleted,
    ConfigNotFound,

    // === INGEST ===
    IngestBatchSummary {
        created: usize,
        duplicates: usize,
        rejected: usize,
        failed: usize,
    },
    IngestFailed(String),
    InvalidPayloadJson(String),
    PayloadNotObject,

    // === REPORTS ===
    ReportHeader(String), // group label
    ReportSummaryHeader(usize),
    ReportPeriod(String, String),
    ReportEmpty,
    ExportCompleted(String),

    // === LOG LISTING ===
    LogsHeader(usize),
    NoLogsFound,

    // === STATS ===
    FleetCountsHeader,
    LineEfficiencyHeader,
    OperationMetricsHeader,
    DuplicatesHeader(i64),
    NoDuplicates,

    // === TAXONOMIES ===
    TaxonomyHeader(String),
    TaxonomyNames(String),

    // === OPERATORS ===
    OperatorAdded(String),
    OperatorExists(String),
    OperatorsHeader,
    NoOperators,
    OperatorsImported { added: usize, skipped: usize },
    FileNotFound(String),

    // === MIGRATIONS ===
    MigrationsFound(usize),
    RunningMigration(u32, String), // version, name
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseUpToDate,
    DatabaseNeedsUpdate,
    MigrationHistory,
    NoMigrationsApplied,
}
